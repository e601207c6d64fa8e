//! Read/write entry points.

use std::path::Path;

use crate::builder::MemIoBuilder;
use crate::config::Config;
use crate::error::Result;
use crate::memory::{self, MapBackend, SystemBackend, TypedValue, Width};

/// Accessor for values at physical addresses.
///
/// Each call opens the device, maps the page holding the address, copies
/// the value and releases everything again before returning. Nothing is
/// cached between calls, so an accessor can be shared freely across
/// threads when its backend allows it.
///
/// # Example
///
/// ```rust,no_run
/// use memio::{MemIo, TypedValue};
///
/// let mem = MemIo::new();
/// mem.write(0x100_0000, &TypedValue::Uint32(42))?;
///
/// let mut value = TypedValue::Uint32(0);
/// mem.read(0x100_0000, &mut value)?;
/// assert_eq!(value, TypedValue::Uint32(42));
/// # Ok::<(), memio::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemIo<B = SystemBackend> {
    /// Bound settings
    config: Config,
    /// Map/unmap primitives
    backend: B,
    /// Mapping granularity
    page_size: usize,
}

impl MemIo<SystemBackend> {
    /// Create a new accessor builder.
    pub fn builder() -> MemIoBuilder {
        MemIoBuilder::new()
    }

    /// Accessor for `/dev/mem` using the OS mapping calls.
    pub fn new() -> Self {
        Self::new_with(Config::default(), SystemBackend, memory::page_size())
    }

    /// Accessor configured from the environment (see [`Config::from_env`]).
    pub fn from_env() -> Self {
        Self::new_with(Config::from_env(), SystemBackend, memory::page_size())
    }
}

impl Default for MemIo<SystemBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: MapBackend> MemIo<B> {
    pub(crate) fn new_with(config: Config, backend: B, page_size: usize) -> Self {
        Self {
            config,
            backend,
            page_size,
        }
    }

    /// Get the device path this accessor maps.
    pub fn device_path(&self) -> &Path {
        &self.config.device_path
    }

    /// Get the page size used to align mappings.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Read the value at `addr` into `out`.
    ///
    /// The width of `out` selects how many bytes are read. On error `out`
    /// keeps its previous payload.
    pub fn read(&self, addr: u64, out: &mut TypedValue) -> Result<()> {
        memory::read_at(
            &self.backend,
            &self.config.device_path,
            self.page_size,
            addr,
            out,
        )
    }

    /// Read a value of `width` at `addr`.
    pub fn read_width(&self, addr: u64, width: Width) -> Result<TypedValue> {
        let mut value = TypedValue::zeroed(width);
        self.read(addr, &mut value)?;
        Ok(value)
    }

    /// Write `value` to `addr`.
    ///
    /// An [`Error::Unmap`](crate::Error::Unmap) means the bytes most
    /// likely reached the device but the mapping was not cleanly released.
    pub fn write(&self, addr: u64, value: &TypedValue) -> Result<()> {
        memory::write_at(
            &self.backend,
            &self.config.device_path,
            self.page_size,
            addr,
            value,
        )
    }
}

/// Read the value at `addr` from `/dev/mem` into `out`.
pub fn read(addr: u64, out: &mut TypedValue) -> Result<()> {
    MemIo::new().read(addr, out)
}

/// Write `value` to `addr` through `/dev/mem`.
pub fn write(addr: u64, value: &TypedValue) -> Result<()> {
    MemIo::new().write(addr, value)
}
