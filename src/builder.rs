//! Builder for configuring a [`MemIo`] accessor.

use std::path::PathBuf;

use crate::accessor::MemIo;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::memory::{page_size, MapBackend, SystemBackend};

/// Builder for creating a [`MemIo`].
///
/// # Example
///
/// ```rust,no_run
/// use memio::MemIo;
///
/// let mem = MemIo::builder()
///     .device_path("/dev/mem")
///     .build()?;
/// # Ok::<(), memio::Error>(())
/// ```
pub struct MemIoBuilder<B = SystemBackend> {
    device_path: Option<PathBuf>,
    backend: B,
}

impl Default for MemIoBuilder<SystemBackend> {
    fn default() -> Self {
        Self {
            device_path: None,
            backend: SystemBackend,
        }
    }
}

impl MemIoBuilder<SystemBackend> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: MapBackend> MemIoBuilder<B> {
    /// Set the path of the device file exposing physical memory.
    ///
    /// Default: `/dev/mem`
    pub fn device_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.device_path = Some(path.into());
        self
    }

    /// Take settings from an existing configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.device_path = Some(config.device_path);
        self
    }

    /// Replace the map/unmap backend.
    pub fn backend<N: MapBackend>(self, backend: N) -> MemIoBuilder<N> {
        MemIoBuilder {
            device_path: self.device_path,
            backend,
        }
    }

    /// Build the accessor.
    pub fn build(self) -> Result<MemIo<B>> {
        let device_path = self
            .device_path
            .unwrap_or_else(|| Config::default().device_path);

        if device_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("device path is empty".to_string()));
        }

        Ok(MemIo::new_with(
            Config { device_path },
            self.backend,
            page_size(),
        ))
    }
}
