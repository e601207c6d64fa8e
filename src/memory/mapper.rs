//! Single-shot mapping of the device file around one access.
//!
//! Every access runs through the same sequence: open the device, map the
//! page holding the address, copy the value in or out, unmap, close. The
//! mapping is owned by a guard so it is released on every exit path, and
//! the file handle is only dropped once the unmap has been attempted.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::memory::backend::{Access, MapBackend};
use crate::memory::region::RegionLayout;
use crate::memory::value::{TypedValue, Width};

/// Read the value at `addr` from the device at `path` into `out`.
pub fn read_at<B: MapBackend>(
    backend: &B,
    path: &Path,
    page_size: usize,
    addr: u64,
    out: &mut TypedValue,
) -> Result<()> {
    with_mapping(
        backend,
        path,
        page_size,
        addr,
        out.width(),
        Access::Read,
        |window| out.from_bytes(window),
    )
}

/// Write `value` to `addr` on the device at `path`.
pub fn write_at<B: MapBackend>(
    backend: &B,
    path: &Path,
    page_size: usize,
    addr: u64,
    value: &TypedValue,
) -> Result<()> {
    let bytes = value.to_bytes();
    with_mapping(
        backend,
        path,
        page_size,
        addr,
        value.width(),
        Access::Write,
        |window| {
            window.copy_from_slice(&bytes);
            Ok(())
        },
    )
}

fn with_mapping<B, F>(
    backend: &B,
    path: &Path,
    page_size: usize,
    addr: u64,
    width: Width,
    access: Access,
    copy: F,
) -> Result<()>
where
    B: MapBackend,
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    let layout = RegionLayout::new(addr, width, page_size)?;
    let file = open_device(path, access)?;
    check_backing_len(&file, path, &layout)?;

    tracing::debug!(
        path = %path.display(),
        base = layout.base,
        len = layout.len,
        offset = layout.in_offset,
        %access,
        "mapping device"
    );

    let region = backend
        .map(&file, layout.base, layout.len, access)
        .map_err(|source| Error::Map {
            base: layout.base,
            len: layout.len,
            source,
        })?;

    let mut mapping = Mapping::new(backend, region, layout.base);
    let copied = window(mapping.bytes(), &layout).and_then(copy);
    let unmapped = mapping.release();
    drop(file);

    match (copied, unmapped) {
        (Ok(()), unmapped) => unmapped,
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(unmap_err)) => {
            tracing::warn!(error = %unmap_err, "unmap failed after failed copy");
            Err(err)
        }
    }
}

/// Open the device with the mode `access` needs.
fn open_device(path: &Path, access: Access) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(access == Access::Write)
        .custom_flags(libc::O_SYNC)
        .open(path)
        .map_err(|source| Error::path(path, source))
}

/// Reject accesses past the end of a regular backing file.
///
/// Touching a mapped page that lies past EOF raises SIGBUS. Device files
/// such as `/dev/mem` report a size of 0 and are not checked.
fn check_backing_len(file: &File, path: &Path, layout: &RegionLayout) -> Result<()> {
    let meta = file.metadata().map_err(|source| Error::path(path, source))?;
    let end = layout.addr() + layout.width as u64;
    if meta.is_file() && end > meta.len() {
        return Err(Error::PastEnd {
            addr: layout.addr(),
            width: layout.width,
            len: meta.len(),
        });
    }
    Ok(())
}

/// The bytes of `region` covered by the access.
fn window<'r>(region: &'r mut [u8], layout: &RegionLayout) -> Result<&'r mut [u8]> {
    let range = layout.window();
    if region.len() < range.end {
        return Err(Error::RegionTooShort {
            len: region.len(),
            needed: range.end,
        });
    }
    Ok(&mut region[range])
}

/// A live mapping that is unmapped when released or dropped.
struct Mapping<'a, B: MapBackend> {
    backend: &'a B,
    region: Option<B::Region>,
    base: u64,
}

impl<'a, B: MapBackend> Mapping<'a, B> {
    fn new(backend: &'a B, region: B::Region, base: u64) -> Self {
        Self {
            backend,
            region: Some(region),
            base,
        }
    }

    /// The mapped bytes; empty once released.
    fn bytes(&mut self) -> &mut [u8] {
        self.region.as_deref_mut().unwrap_or_default()
    }

    /// Unmap now and report the outcome.
    fn release(mut self) -> Result<()> {
        match self.region.take() {
            Some(region) => {
                tracing::debug!(base = self.base, "unmapping device");
                self.backend.unmap(region).map_err(|source| Error::Unmap {
                    base: self.base,
                    source,
                })
            }
            None => Ok(()),
        }
    }
}

impl<B: MapBackend> Drop for Mapping<'_, B> {
    fn drop(&mut self) {
        if let Some(region) = self.region.take() {
            if let Err(err) = self.backend.unmap(region) {
                tracing::warn!(
                    base = self.base,
                    error = %err,
                    "unmap on drop failed"
                );
            }
        }
    }
}
