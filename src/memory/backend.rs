//! Low-level map/unmap primitives.
//!
//! [`MapBackend`] is the seam between the mapper and the operating system.
//! Production code uses [`SystemBackend`], which calls `mmap(2)`/`munmap(2)`;
//! tests plug in their own implementations to exercise failure paths.

use std::fs::File;
use std::io;
use std::ops::{Deref, DerefMut};
use std::os::unix::io::AsRawFd;

/// Direction of an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Map read-only and copy out of the mapping.
    Read,
    /// Map read-write and copy into the mapping.
    Write,
}

impl Access {
    /// Memory protection flags for a mapping used for this access.
    pub fn prot(self) -> libc::c_int {
        match self {
            Access::Read => libc::PROT_READ,
            Access::Write => libc::PROT_READ | libc::PROT_WRITE,
        }
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// Capability to map a window of an open device file and release it again.
///
/// Errors are reported as raw [`io::Error`]s; the mapper wraps them with
/// the address context.
pub trait MapBackend {
    /// A live mapping, viewed as bytes.
    type Region: DerefMut<Target = [u8]>;

    /// Map `len` bytes of `file` starting at `offset`.
    fn map(&self, file: &File, offset: u64, len: usize, access: Access) -> io::Result<Self::Region>;

    /// Release a mapping previously returned by [`MapBackend::map`].
    fn unmap(&self, region: Self::Region) -> io::Result<()>;
}

/// Backend using the operating system's `mmap`/`munmap`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl MapBackend for SystemBackend {
    type Region = MmapRegion;

    fn map(&self, file: &File, offset: u64, len: usize, access: Access) -> io::Result<MmapRegion> {
        if len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "mapping length must be greater than 0",
            ));
        }

        let offset = libc::off_t::try_from(offset).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("offset 0x{:x} out of range", offset),
            )
        })?;

        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                access.prot(),
                libc::MAP_SHARED,
                file.as_raw_fd(),
                offset,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(MmapRegion {
            ptr: ptr as *mut u8,
            len,
        })
    }

    fn unmap(&self, region: MmapRegion) -> io::Result<()> {
        let (ptr, len) = region.into_raw();
        let ret = unsafe { libc::munmap(ptr as *mut libc::c_void, len) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// A shared mapping of a device file created by [`SystemBackend`].
///
/// Dropping the region without passing it to [`MapBackend::unmap`] still
/// releases the mapping, but any error is lost.
pub struct MmapRegion {
    /// Start of the mapping
    ptr: *mut u8,
    /// Length of the mapping in bytes
    len: usize,
}

// Safety: MmapRegion exclusively owns its mapping; nothing else aliases it.
unsafe impl Send for MmapRegion {}

impl MmapRegion {
    /// Take ownership of the raw mapping without unmapping it.
    fn into_raw(self) -> (*mut u8, usize) {
        let this = std::mem::ManuallyDrop::new(self);
        (this.ptr, this.len)
    }
}

impl Deref for MmapRegion {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl DerefMut for MmapRegion {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl Drop for MmapRegion {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            let ret = unsafe { libc::munmap(self.ptr as *mut libc::c_void, self.len) };
            if ret != 0 {
                tracing::warn!(
                    len = self.len,
                    error = %io::Error::last_os_error(),
                    "munmap on drop failed"
                );
            }
        }
    }
}

impl std::fmt::Debug for MmapRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapRegion")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}
