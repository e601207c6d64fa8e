//! Physical memory mapping.
//!
//! This module turns a physical address and a [`TypedValue`] into a short
//! lived mapping of the device file, copies the value, and tears the mapping
//! down again. The OS calls sit behind [`MapBackend`] so they can be
//! replaced.

mod backend;
mod mapper;
mod region;
mod value;

use std::sync::OnceLock;

pub use backend::{Access, MapBackend, MmapRegion, SystemBackend};
pub use mapper::{read_at, write_at};
pub use region::RegionLayout;
pub use value::{TypedValue, Width};

/// Fallback when `sysconf` cannot report the page size.
const DEFAULT_PAGE_SIZE: usize = 4096;

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// The system page size, queried once.
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            DEFAULT_PAGE_SIZE
        }
    })
}
