//! Page-aligned mapping layout for a single access.

use crate::error::{Error, Result};
use crate::memory::Width;

/// Where a single access lands once the device is mapped.
///
/// The mapping always starts on a page boundary and spans exactly one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    /// Page-aligned file offset the mapping starts at
    pub base: u64,
    /// Length of the mapping in bytes
    pub len: usize,
    /// Offset of the accessed value inside the mapping
    pub in_offset: usize,
    /// Access width in bytes
    pub width: usize,
}

impl RegionLayout {
    /// Compute the layout for an access of `width` at `addr`.
    ///
    /// Accesses that would straddle a page boundary are rejected.
    pub fn new(addr: u64, width: Width, page_size: usize) -> Result<Self> {
        debug_assert!(page_size.is_power_of_two());

        let in_offset = (addr % page_size as u64) as usize;
        let base = addr - in_offset as u64;
        let width = width.bytes();

        if in_offset + width > page_size {
            return Err(Error::PageBoundary {
                addr,
                width,
                page_size,
            });
        }

        Ok(Self {
            base,
            len: page_size,
            in_offset,
            width,
        })
    }

    /// Byte range of the value inside the mapping.
    pub fn window(&self) -> std::ops::Range<usize> {
        self.in_offset..self.in_offset + self.width
    }

    /// Physical address the access targets.
    pub fn addr(&self) -> u64 {
        self.base + self.in_offset as u64
    }
}
