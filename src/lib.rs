//! # memio
//!
//! Read and write fixed-width values at physical addresses by mapping the
//! device file that exposes physical memory (`/dev/mem` by default).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memio::{MemIo, Result, TypedValue};
//!
//! fn main() -> Result<()> {
//!     let mem = MemIo::builder()
//!         .device_path("/dev/mem")
//!         .build()?;
//!
//!     let mut value = TypedValue::Uint32(0);
//!     mem.read(0x100_0000, &mut value)?;
//!     println!("{:#x}", value);
//!     Ok(())
//! }
//! ```
//!
//! ## Platform Support
//!
//! Unix systems with `mmap(2)`. Access to `/dev/mem` normally needs root.

mod accessor;
mod builder;
pub mod config;
mod error;
pub mod memory;

// Re-exports
pub use accessor::{read, write, MemIo};
pub use builder::MemIoBuilder;
pub use config::Config;
pub use error::{Error, PathErrorKind, Result};
pub use memory::{Access, MapBackend, SystemBackend, TypedValue, Width};
