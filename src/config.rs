//! Accessor configuration.
//!
//! The device path defaults to `/dev/mem`. Set the `MEMIO_DEVICE`
//! environment variable to point [`Config::from_env`] somewhere else, for
//! example at a regular file standing in for physical memory:
//! - `MEMIO_DEVICE=/tmp/fake-mem` - Read and write the file instead

use std::path::PathBuf;

/// Canonical physical memory device.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/mem";

/// Environment variable overriding the device path.
pub const DEVICE_ENV: &str = "MEMIO_DEVICE";

/// Settings bound to a [`MemIo`](crate::MemIo) at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File exposing physical memory.
    pub device_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
        }
    }
}

impl Config {
    /// Build a configuration from the environment.
    ///
    /// An unset or empty `MEMIO_DEVICE` keeps the default path.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<std::ffi::OsString>) -> Self {
        match lookup(DEVICE_ENV) {
            Some(val) if !val.is_empty() => Self {
                device_path: PathBuf::from(val),
            },
            _ => Self::default(),
        }
    }
}
