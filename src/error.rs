//! Error types for memio.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using memio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why the backing device could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorKind {
    /// The path does not exist.
    NotFound,
    /// The caller may not open the path with the requested mode.
    PermissionDenied,
    /// Any other open failure.
    Other,
}

impl PathErrorKind {
    /// Classify an open failure.
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => PathErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => PathErrorKind::PermissionDenied,
            _ => PathErrorKind::Other,
        }
    }
}

impl std::fmt::Display for PathErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathErrorKind::NotFound => write!(f, "not found"),
            PathErrorKind::PermissionDenied => write!(f, "permission denied"),
            PathErrorKind::Other => write!(f, "open failed"),
        }
    }
}

/// Errors that can occur when accessing physical memory.
#[derive(Error, Debug)]
pub enum Error {
    // Device errors
    #[error("{}: {kind}: {source}", .path.display())]
    Path {
        path: PathBuf,
        kind: PathErrorKind,
        #[source]
        source: io::Error,
    },

    // Value errors
    #[error("width mismatch: expected {expected} bytes, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("unsupported width: {0} bytes (must be 1, 2, 4 or 8)")]
    UnsupportedWidth(usize),

    #[error("value 0x{value:x} does not fit in {width} bytes")]
    ValueOverflow { value: u64, width: usize },

    // Mapping errors
    #[error("mmap of 0x{len:x} bytes at 0x{base:x} failed: {source}")]
    Map {
        base: u64,
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error("access of {width} bytes at 0x{addr:x} crosses a 0x{page_size:x} page boundary")]
    PageBoundary {
        addr: u64,
        width: usize,
        page_size: usize,
    },

    #[error("access of {width} bytes at 0x{addr:x} is past the end of the 0x{len:x}-byte backing file")]
    PastEnd { addr: u64, width: usize, len: u64 },

    #[error("mapped region is {len} bytes, need {needed}")]
    RegionTooShort { len: usize, needed: usize },

    #[error("munmap at 0x{base:x} failed: {source}")]
    Unmap {
        base: u64,
        #[source]
        source: io::Error,
    },

    // Configuration errors
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a path error, classifying the underlying open failure.
    pub(crate) fn path(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Path {
            path: path.into(),
            kind: PathErrorKind::classify(&source),
            source,
        }
    }

    /// Whether this is a path error caused by a missing device file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Path {
                kind: PathErrorKind::NotFound,
                ..
            }
        )
    }

    /// Whether the mapping step rejected or failed the access.
    pub fn is_map_error(&self) -> bool {
        matches!(
            self,
            Error::Map { .. } | Error::PageBoundary { .. } | Error::PastEnd { .. }
        )
    }

    /// The OS-level error wrapped by this error, if any.
    pub fn source_io(&self) -> Option<&io::Error> {
        match self {
            Error::Path { source, .. } | Error::Map { source, .. } | Error::Unmap { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_open_errors() {
        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(PathErrorKind::classify(&missing), PathErrorKind::NotFound);

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(PathErrorKind::classify(&denied), PathErrorKind::PermissionDenied);

        let other = io::Error::from(io::ErrorKind::InvalidInput);
        assert_eq!(PathErrorKind::classify(&other), PathErrorKind::Other);
    }

    #[test]
    fn test_error_predicates() {
        let err = Error::path("/nope", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(!err.is_map_error());
        assert!(err.to_string().starts_with("/nope: not found"));

        let err = Error::PageBoundary {
            addr: 0xffe,
            width: 4,
            page_size: 0x1000,
        };
        assert!(err.is_map_error());
        assert!(err.source_io().is_none());

        let err = Error::PastEnd {
            addr: 0x100_0000,
            width: 4,
            len: 0x1000,
        };
        assert!(err.is_map_error());
        assert!(!err.is_not_found());
    }
}
