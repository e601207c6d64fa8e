//! End-to-end tests against a regular file standing in for physical memory.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use memio::memory::{page_size, MmapRegion};
use memio::{Access, Error, MapBackend, MemIo, PathErrorKind, SystemBackend, TypedValue, Width};

const DUMMY_ERROR: &str = "This is a dummy error";

/// Sparse backing file covering `addr` plus one page.
fn backing_for(addr: u64) -> tempfile::NamedTempFile {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.as_file().set_len(addr + page_size() as u64 * 2).unwrap();
    tmp
}

fn file_bytes(path: &Path, addr: u64, len: usize) -> Vec<u8> {
    let mut file = File::open(path).unwrap();
    file.seek(SeekFrom::Start(addr)).unwrap();
    let mut buf = vec![0; len];
    file.read_exact(&mut buf).unwrap();
    buf
}

fn samples() -> Vec<TypedValue> {
    vec![
        TypedValue::Uint8(0x12),
        TypedValue::Uint16(0x1234),
        TypedValue::Uint32(0x1234_5678),
        TypedValue::Uint64(0x1234_5678_9abc_def0),
    ]
}

/// Map always fails.
struct FailingMap;

impl MapBackend for FailingMap {
    type Region = MmapRegion;

    fn map(&self, _file: &File, _offset: u64, _len: usize, _access: Access) -> io::Result<MmapRegion> {
        Err(io::Error::new(io::ErrorKind::Other, DUMMY_ERROR))
    }

    fn unmap(&self, region: MmapRegion) -> io::Result<()> {
        SystemBackend.unmap(region)
    }
}

/// Maps for real, releases the mapping, then reports failure.
struct FailingUnmap;

impl MapBackend for FailingUnmap {
    type Region = MmapRegion;

    fn map(&self, file: &File, offset: u64, len: usize, access: Access) -> io::Result<MmapRegion> {
        SystemBackend.map(file, offset, len, access)
    }

    fn unmap(&self, region: MmapRegion) -> io::Result<()> {
        SystemBackend.unmap(region)?;
        Err(io::Error::new(io::ErrorKind::Other, DUMMY_ERROR))
    }
}

#[test]
fn test_write_then_read_round_trip() {
    let page = page_size() as u64;
    let addrs = [0, 0x10, page - 8, page + 0x100, 0x100_0000];

    for addr in addrs {
        let tmp = backing_for(addr);
        let mem = MemIo::builder().device_path(tmp.path()).build().unwrap();

        for value in samples() {
            mem.write(addr, &value).unwrap();

            let mut out = TypedValue::zeroed(value.width());
            mem.read(addr, &mut out).unwrap();
            assert_eq!(out, value, "round trip at {:#x}", addr);
        }
    }
}

#[test]
fn test_write_42_then_read() {
    let tmp = backing_for(0x100_0000);
    let mem = MemIo::builder().device_path(tmp.path()).build().unwrap();

    mem.write(0x100_0000, &TypedValue::Uint32(42)).unwrap();

    let mut data = TypedValue::Uint32(0);
    mem.read(0x100_0000, &mut data).unwrap();
    assert_eq!(data, TypedValue::Uint32(42));
    assert_eq!(file_bytes(tmp.path(), 0x100_0000, 4), 42u32.to_ne_bytes());
}

#[test]
fn test_write_only_touches_its_window() {
    let tmp = backing_for(0x2000);
    let mem = MemIo::builder().device_path(tmp.path()).build().unwrap();

    mem.write(0x2002, &TypedValue::Uint16(0xffff)).unwrap();

    assert_eq!(file_bytes(tmp.path(), 0x2000, 6), vec![0, 0, 0xff, 0xff, 0, 0]);
}

#[test]
fn test_nonexistent_device_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("mem");
    let mem = MemIo::builder().device_path(&missing).build().unwrap();

    let err = mem.write(0x100_0000, &TypedValue::Uint32(1)).unwrap_err();
    assert!(err.is_not_found(), "{err}");

    for width in Width::ALL {
        for addr in [0, 0x1000, 0x100_0000] {
            let mut out = TypedValue::zeroed(width);
            assert!(mem.read(addr, &mut out).unwrap_err().is_not_found());
            assert!(mem.write(addr, &out).unwrap_err().is_not_found());
        }
    }
}

#[test]
fn test_map_failure_propagates() {
    let tmp = backing_for(0x100_0000);
    let mem = MemIo::builder()
        .device_path(tmp.path())
        .backend(FailingMap)
        .build()
        .unwrap();

    for value in samples() {
        let err = mem.write(0x100_0000, &value).unwrap_err();
        assert!(err.is_map_error());
        assert_eq!(err.source_io().unwrap().to_string(), DUMMY_ERROR);

        let mut out = TypedValue::zeroed(value.width());
        let err = mem.read(0x100_0000, &mut out).unwrap_err();
        assert!(matches!(err, Error::Map { .. }));
        assert_eq!(err.source_io().unwrap().to_string(), DUMMY_ERROR);
        assert_eq!(out.as_u64(), 0);
    }

    assert_eq!(file_bytes(tmp.path(), 0x100_0000, 8), vec![0; 8]);
}

#[test]
fn test_unmap_failure_after_write_still_transfers() {
    let tmp = backing_for(0x100_0000);
    let mem = MemIo::builder()
        .device_path(tmp.path())
        .backend(FailingUnmap)
        .build()
        .unwrap();

    let err = mem.write(0x100_0000, &TypedValue::Uint32(42)).unwrap_err();
    match &err {
        Error::Unmap { base, source } => {
            assert_eq!(*base, 0x100_0000);
            assert_eq!(source.to_string(), DUMMY_ERROR);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(file_bytes(tmp.path(), 0x100_0000, 4), 42u32.to_ne_bytes());

    let mut out = TypedValue::Uint32(0);
    let err = mem.read(0x100_0000, &mut out).unwrap_err();
    assert!(matches!(err, Error::Unmap { .. }));
}

#[test]
fn test_page_straddle_rejected() {
    let page = page_size() as u64;
    let tmp = backing_for(page);
    let mem = MemIo::builder().device_path(tmp.path()).build().unwrap();

    let err = mem.write(page - 2, &TypedValue::Uint32(1)).unwrap_err();
    assert!(err.is_map_error());
    assert!(matches!(err, Error::PageBoundary { width: 4, .. }));

    let mut out = TypedValue::Uint64(0);
    assert!(mem.read(page * 2 - 1, &mut out).unwrap_err().is_map_error());
}

#[test]
fn test_concurrent_disjoint_addresses() {
    let tmp = backing_for(0x4000);
    let mem = Arc::new(MemIo::builder().device_path(tmp.path()).build().unwrap());

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let mem = Arc::clone(&mem);
            std::thread::spawn(move || {
                let addr = i * 0x800;
                for n in 0..32u64 {
                    let value = TypedValue::Uint64(i << 32 | n);
                    mem.write(addr, &value).unwrap();
                    assert_eq!(mem.read_width(addr, Width::Eight).unwrap(), value);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_accessors_are_independent() {
    let a = backing_for(0x1000);
    let b = backing_for(0x1000);
    let mem_a = MemIo::builder().device_path(a.path()).build().unwrap();
    let mem_b = MemIo::builder().device_path(b.path()).build().unwrap();

    mem_a.write(0x1000, &TypedValue::Uint8(1)).unwrap();
    mem_b.write(0x1000, &TypedValue::Uint8(2)).unwrap();

    assert_eq!(mem_a.read_width(0x1000, Width::One).unwrap(), TypedValue::Uint8(1));
    assert_eq!(mem_b.read_width(0x1000, Width::One).unwrap(), TypedValue::Uint8(2));
}

#[test]
fn test_access_past_end_of_one_page_file() {
    let page = page_size() as u64;
    let tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.as_file().set_len(page).unwrap();
    let mem = MemIo::builder().device_path(tmp.path()).build().unwrap();

    let err = mem.write(0x100_0000, &TypedValue::Uint32(42)).unwrap_err();
    assert!(err.is_map_error(), "{err}");
    assert!(matches!(err, Error::PastEnd { addr: 0x100_0000, width: 4, .. }));

    let mut out = TypedValue::Uint32(7);
    let err = mem.read(0x100_0000, &mut out).unwrap_err();
    assert!(matches!(err, Error::PastEnd { .. }));
    assert_eq!(out, TypedValue::Uint32(7));

    // Last bytes of the file are still reachable.
    mem.write(page - 4, &TypedValue::Uint32(42)).unwrap();
    assert_eq!(mem.read_width(page - 4, Width::Four).unwrap(), TypedValue::Uint32(42));
    assert!(mem.read_width(page - 2, Width::Four).unwrap_err().is_map_error());
}

#[test]
fn test_partial_last_page() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.as_file().set_len(10_000).unwrap();
    let mem = MemIo::builder().device_path(tmp.path()).build().unwrap();

    mem.write(9_990, &TypedValue::Uint64(0x0102_0304_0506_0708)).unwrap();
    assert_eq!(
        mem.read_width(9_990, Width::Eight).unwrap(),
        TypedValue::Uint64(0x0102_0304_0506_0708)
    );
    assert!(mem.write(9_996, &TypedValue::Uint64(1)).unwrap_err().is_map_error());
}

#[test]
fn test_directory_device_is_other_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let mem = MemIo::builder().device_path(dir.path()).build().unwrap();

    let err = mem.write(0x1000, &TypedValue::Uint32(1)).unwrap_err();
    match &err {
        Error::Path { path, kind, .. } => {
            assert_eq!(path, dir.path());
            assert_eq!(*kind, PathErrorKind::Other);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_not_found());

    let mut out = TypedValue::Uint32(0);
    assert!(mem.read(0x1000, &mut out).is_err());
}
