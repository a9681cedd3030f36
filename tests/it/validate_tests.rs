use pakdir::{CacheFactory, Flags, InitMethod, ZipDirError};
use tempfile::TempDir;

use crate::builder::*;

fn open_with(path: &std::path::Path, method: InitMethod) -> Result<pakdir::Cache, ZipDirError> {
    CacheFactory::new(method, Flags::READ_ONLY).open(path)
}

#[test]
fn deflated_entry_validates_clean() {
    let dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
    let bytes = pak_with(vec![deflate("c.dat", &data)]);
    let path = write_pak(&dir, "deflate.pak", &bytes);

    let cache = open_with(&path, InitMethod::Validate).unwrap();
    let entry = cache.find_entry("c.dat").unwrap();
    assert_eq!(entry.uncompressed_size, 1024);
    assert!(entry.compressed_size < entry.uncompressed_size);
    assert_eq!(entry.crc32, crc32fast::hash(&data));
}

#[test]
fn truncated_archive_fails_before_validation() {
    let dir = TempDir::new().unwrap();
    let bytes = pak_with(vec![
        store("A.TXT", b"hello"),
        store("dir/B.bin", &[0x01, 0x02, 0x03]),
    ]);
    let truncated = &bytes[..bytes.len() - 10];
    let path = write_pak(&dir, "truncated.pak", truncated);

    let err = open_with(&path, InitMethod::Validate).unwrap_err();
    assert!(
        matches!(err, ZipDirError::NoCdr | ZipDirError::DataCorrupt(_)),
        "unexpected error: {err:?}"
    );
}

#[test]
fn stored_payload_corruption_fails_the_crc_check() {
    let dir = TempDir::new().unwrap();
    let bytes = pak_with(vec![EntrySpec {
        raw: Some(RawPayload {
            stored: b"hellp".to_vec(), // one byte off
            compressed_size: 5,
            uncompressed_size: 5,
            crc32: crc32fast::hash(b"hello"),
        }),
        ..store("a.txt", b"")
    }]);
    let path = write_pak(&dir, "crc.pak", &bytes);

    // the default init method never touches payload bytes
    assert!(open_with(&path, InitMethod::Default).is_ok());

    assert!(matches!(
        open_with(&path, InitMethod::Validate),
        Err(ZipDirError::Crc32Check { .. })
    ));
}

#[test]
fn undecodable_deflate_stream_is_reported() {
    let dir = TempDir::new().unwrap();
    let bytes = pak_with(vec![EntrySpec {
        method: 8,
        raw: Some(RawPayload {
            stored: vec![0xFF; 16], // reserved block type, cannot decode
            compressed_size: 16,
            uncompressed_size: 64,
            crc32: 0,
        }),
        ..store("bad.bin", b"")
    }]);
    let path = write_pak(&dir, "badstream.pak", &bytes);

    assert!(matches!(
        open_with(&path, InitMethod::Validate),
        Err(ZipDirError::ZlibCorrupted)
    ));
}

#[test]
fn short_deflate_output_is_corrupted_data() {
    let dir = TempDir::new().unwrap();
    let deflated = deflate_bytes(b"abc");
    let bytes = pak_with(vec![EntrySpec {
        method: 8,
        raw: Some(RawPayload {
            compressed_size: deflated.len() as u32,
            stored: deflated,
            uncompressed_size: 10, // declares more than the stream holds
            crc32: 0,
        }),
        ..store("short.bin", b"")
    }]);
    let path = write_pak(&dir, "short.pak", &bytes);

    assert!(matches!(
        open_with(&path, InitMethod::Validate),
        Err(ZipDirError::CorruptedData(_))
    ));
}

#[test]
fn validate_rejects_exotic_methods() {
    let dir = TempDir::new().unwrap();
    let bytes = pak_with(vec![EntrySpec {
        method: 10,
        raw: Some(RawPayload {
            stored: b"cipher".to_vec(),
            compressed_size: 6,
            uncompressed_size: 6,
            crc32: 0,
        }),
        ..store("enc.bin", b"")
    }]);
    let path = write_pak(&dir, "method10.pak", &bytes);

    // the method passes through the index when not validating
    let cache = open_with(&path, InitMethod::Full).unwrap();
    assert_eq!(
        cache.find_entry("enc.bin").unwrap().method.as_u16(),
        10
    );

    assert!(matches!(
        open_with(&path, InitMethod::Validate),
        Err(ZipDirError::Unsupported(_))
    ));
}

#[test]
fn store_size_mismatch_fails_validation_in_any_mode() {
    let dir = TempDir::new().unwrap();
    let bytes = pak_with(vec![EntrySpec {
        raw: Some(RawPayload {
            stored: b"hello".to_vec(),
            compressed_size: 5,
            uncompressed_size: 6,
            crc32: crc32fast::hash(b"hello"),
        }),
        ..store("lie.txt", b"")
    }]);
    let path = write_pak(&dir, "lie.pak", &bytes);

    for method in [InitMethod::Default, InitMethod::Full, InitMethod::Validate] {
        assert!(matches!(
            open_with(&path, method),
            Err(ZipDirError::ValidationFailed(_))
        ));
    }
}

#[test]
fn needs_version_above_two_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let bytes = pak_with(vec![EntrySpec {
        needs_version: 21,
        ..store("new.txt", b"x")
    }]);
    let path = write_pak(&dir, "version.pak", &bytes);

    assert!(matches!(
        open_with(&path, InitMethod::Default),
        Err(ZipDirError::Unsupported(_))
    ));
}

#[test]
fn empty_stored_entry_validates() {
    let dir = TempDir::new().unwrap();
    let bytes = pak_with(vec![store("empty.txt", b""), store("tail.txt", b"t")]);
    let path = write_pak(&dir, "empty-entry.pak", &bytes);

    let cache = open_with(&path, InitMethod::Validate).unwrap();
    let entry = cache.find_entry("empty.txt").unwrap();
    assert_eq!(entry.compressed_size, 0);
    assert_eq!(entry.crc32, 0);
}
