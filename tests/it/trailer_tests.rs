use pakdir::zipdir::{HeaderEncryption, HeaderSignature};
use pakdir::{CacheFactory, Flags, InitMethod, ZipDirError};
use rstest::rstest;
use tempfile::TempDir;

use crate::builder::*;

fn open_ro(path: &std::path::Path) -> Result<pakdir::Cache, ZipDirError> {
    CacheFactory::new(InitMethod::Default, Flags::READ_ONLY).open(path)
}

#[test]
fn appended_byte_makes_the_comment_inconsistent() {
    let dir = TempDir::new().unwrap();
    let mut bytes = pak_with(vec![store("a.txt", b"hello")]);
    bytes.push(0xAA);
    let path = write_pak(&dir, "appended.pak", &bytes);

    assert!(matches!(
        open_ro(&path),
        Err(ZipDirError::DataCorrupt(_))
    ));
}

#[rstest]
#[case::plus_one(1)]
#[case::minus_one(-1)]
fn mutated_comment_length_is_corrupt(#[case] delta: i32) {
    let dir = TempDir::new().unwrap();
    let mut bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        comment: b"trailing comment".to_vec(),
        ..Default::default()
    });
    // the comment-length field sits 2 bytes into the comment tail
    let field = bytes.len() - 16 - 2;
    let value = (16 + delta) as u16;
    bytes[field..field + 2].copy_from_slice(&value.to_le_bytes());
    let path = write_pak(&dir, "mutated.pak", &bytes);

    assert!(matches!(
        open_ro(&path),
        Err(ZipDirError::DataCorrupt(_))
    ));
}

#[test]
fn conflicting_encryption_declarations_are_corrupt() {
    let dir = TempDir::new().unwrap();
    let bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        comment: extended_trailer(3, 0),
        disk: 2 << 14, // legacy TEA hint
        ..Default::default()
    });
    let path = write_pak(&dir, "conflict.pak", &bytes);

    assert!(matches!(
        open_ro(&path),
        Err(ZipDirError::DataCorrupt(_))
    ));
}

#[test]
fn signed_directory_opens_and_records_the_signature() {
    let dir = TempDir::new().unwrap();
    let bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        comment: extended_trailer(0, 1),
        ..Default::default()
    });
    let path = write_pak(&dir, "signed.pak", &bytes);

    let cache = open_ro(&path).unwrap();
    assert_eq!(cache.signing(), HeaderSignature::CdrSigned);
    assert_eq!(cache.encryption(), HeaderEncryption::NotEncrypted);
    assert!(cache.signature_header().is_some());
    assert_eq!(cache.entry_count(), 1);
}

#[test]
fn keytable_encryption_is_identified_but_unreadable() {
    let dir = TempDir::new().unwrap();
    let bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        comment: extended_trailer(3, 0),
        ..Default::default()
    });
    let path = write_pak(&dir, "enc.pak", &bytes);

    // the trailer shape is accepted, but this reader ships no cipher
    assert!(matches!(
        open_ro(&path),
        Err(ZipDirError::Unsupported(_))
    ));
}

#[test]
fn keytable_encryption_on_an_empty_pak_is_recorded() {
    let dir = TempDir::new().unwrap();
    let bytes = build(&ArchiveSpec {
        comment: extended_trailer(3, 0),
        ..Default::default()
    });
    let path = write_pak(&dir, "encempty.pak", &bytes);

    let cache = open_ro(&path).unwrap();
    assert_eq!(cache.encryption(), HeaderEncryption::StreamcipherKeytable);
    assert!(cache.extended_header().is_some());
}

#[test]
fn legacy_hint_alone_is_honored() {
    let dir = TempDir::new().unwrap();
    let bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        disk: 1 << 14, // legacy streamcipher hint, no trailer
        ..Default::default()
    });
    let path = write_pak(&dir, "legacy.pak", &bytes);

    assert!(matches!(
        open_ro(&path),
        Err(ZipDirError::Unsupported(_))
    ));
}

#[rstest]
#[case::bad_self_size({
    let mut trailer = extended_trailer(0, 0);
    trailer[0] = 7;
    trailer
})]
#[case::bad_encryption_kind(extended_trailer(2, 0))]
#[case::bad_signing_kind({
    let mut trailer = extended_trailer(0, 0);
    trailer[4] = 9;
    trailer
})]
#[case::missing_sub_header({
    // declares signing but ships no signature header bytes
    extended_trailer(0, 1)[..6].to_vec()
})]
#[case::oversized_comment({
    let mut trailer = extended_trailer(0, 0);
    trailer.extend_from_slice(b"junk");
    trailer
})]
fn malformed_trailers_are_corrupt(#[case] trailer: Vec<u8>) {
    let dir = TempDir::new().unwrap();
    let bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        comment: trailer,
        ..Default::default()
    });
    let path = write_pak(&dir, "badtrailer.pak", &bytes);

    assert!(matches!(
        open_ro(&path),
        Err(ZipDirError::DataCorrupt(_))
    ));
}

#[test]
fn signature_header_self_size_is_verified() {
    let dir = TempDir::new().unwrap();
    let mut trailer = extended_trailer(0, 1);
    // corrupt the signature header's self-size word
    trailer[6..8].copy_from_slice(&131u16.to_le_bytes());
    let bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        comment: trailer,
        ..Default::default()
    });
    let path = write_pak(&dir, "badsig.pak", &bytes);

    assert!(matches!(
        open_ro(&path),
        Err(ZipDirError::DataCorrupt(_))
    ));
}

#[test]
fn plain_comments_are_tolerated() {
    let dir = TempDir::new().unwrap();
    // shorter than an extended header, so it is just a comment
    let bytes = build(&ArchiveSpec {
        entries: vec![store("a.txt", b"hello")],
        comment: b"hi".to_vec(),
        ..Default::default()
    });
    let path = write_pak(&dir, "comment.pak", &bytes);

    let cache = open_ro(&path).unwrap();
    assert_eq!(cache.entry_count(), 1);
    assert!(cache.extended_header().is_none());
}
