use flexarc::archive::{ArchiveError, RawArchive};
use flexarc::bundle::{ArchiveKind, AssetBundle, FrameId};
use flexarc::directory::DirectoryError;
use flexarc::writer::FlexWriter;
use std::fs::File;
use std::io::Cursor;
use tempfile::NamedTempFile;

fn archive_bytes(records: &[Option<&[u8]>]) -> Vec<u8> {
    let mut w = FlexWriter::new(Vec::new());
    for r in records {
        match r {
            Some(data) => w.add_record(data).unwrap(),
            None => w.add_empty_record(),
        }
    }
    w.finalize().unwrap()
}

#[test]
fn test_pack_and_read_roundtrip() {
    let temp_file = NamedTempFile::new().unwrap();
    let archive_path = temp_file.path().to_path_buf();

    let records: Vec<&[u8]> = vec![
        b"first record contents",
        b"second record, different data",
        b"\x00\x01\x02\xff binary is fine too",
    ];

    {
        let mut w = FlexWriter::new(File::create(&archive_path).unwrap());
        for data in &records {
            w.add_record(data).unwrap();
        }
        w.finalize().unwrap();
    }

    {
        let mut ar = RawArchive::open(&archive_path).unwrap();
        assert_eq!(ar.record_count(), records.len() as u32);
        for (i, data) in records.iter().enumerate() {
            let got = ar.read_record(i as u32).unwrap().unwrap();
            assert_eq!(&got, data);
        }
    }
}

#[test]
fn test_zero_record_archive() {
    let bytes = archive_bytes(&[]);
    let mut ar = RawArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(ar.record_count(), 0);
    assert_eq!(ar.read_record(0).unwrap(), None);
}

#[test]
fn test_empty_and_out_of_range_are_absent() {
    let bytes = archive_bytes(&[Some(b"data"), None]);
    let mut ar = RawArchive::new(Cursor::new(bytes)).unwrap();

    assert_eq!(ar.record_count(), 2);
    assert!(ar.read_record(0).unwrap().is_some());

    // Zero-length slot: present in the directory, no data.
    assert_eq!(ar.record_size(1), Some(0));
    assert_eq!(ar.read_record(1).unwrap(), None);
    assert!(ar.record_source(1).unwrap().is_none());
    assert_eq!(ar.record_crc32(1).unwrap(), None);

    // Past the directory: not an error either.
    assert_eq!(ar.record_size(2), None);
    assert_eq!(ar.read_record(2).unwrap(), None);
    assert_eq!(ar.read_record(u32::MAX).unwrap(), None);
}

// Three records — "HELLO", an empty slot, "!XY" — with 15 padding bytes
// between the directory and the first payload.  Offsets are absolute from
// the start of the source: directory is 28 bytes, so HELLO sits at 43 and
// "!XY" at 48.
#[test]
fn test_handbuilt_byte_layout() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&3u32.to_le_bytes());
    bytes.extend_from_slice(&43u32.to_le_bytes()); // record 0: offset 43, len 5
    bytes.extend_from_slice(&5u32.to_le_bytes());
    bytes.extend_from_slice(&21u32.to_le_bytes()); // record 1: stale offset, len 0
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&48u32.to_le_bytes()); // record 2: offset 48, len 3
    bytes.extend_from_slice(&3u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 15]);
    bytes.extend_from_slice(b"HELLO");
    bytes.extend_from_slice(b"!XY");
    assert_eq!(bytes.len(), 51);

    let mut ar = RawArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(ar.record_count(), 3);
    assert_eq!(ar.read_record(0).unwrap().unwrap(), b"HELLO");
    assert_eq!(ar.read_record(1).unwrap(), None);
    assert_eq!(ar.read_record(2).unwrap().unwrap(), b"!XY");
}

#[test]
fn test_truncated_directory_fails_construction() {
    // Claims 1000 records but holds only the count field.
    let bytes = 1000u32.to_le_bytes().to_vec();
    let err = RawArchive::new(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::Malformed(DirectoryError::TruncatedDirectory { declared: 1000, .. })
    ));
}

#[test]
fn test_out_of_bounds_record_fails_construction() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&12u32.to_le_bytes()); // offset 12, len 100: past EOF
    bytes.extend_from_slice(&100u32.to_le_bytes());
    bytes.extend_from_slice(b"short");

    let err = RawArchive::new(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::Malformed(DirectoryError::RecordOutOfBounds { index: 0, .. })
    ));
}

#[test]
fn test_missing_source_is_reported_not_fatal() {
    let err = RawArchive::open("/no/such/archive.flx").unwrap_err();
    assert!(matches!(err, ArchiveError::MissingSource { .. }));
}

#[test]
fn test_repeated_reads_are_identical() {
    let bytes = archive_bytes(&[Some(b"idempotent payload"), Some(b"other")]);
    let mut ar = RawArchive::new(Cursor::new(bytes)).unwrap();

    let first = ar.read_record(0).unwrap().unwrap();
    // Interleave a read of another record to force a seek in between.
    ar.read_record(1).unwrap().unwrap();
    let second = ar.read_record(0).unwrap().unwrap();
    let third = ar.read_record(0).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_nested_sub_archive() {
    // glob.flx pattern: an outer archive whose records are themselves
    // archives.
    let inner = archive_bytes(&[Some(b"glob cell data"), None]);
    let outer = archive_bytes(&[Some(&inner), None, Some(b"not an archive")]);

    let mut ar = RawArchive::new(Cursor::new(outer)).unwrap();
    let sub_source = ar.record_source(0).unwrap().unwrap();
    let mut sub = RawArchive::new(sub_source).unwrap();
    assert_eq!(sub.record_count(), 2);
    assert_eq!(sub.read_record(0).unwrap().unwrap(), b"glob cell data");
    assert_eq!(sub.read_record(1).unwrap(), None);

    // Empty outer slot materializes no sub-stream.
    assert!(ar.record_source(1).unwrap().is_none());
}

#[test]
fn test_bundle_resolves_against_the_right_archive() {
    // Both archives have a valid record at index 2 with different contents.
    let shapes = archive_bytes(&[Some(b"shape 0"), Some(b"shape 1"), Some(b"shape 2")]);
    let gumps = archive_bytes(&[Some(b"gump 0"), Some(b"gump 1"), Some(b"gump 2")]);

    let mut bundle = AssetBundle::new();
    bundle.register(
        ArchiveKind::MainShapes,
        RawArchive::with_kind(Cursor::new(shapes), ArchiveKind::MainShapes.tag()).unwrap(),
    );
    bundle.register(
        ArchiveKind::Gumps,
        RawArchive::with_kind(Cursor::new(gumps), ArchiveKind::Gumps.tag()).unwrap(),
    );

    let from_gumps = bundle
        .resolve(FrameId::new(ArchiveKind::Gumps, 2, 0))
        .unwrap()
        .unwrap();
    assert_eq!(from_gumps, b"gump 2");

    let from_shapes = bundle
        .resolve(FrameId::new(ArchiveKind::MainShapes, 2, 7))
        .unwrap()
        .unwrap();
    assert_eq!(from_shapes, b"shape 2");

    // A kind that was never loaded resolves to absent, not an error.
    assert_eq!(
        bundle.resolve(FrameId::new(ArchiveKind::Music, 0, 0)).unwrap(),
        None
    );
}

#[test]
fn test_bundle_lookup_and_reregistration() {
    let a = archive_bytes(&[Some(b"v1")]);
    let b = archive_bytes(&[Some(b"v2")]);

    let mut bundle = AssetBundle::new();
    assert!(bundle.archive(ArchiveKind::Fonts).is_none());

    bundle.register(ArchiveKind::Fonts, RawArchive::new(Cursor::new(a)).unwrap());
    assert_eq!(bundle.archive(ArchiveKind::Fonts).unwrap().record_count(), 1);

    // A fresh load phase replaces the previous archive wholesale.
    bundle.register(ArchiveKind::Fonts, RawArchive::new(Cursor::new(b)).unwrap());
    let got = bundle
        .resolve(FrameId::new(ArchiveKind::Fonts, 0, 0))
        .unwrap()
        .unwrap();
    assert_eq!(got, b"v2");
}

#[test]
fn test_manifest_matches_directory() {
    let bytes = archive_bytes(&[Some(b"abc"), None, Some(b"defgh")]);
    let ar = RawArchive::new(Cursor::new(bytes)).unwrap();
    let manifest = ar.manifest();

    assert_eq!(manifest.record_count, 3);
    assert_eq!(manifest.records.len(), 3);
    assert_eq!(manifest.records[0].length, 3);
    assert!(manifest.records[1].empty);
    assert_eq!(manifest.records[2].length, 5);
    assert_eq!(manifest.records[2].offset, 31); // 4 + 3*8 + 3

    // Round-trips through the JSON tooling path.
    let json = serde_json::to_string(&manifest).unwrap();
    let back: flexarc::Manifest = serde_json::from_str(&json).unwrap();
    assert_eq!(back.record_count, 3);
}
