/// Byte-level tests for framing, raster mapping, chunking, part naming, and
/// the manifest. No image files are involved.
use std::path::PathBuf;

use pixpack_core::chunker::{self, DEFAULT_MAX_CHUNK_SIZE};
use pixpack_core::frame::{self, FrameHeader, LEN_PREFIX_SIZE};
use pixpack_core::manifest::Manifest;
use pixpack_core::naming::{self, PartFile};
use pixpack_core::raster::{self, Raster};
use pixpack_core::PixpackError;

mod common;
use common::pseudo_random_bytes;

fn part(index: u32) -> PartFile {
    PartFile {
        index,
        path: PathBuf::from(naming::part_file_name(index, "png")),
    }
}

// ── framing ────────────────────────────────────────────────────────────────

#[test]
fn test_frame_prefix_is_big_endian_length() {
    let framed = frame::frame(b"hello").unwrap();
    assert_eq!(&framed[..4], &[0, 0, 0, 5]);
    assert_eq!(&framed[4..], b"hello");

    let header = FrameHeader::from_bytes(&[0x01, 0x02, 0x03, 0x04, 0xff]).unwrap();
    assert_eq!(header.payload_len, 0x0102_0304);
    assert_eq!(header.to_bytes(), [0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn test_frame_roundtrip_sizes() {
    for len in [0usize, 1, 2, 3, 7, 300, 4096 + 13] {
        let payload = pseudo_random_bytes(len, len as u64 + 1);
        let framed = frame::frame(&payload).unwrap();
        assert_eq!(framed.len(), frame::framed_len(len));
        assert_eq!(frame::unframe(&framed).unwrap(), payload.as_slice(), "len {len}");
    }
}

#[test]
fn test_unframe_discards_trailing_padding() {
    let mut framed = frame::frame(b"abc").unwrap();
    framed.extend_from_slice(&[0u8; 20]);
    assert_eq!(frame::unframe(&framed).unwrap(), b"abc");
}

#[test]
fn test_unframe_rejects_short_prefix() {
    let err = frame::unframe(&[0, 0, 1]).unwrap_err();
    assert!(matches!(err, PixpackError::MalformedFrame(_)), "got {err:?}");
}

#[test]
fn test_unframe_rejects_overlong_declared_length() {
    // declares 10 bytes, only 6 follow
    let buf = [0, 0, 0, 10, 1, 2, 3, 4, 5, 6];
    let err = frame::unframe(&buf).unwrap_err();
    assert!(matches!(err, PixpackError::MalformedFrame(_)), "got {err:?}");
    assert!(err.to_string().contains("declared payload of 10 bytes"));
}

// ── raster mapping ─────────────────────────────────────────────────────────

#[test]
fn test_side_is_ceil_sqrt_of_cells() {
    assert_eq!(raster::side_for(0), 1);
    assert_eq!(raster::side_for(3), 1);
    // 4-byte empty frame: 2 cells → 2x2
    assert_eq!(raster::side_for(4), 2);
    assert_eq!(raster::side_for(12), 2);
    assert_eq!(raster::side_for(13), 3);
    assert_eq!(raster::side_for(27), 3);
    assert_eq!(raster::side_for(28), 4);
    // 32 MiB + prefix
    assert_eq!(raster::side_for(32 * 1024 * 1024 + 4), 3345);
}

#[test]
fn test_encode_zero_pads_after_frame() {
    let framed = frame::frame(&[9, 8, 7, 6, 5]).unwrap();
    let r = raster::encode(&framed);
    assert_eq!((r.width(), r.height()), (2, 2));
    assert_eq!(r.pixels().len(), 12);
    assert_eq!(&r.pixels()[..9], framed.as_slice());
    assert!(r.pixels()[9..].iter().all(|&b| b == 0));

    // row-major, then column, then channel
    assert_eq!(r.pixel(0, 0), Some([0, 0, 0]));
    assert_eq!(r.pixel(0, 1), Some([5, 9, 8]));
    assert_eq!(r.pixel(1, 0), Some([7, 6, 5]));
    assert_eq!(r.pixel(1, 1), Some([0, 0, 0]));
    assert_eq!(r.pixel(2, 0), None);
}

#[test]
fn test_decode_encode_is_lossless() {
    for len in [0usize, 1, 5, 100, 10_000] {
        let framed = frame::frame(&pseudo_random_bytes(len, 7)).unwrap();
        let r = raster::encode(&framed);
        let flat = raster::decode(&r).unwrap();
        assert_eq!(&flat[..framed.len()], framed.as_slice());
        assert_eq!(raster::decode_payload(&r).unwrap(), &framed[LEN_PREFIX_SIZE..]);
    }
}

#[test]
fn test_payload_of_zero_bytes_survives_padding() {
    // a payload of zeros must not be confused with padding
    let payload = vec![0u8; 50];
    let r = raster::encode(&frame::frame(&payload).unwrap());
    assert_eq!(raster::decode_payload(&r).unwrap(), payload.as_slice());
}

#[test]
fn test_decode_rejects_tiny_raster() {
    let r = Raster::from_rgb(1, 1, vec![0, 0, 1]).unwrap();
    let err = raster::decode(&r).unwrap_err();
    assert!(matches!(err, PixpackError::ImageTooSmall { len: 3 }), "got {err:?}");

    let empty = Raster::from_rgb(0, 0, Vec::new()).unwrap();
    assert!(matches!(
        raster::decode_payload(&empty).unwrap_err(),
        PixpackError::ImageTooSmall { len: 0 }
    ));
}

#[test]
fn test_non_square_raster_decodes_in_row_order() {
    // 3 wide, 1 high: prefix 4 then "hello" in 9 bytes
    let mut pixels = frame::frame(b"hello").unwrap();
    pixels.resize(9, 0);
    let r = Raster::from_rgb(3, 1, pixels).unwrap();
    assert_eq!(raster::decode_payload(&r).unwrap(), b"hello");
}

#[test]
fn test_from_rgb_checks_length() {
    let err = Raster::from_rgb(2, 2, vec![0u8; 11]).unwrap_err();
    assert!(matches!(
        err,
        PixpackError::InvalidRaster {
            expected: 12,
            actual: 11,
            ..
        }
    ));
}

// ── chunking ───────────────────────────────────────────────────────────────

#[test]
fn test_split_join_identity() {
    let data = pseudo_random_bytes(1000, 42);
    for max in [1u64, 7, 100, 999, 1000, 1001, 4096] {
        let chunks = chunker::split(&data, max).unwrap();
        let expected = data.len().div_ceil(max as usize);
        assert_eq!(chunks.len(), expected, "max {max}");
        assert_eq!(chunks.len(), chunker::chunk_count(data.len(), max).unwrap());

        let (last, full) = chunks.split_last().unwrap();
        assert!(full.iter().all(|c| c.len() == max as usize));
        assert!(!last.is_empty() && last.len() <= max as usize);

        assert_eq!(chunker::join(&chunks), data);
    }
}

#[test]
fn test_split_empty_stream_yields_one_empty_chunk() {
    let chunks = chunker::split(&[], DEFAULT_MAX_CHUNK_SIZE).unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].is_empty());
    assert!(chunker::join(&chunks).is_empty());
}

#[test]
fn test_split_rejects_bad_chunk_size() {
    assert!(matches!(
        chunker::split(b"abc", 0).unwrap_err(),
        PixpackError::InvalidChunkSize(0)
    ));
    assert!(matches!(
        chunker::split(b"abc", u32::MAX as u64 + 1).unwrap_err(),
        PixpackError::InvalidChunkSize(_)
    ));
}

/// Two full 32 MiB chunks plus one byte, through frame + raster and back.
#[test]
fn test_two_full_chunks_plus_one_byte_reassemble() {
    let max = DEFAULT_MAX_CHUNK_SIZE;
    let len = 2 * max as usize + 1;
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();

    let chunks = chunker::split(&data, max).unwrap();
    let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![max as usize, max as usize, 1]);

    let mut payloads = Vec::new();
    for chunk in &chunks {
        let r = raster::encode(&frame::frame(chunk).unwrap());
        payloads.push(raster::decode_payload(&r).unwrap().to_vec());
    }
    let joined = chunker::join(&payloads);
    assert_eq!(joined.len(), len);
    assert!(joined == data);
}

#[test]
fn test_three_full_chunks_plus_one_byte_count() {
    let max = DEFAULT_MAX_CHUNK_SIZE;
    let data = vec![0xabu8; 3 * max as usize + 1];
    let chunks = chunker::split(&data, max).unwrap();
    let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![max as usize, max as usize, max as usize, 1]);
    assert_eq!(chunker::join(&chunks).len(), data.len());
}

// ── part naming ────────────────────────────────────────────────────────────

#[test]
fn test_part_names_parse_back() {
    assert_eq!(naming::part_file_name(7, "png"), "encoded_part_7.png");
    assert_eq!(naming::parse_part_index("encoded_part_7.png", "png"), Some(7));
    assert_eq!(naming::parse_part_index("encoded_part_12.PNG", "png"), Some(12));
    assert_eq!(naming::parse_part_index("encoded_part_007.png", "png"), Some(7));

    for bad in [
        "encoded_part_0.png",
        "encoded_part_.png",
        "encoded_part_1a.png",
        "encoded_part_-1.png",
        "encoded_part_1.jpg",
        "encoded_part_1.png.bak",
        "part_1.png",
        "pixpack_manifest.json",
    ] {
        assert_eq!(naming::parse_part_index(bad, "png"), None, "{bad}");
    }
}

#[test]
fn test_order_parts_sorts_numerically() {
    let ordered = naming::order_parts(vec![part(3), part(1), part(2)]).unwrap();
    let indices: Vec<u32> = ordered.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    let ordered = naming::order_parts((1..=12).rev().map(part).collect()).unwrap();
    let names: Vec<String> = ordered.iter().map(|p| p.file_name()).collect();
    assert_eq!(names[8], "encoded_part_9.png");
    assert_eq!(names[9], "encoded_part_10.png");
}

#[test]
fn test_order_parts_rejects_gaps_and_duplicates() {
    let err = naming::order_parts(vec![part(1), part(3)]).unwrap_err();
    assert!(matches!(err, PixpackError::MissingPart(2)), "got {err:?}");

    let err = naming::order_parts(vec![part(2), part(3)]).unwrap_err();
    assert!(matches!(err, PixpackError::MissingPart(1)), "got {err:?}");

    let padded = PartFile {
        index: 1,
        path: PathBuf::from("encoded_part_01.png"),
    };
    let err = naming::order_parts(vec![part(1), padded]).unwrap_err();
    assert!(matches!(err, PixpackError::DuplicatePart { index: 1, .. }), "got {err:?}");
}

#[test]
fn test_discover_parts_ignores_other_files() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["encoded_part_2.png", "encoded_part_1.png", "notes.txt", "encoded_part_x.png"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    std::fs::create_dir(dir.path().join("encoded_part_3.png")).unwrap();

    let parts = naming::discover_parts(dir.path(), "png").unwrap();
    let indices: Vec<u32> = parts.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2]);

    let empty = tempfile::tempdir().unwrap();
    assert!(matches!(
        naming::discover_parts(empty.path(), "png").unwrap_err(),
        PixpackError::NoParts(_)
    ));
}

// ── manifest ───────────────────────────────────────────────────────────────

#[test]
fn test_manifest_write_load_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let stream = pseudo_random_bytes(25, 3);
    let chunks = chunker::split(&stream, 10).unwrap();

    let mut manifest = Manifest::new("zip", "png", 10);
    for (i, chunk) in chunks.iter().enumerate() {
        let index = i as u32 + 1;
        manifest.push_part(index, &naming::part_file_name(index, "png"), chunk);
    }
    manifest.seal(&stream);
    manifest.write(dir.path()).unwrap();

    let loaded = Manifest::load(dir.path()).unwrap().expect("manifest present");
    assert_eq!(loaded, manifest);
    assert_eq!(loaded.total_len, 25);
    assert_eq!(loaded.parts.len(), 3);

    loaded.verify_parts(&[part(1), part(2), part(3)]).unwrap();
    loaded.verify_payload(2, chunks[1]).unwrap();
    loaded.verify_stream(&stream).unwrap();

    assert!(matches!(
        loaded.verify_parts(&[part(1), part(3)]).unwrap_err(),
        PixpackError::MissingPart(2)
    ));
    assert!(matches!(
        loaded.verify_parts(&[part(1), part(2), part(3), part(4)]).unwrap_err(),
        PixpackError::ManifestMismatch(_)
    ));

    let mut tampered = chunks[1].to_vec();
    tampered[0] ^= 0xff;
    assert!(matches!(
        loaded.verify_payload(2, &tampered).unwrap_err(),
        PixpackError::ChecksumMismatch { .. }
    ));
    assert!(matches!(
        loaded.verify_payload(2, &tampered[1..]).unwrap_err(),
        PixpackError::ManifestMismatch(_)
    ));
}

#[test]
fn test_manifest_absent_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Manifest::load(dir.path()).unwrap().is_none());
}
