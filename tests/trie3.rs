// This file is part of ICU4X. For terms of use, please see the file
// called LICENSE at the top level of the ICU4X source tree
// (online at: https://github.com/unicode-org/icu4x/blob/main/LICENSE ).

use utrie3::impl_const::*;
use utrie3::*;
use zerovec::ZeroVec;

fn trie32(header: CodePointTrieHeader, index: &[u16], data: &[u32]) -> CodePointTrie<'static> {
    CodePointTrie::try_new(
        header,
        ZeroVec::alloc_from_slice(index),
        CodePointTrieData::Bits32(ZeroVec::alloc_from_slice(data)),
    )
    .unwrap()
}

fn trie16(header: CodePointTrieHeader, index: &[u16], data: &[u16]) -> CodePointTrie<'static> {
    CodePointTrie::try_new(
        header,
        ZeroVec::alloc_from_slice(index),
        CodePointTrieData::Bits16(ZeroVec::alloc_from_slice(data)),
    )
    .unwrap()
}

fn header(
    high_start: u32,
    index2_null_offset: u16,
    data_null_offset: u32,
    high_value: u32,
    error_value: u32,
) -> CodePointTrieHeader {
    CodePointTrieHeader {
        high_start,
        shifted_high_start: (high_start >> SHIFT_1) as u16,
        index2_null_offset,
        data_null_offset,
        high_value,
        error_value,
    }
}

/// Every code point maps to 7 and the index and data arrays cover nothing:
/// the high range starts at zero. (The 0x80 ASCII data entries exist
/// regardless; the layout always carries them.)
fn all_default_trie() -> CodePointTrie<'static> {
    let index = vec![0u16; INDEX_1_OFFSET as usize];
    let data = vec![7u32; ASCII_LIMIT as usize];
    trie32(
        header(0, NO_INDEX2_NULL_OFFSET, NO_DATA_NULL_OFFSET, 7, 0),
        &index,
        &data,
    )
}

/// A fully-indexed BMP with `'A'` mapped to 9 and everything else 7,
/// 32-bit values. Data layout: four linear ASCII blocks, then the null
/// block.
fn ascii_override_trie32() -> CodePointTrie<'static> {
    let mut index = vec![0u16; INDEX_1_OFFSET as usize];
    for (i, entry) in index.iter_mut().enumerate().take(4) {
        *entry = (i as u16) * (DATA_BLOCK_LENGTH as u16);
    }
    for entry in index.iter_mut().skip(4) {
        *entry = 128;
    }
    let mut data = vec![7u32; 160];
    data[0x41] = 9;
    trie32(header(0x10000, NO_INDEX2_NULL_OFFSET, 128, 7, 0), &index, &data)
}

/// The same mapping with 16-bit values: the data array is appended to the
/// index array, so every data offset stored in the index (and the data
/// null offset) is shifted up by the index length.
fn ascii_override_trie16() -> CodePointTrie<'static> {
    let index_length = INDEX_1_OFFSET as u16;
    let mut index = vec![0u16; INDEX_1_OFFSET as usize];
    for (i, entry) in index.iter_mut().enumerate().take(4) {
        *entry = index_length + (i as u16) * (DATA_BLOCK_LENGTH as u16);
    }
    for entry in index.iter_mut().skip(4) {
        *entry = index_length + 128;
    }
    let mut data = vec![7u16; 160];
    data[0x41] = 9;
    trie16(
        header(
            0x10000,
            NO_INDEX2_NULL_OFFSET,
            u32::from(index_length) + 128,
            7,
            0,
        ),
        &index,
        &data,
    )
}

/// Value 2 on the supplementary plane 2 (`U+20000..=U+2FFFF`), 0
/// everywhere else, error value 1. Exercises the index-1 table, a
/// dedicated index-2 null block, and the shifted storage of supplementary
/// data offsets.
fn supplementary_trie() -> CodePointTrie<'static> {
    let index_length = 2048 + 8 + 512 + 512;
    let mut index = vec![0u16; index_length];
    // Linear ASCII blocks; the rest of the BMP shares the null block at
    // data offset 0.
    for i in 0..4 {
        index[i] = (i as u16) * (DATA_BLOCK_LENGTH as u16);
    }
    // Index-1 entries: plane 1 -> the index-2 null block, plane 2 -> the
    // index-2 block describing the value-2 data.
    let index2_null_offset = 2048 + 8;
    let plane2_i2_block = index2_null_offset + 512;
    for i1 in 2048..2052 {
        index[i1] = index2_null_offset as u16;
    }
    for i1 in 2052..2056 {
        index[i1] = plane2_i2_block as u16;
    }
    // The index-2 null block: every entry points (shifted) at the data
    // null block.
    // (Data null offset 0 >> INDEX_SHIFT == 0, which the vec already holds.)
    // The plane-2 index-2 block: every entry points (shifted) at the
    // value-2 data block at offset 128.
    for i2 in plane2_i2_block..plane2_i2_block + 512 {
        index[i2] = (128 >> INDEX_SHIFT) as u16;
    }
    let mut data = vec![0u32; 160];
    for entry in data.iter_mut().skip(128) {
        *entry = 2;
    }
    trie32(
        header(0x30000, index2_null_offset as u16, 0, 0, 1),
        &index,
        &data,
    )
}

/// Sweeps every code point one by one and asserts the looked-up value
/// matches the `(limit, value)` pairs of `check_ranges`, then checks the
/// inputs beyond the Unicode range.
fn check_trie(trie: &CodePointTrie, check_ranges: &[u32]) {
    assert_eq!(
        0,
        check_ranges.len() % 2,
        "check_ranges must have an even number of values in (limit, value) pairs"
    );
    let mut i = 0;
    for pair in check_ranges.chunks(2) {
        let range_limit = pair[0];
        let range_value = pair[1];
        while i < range_limit {
            assert_eq!(range_value, trie.get32(i), "get32({i:#x})");
            i += 1;
        }
    }
    assert_eq!(i, CODE_POINT_MAX + 1, "check_ranges must cover all of Unicode");
    assert_eq!(trie.error_value(), trie.get32(CODE_POINT_MAX + 1));
    assert_eq!(trie.error_value(), trie.get32(u32::MAX));
}

/// Walks `iter_ranges()` and asserts it produces exactly the partition
/// described by `check_ranges`, each range making forward progress.
fn check_ranges_via_iter(trie: &CodePointTrie, check_ranges: &[u32]) {
    let mut trie_ranges = trie.iter_ranges();
    let mut range_start = 0;
    for pair in check_ranges.chunks(2) {
        let range_limit = pair[0];
        let range_value = pair[1];
        let cpm_range = trie_ranges
            .next()
            .expect("iter_ranges() ended before the expected ranges did");
        assert_eq!(*cpm_range.range.start(), range_start);
        assert_eq!(*cpm_range.range.end() + 1, range_limit);
        assert_eq!(cpm_range.value, range_value);
        assert!(*cpm_range.range.end() >= range_start);
        range_start = range_limit;
    }
    assert_eq!(range_start, CODE_POINT_MAX + 1);
    assert!(trie_ranges.next().is_none());
}

fn run_trie_tests(trie: &CodePointTrie, check_ranges: &[u32]) {
    check_trie(trie, check_ranges);
    check_ranges_via_iter(trie, check_ranges);
}

#[test]
fn all_default() {
    let trie = all_default_trie();
    run_trie_tests(&trie, &[0x110000, 7]);
    assert_eq!(trie.get32(0x110000), 0);
    assert_eq!(
        trie.get_range(0),
        Some(CodePointMapRange {
            range: 0..=0x10ffff,
            value: 7
        })
    );
    assert_eq!(trie.initial_value(), 7);
}

#[test]
fn ascii_override_32() {
    let trie = ascii_override_trie32();
    assert_eq!(trie.get32(0x40), 7);
    assert_eq!(trie.get32(0x41), 9);
    assert_eq!(trie.get32(0x42), 7);
    assert_eq!(trie.get('A'), 9);
    run_trie_tests(&trie, &[0x41, 7, 0x42, 9, 0x110000, 7]);
}

#[test]
fn ascii_override_16() {
    let trie = ascii_override_trie16();
    assert_eq!(trie.value_width(), ValueWidth::Bits16);
    assert_eq!(trie.get32(0x41), 9);
    assert_eq!(trie.initial_value(), 7);
    run_trie_tests(&trie, &[0x41, 7, 0x42, 9, 0x110000, 7]);
}

#[test]
fn supplementary() {
    let trie = supplementary_trie();
    assert_eq!(trie.get32(0x1ffff), 0);
    assert_eq!(trie.get32(0x20000), 2);
    assert_eq!(trie.get32(0x2ffff), 2);
    assert_eq!(trie.get32(0x30000), 0);
    assert_eq!(trie.get32(0x110000), 1);
    run_trie_tests(&trie, &[0x20000, 0, 0x30000, 2, 0x110000, 0]);
}

#[test]
fn get_range_from_inside_a_run() {
    let trie = supplementary_trie();
    let range = trie.get_range(0x23456).unwrap();
    assert_eq!(range.range, 0x23456..=0x2ffff);
    assert_eq!(range.value, 2);

    let range = trie.get_range(0x2ffff).unwrap();
    assert_eq!(range.range, 0x2ffff..=0x2ffff);
    assert_eq!(range.value, 2);

    let trie = ascii_override_trie32();
    let range = trie.get_range(0x42).unwrap();
    assert_eq!(range.range, 0x42..=0x10ffff);
    assert_eq!(range.value, 7);

    assert!(trie.get_range(0x110000).is_none());
}

#[test]
fn get_range_mapped_coalesces() {
    // Collapsing 2 into the default merges the whole space into one range.
    let trie = supplementary_trie();
    let range = trie
        .get_range_mapped(0, |value| if value == 2 { 0 } else { value })
        .unwrap();
    assert_eq!(range.range, 0..=0x10ffff);
    assert_eq!(range.value, 0);

    let trie = ascii_override_trie32();
    let range = trie
        .get_range_mapped(0, |value| if value == 9 { 7 } else { value })
        .unwrap();
    assert_eq!(range.range, 0..=0x10ffff);
    assert_eq!(range.value, 7);
}

#[test]
fn iter_ranges_for_value() {
    let trie = supplementary_trie();
    let ranges: Vec<_> = trie.iter_ranges_for_value(2).collect();
    assert_eq!(ranges, vec![0x20000..=0x2ffff]);
}

#[test]
fn serialize_deserialize_roundtrip_32() {
    let trie = ascii_override_trie32();
    let bytes = trie.to_bytes();
    assert_eq!(bytes.len(), trie.serialized_length());
    assert_eq!(bytes.len(), HEADER_LENGTH + 2048 * 2 + 160 * 4);

    let deserialized = CodePointTrie::try_from_bytes(ValueWidth::Bits32, &bytes).unwrap();
    assert_eq!(deserialized, trie);
    run_trie_tests(&deserialized, &[0x41, 7, 0x42, 9, 0x110000, 7]);

    // Byte-for-byte idempotence of the writer.
    assert_eq!(deserialized.to_bytes(), bytes);
}

#[test]
fn serialize_deserialize_roundtrip_16() {
    let trie = ascii_override_trie16();
    let bytes = trie.to_bytes();
    assert_eq!(bytes.len(), HEADER_LENGTH + 2048 * 2 + 160 * 2);

    let deserialized = CodePointTrie::try_from_bytes(ValueWidth::Bits16, &bytes).unwrap();
    assert_eq!(deserialized, trie);
    assert_eq!(deserialized.initial_value(), 7);
    assert_eq!(deserialized.to_bytes(), bytes);
}

#[test]
fn serialize_deserialize_roundtrip_supplementary() {
    let trie = supplementary_trie();
    let bytes = trie.to_bytes();
    let deserialized = CodePointTrie::try_from_bytes(ValueWidth::Bits32, &bytes).unwrap();
    assert_eq!(deserialized, trie);
    run_trie_tests(&deserialized, &[0x20000, 0, 0x30000, 2, 0x110000, 0]);
}

#[test]
fn deserialize_rejects_corruption() {
    let trie = ascii_override_trie32();
    let bytes = trie.to_bytes();

    // Wrong signature.
    let mut corrupted = bytes.clone();
    corrupted[0] ^= 0xff;
    assert!(matches!(
        CodePointTrie::try_from_bytes(ValueWidth::Bits32, &corrupted),
        Err(Error::InvalidFormat { .. })
    ));

    // Reserved options bits set.
    let mut corrupted = bytes.clone();
    corrupted[5] |= 0x01;
    assert!(matches!(
        CodePointTrie::try_from_bytes(ValueWidth::Bits32, &corrupted),
        Err(Error::InvalidFormat { .. })
    ));

    // Value width disagreeing with the caller.
    assert!(matches!(
        CodePointTrie::try_from_bytes(ValueWidth::Bits16, &bytes),
        Err(Error::InvalidFormat { .. })
    ));

    // Image too short for the declared arrays.
    assert!(matches!(
        CodePointTrie::try_from_bytes(ValueWidth::Bits32, &bytes[..bytes.len() - 4]),
        Err(Error::InvalidFormat { .. })
    ));

    // Image too short for the header.
    assert!(matches!(
        CodePointTrie::try_from_bytes(ValueWidth::Bits32, &bytes[..10]),
        Err(Error::InvalidFormat { .. })
    ));
}

#[test]
fn serialize_into_reports_required_size() {
    let trie = ascii_override_trie32();
    let needed = trie.serialized_length();

    let mut small = vec![0u8; needed - 1];
    assert_eq!(
        trie.serialize_into(&mut small),
        Err(Error::BufferOverflow { needed })
    );

    // A retry with the reported size succeeds, and extra capacity is fine.
    let mut exact = vec![0u8; needed + 100];
    assert_eq!(trie.serialize_into(&mut exact), Ok(needed));
    assert_eq!(&exact[..needed], &trie.to_bytes()[..]);
}

#[test]
fn swap_involutive_32() {
    let trie = supplementary_trie();
    let le = trie.to_bytes();

    let mut be = vec![0u8; le.len()];
    assert_eq!(swap(&le, &mut be), Ok(le.len()));
    assert_ne!(be, le);
    // Scalars really are byte-reversed: the error value 1 sits at header
    // bytes 20..24.
    assert_eq!(&le[20..24], &[1, 0, 0, 0]);
    assert_eq!(&be[20..24], &[0, 0, 0, 1]);

    // A swapped image no longer deserializes, but the probe still
    // recognizes it when told to tolerate either endianness.
    assert!(CodePointTrie::try_from_bytes(ValueWidth::Bits32, &be).is_err());
    assert_eq!(get_version(&be, false), 0);
    assert_eq!(get_version(&be, true), 3);

    let mut back = vec![0u8; be.len()];
    assert_eq!(swap(&be, &mut back), Ok(be.len()));
    assert_eq!(back, le);
}

#[test]
fn swap_in_place_roundtrip_16() {
    let trie = ascii_override_trie16();
    let le = trie.to_bytes();

    let mut buf = le.clone();
    assert_eq!(swap_in_place(&mut buf), Ok(le.len()));
    assert_ne!(buf, le);
    assert_eq!(swap_in_place(&mut buf), Ok(le.len()));
    assert_eq!(buf, le);
}

#[test]
fn swap_validates_sizes() {
    let trie = ascii_override_trie32();
    let le = trie.to_bytes();
    assert_eq!(swapped_size(&le), Ok(le.len()));

    let mut too_small = vec![0u8; le.len() - 1];
    assert_eq!(swap(&le, &mut too_small), Err(Error::IndexOutOfBounds));

    // Truncated input.
    let mut output = vec![0u8; le.len()];
    assert_eq!(swap(&le[..le.len() - 1], &mut output), Err(Error::IndexOutOfBounds));

    // Garbage input.
    let garbage = vec![0u8; 64];
    assert!(matches!(
        swap(&garbage, &mut output),
        Err(Error::InvalidFormat { .. })
    ));
}

#[test]
fn version_probe() {
    let mut bytes = [0u8; 16];
    bytes[..4].copy_from_slice(b"3irT");
    assert_eq!(get_version(&bytes, false), 3);
    bytes[..4].copy_from_slice(b"2irT");
    assert_eq!(get_version(&bytes, false), 2);
    bytes[..4].copy_from_slice(b"eirT");
    assert_eq!(get_version(&bytes, false), 1);
    bytes[..4].copy_from_slice(b"none");
    assert_eq!(get_version(&bytes, false), 0);
    assert_eq!(get_version(&bytes, true), 0);

    // Byte-reversed signatures are only recognized on request.
    bytes[..4].copy_from_slice(b"Tri3");
    assert_eq!(get_version(&bytes, false), 0);
    assert_eq!(get_version(&bytes, true), 3);
    bytes[..4].copy_from_slice(b"Tri2");
    assert_eq!(get_version(&bytes, true), 2);
    bytes[..4].copy_from_slice(b"Trie");
    assert_eq!(get_version(&bytes, true), 1);

    // Too short for the smallest header of the family.
    assert_eq!(get_version(b"3irT", false), 0);
}

#[test]
fn clone_and_into_owned_are_independent() {
    let bytes = ascii_override_trie32().to_bytes();
    let owned = {
        let borrowed = CodePointTrie::try_from_bytes(ValueWidth::Bits32, &bytes).unwrap();
        let cloned = borrowed.clone();
        assert_eq!(cloned, borrowed);
        // The deep copy must outlive the image it was parsed from.
        borrowed.into_owned()
    };
    drop(bytes);
    assert_eq!(owned.get32(0x41), 9);
    assert_eq!(owned.get32(0x42), 7);
    run_trie_tests(&owned, &[0x41, 7, 0x42, 9, 0x110000, 7]);
}

#[test]
fn utf8_prev_resolves_values() {
    let trie = ascii_override_trie32();

    // ASCII: one byte consumed, resolved through the BMP index.
    let prev = trie.utf8_prev(b"A", 1).unwrap();
    assert_eq!(prev.len, 1);
    assert_eq!(prev.value, Utf8PrevValue::DataIndex(65));
    assert_eq!(prev.value_in(&trie), 9);
    assert_eq!(prev.packed(), (65 << 3) | 1);

    // Multi-byte BMP.
    let euro = "€".as_bytes();
    let prev = trie.utf8_prev(euro, euro.len()).unwrap();
    assert_eq!(prev.len, 3);
    assert_eq!(prev.value_in(&trie), 7);

    // Only the last code point matters.
    let text = "A€".as_bytes();
    let prev = trie.utf8_prev(text, text.len()).unwrap();
    assert_eq!(prev.len, 3);
    assert_eq!(prev.value_in(&trie), 7);
}

#[test]
fn utf8_prev_supplementary_and_high() {
    let trie = supplementary_trie();

    // U+20000, inside the value-2 plane.
    let bytes = "\u{20000}".as_bytes();
    let prev = trie.utf8_prev(bytes, bytes.len()).unwrap();
    assert_eq!(prev.len, 4);
    assert_eq!(prev.value_in(&trie), 2);

    // U+30000 is at the high start.
    let bytes = "\u{30000}".as_bytes();
    let prev = trie.utf8_prev(bytes, bytes.len()).unwrap();
    assert_eq!(prev.value, Utf8PrevValue::UseHighValue);
    assert_eq!(prev.len, 4);
    assert_eq!(prev.packed(), (-16) | 4);
    assert_eq!(prev.value_in(&trie), 0);
}

#[test]
fn utf8_prev_ill_formed() {
    let trie = ascii_override_trie32();

    let prev = trie.utf8_prev(b"\x80", 1).unwrap();
    assert_eq!(prev.value, Utf8PrevValue::UseErrorValue);
    assert_eq!(prev.len, 1);
    assert_eq!(prev.packed(), (-8) | 1);
    assert_eq!(prev.value_in(&trie), trie.error_value());

    // A truncated sequence is one error byte; the caller keeps progress.
    let prev = trie.utf8_prev(b"\xf0\x90\x80", 3).unwrap();
    assert_eq!(prev.value, Utf8PrevValue::UseErrorValue);
    assert_eq!(prev.len, 1);

    // No previous byte to decode.
    assert!(trie.utf8_prev(b"", 0).is_none());
    assert!(trie.utf8_prev(b"A", 2).is_none());
}

#[test]
#[cfg(feature = "serde")]
fn serde_postcard_roundtrip() {
    let trie = supplementary_trie();
    let serialized = postcard::to_allocvec(&trie).unwrap();
    let deserialized: CodePointTrie = postcard::from_bytes(&serialized).unwrap();
    assert_eq!(deserialized, trie);
    assert_eq!(deserialized.initial_value(), trie.initial_value());
}
