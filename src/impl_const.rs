// This file is part of ICU4X. For terms of use, please see the file
// called LICENSE at the top level of the ICU4X source tree
// (online at: https://github.com/unicode-org/icu4x/blob/main/LICENSE ).

//! Bit geometry of the trie layout.
//!
//! These constants are contractual: every serialized image encodes offsets
//! and lengths in terms of them, so a reader must use them literally. A
//! data block covers 32 code points, an index-2 block covers 512, and each
//! supplementary index-1 entry covers 16384.

/// Shift size for getting the index-1 table offset.
pub const SHIFT_1: u32 = 14;

/// Shift size for getting the index-2 table offset.
pub const SHIFT_2: u32 = 5;

/// Difference between the two shift sizes,
/// for getting an index-1 offset from an index-2 offset. 9=14-5
pub const SHIFT_1_2: u32 = SHIFT_1 - SHIFT_2;

/// Data offsets in supplementary index-2 entries are stored right-shifted
/// by this amount, so that a 16-bit entry can address four times as much
/// data. BMP index entries store final (unshifted) offsets.
pub const INDEX_SHIFT: u32 = 2;

/// Number of entries in a data block. 32=0x20
pub const DATA_BLOCK_LENGTH: u32 = 1 << SHIFT_2;

/// Mask for getting the lower bits for the in-data-block offset.
pub const DATA_MASK: u32 = DATA_BLOCK_LENGTH - 1;

/// Number of entries in an index-2 block. 512=0x200
pub const INDEX_2_BLOCK_LENGTH: u32 = 1 << SHIFT_1_2;

/// Mask for getting the lower bits for the in-index-2-block offset.
pub const INDEX_2_MASK: u32 = INDEX_2_BLOCK_LENGTH - 1;

/// Number of code points per index-1 table entry. 16384=0x4000
pub const CP_PER_INDEX_1_ENTRY: u32 = 1 << SHIFT_1;

/// The BMP part of the index-2 table is fully expanded. 2048=0x800
pub const INDEX_2_BMP_LENGTH: u32 = 0x10000 >> SHIFT_2;

/// Number of index-1 entries for the BMP. (4)
/// They are omitted because the BMP index-2 table is linear.
pub const OMITTED_BMP_INDEX_1_LENGTH: u32 = 0x10000 >> SHIFT_1;

/// The index-1 table for supplementary code points starts after the
/// linear BMP index-2 table.
pub const INDEX_1_OFFSET: u32 = INDEX_2_BMP_LENGTH;

/// The first 0x80 data entries are the literal values for the ASCII range.
pub const ASCII_LIMIT: u32 = 0x80;

/// The data array must not grow beyond what a shifted 16-bit index entry
/// can address.
pub const MAX_DATA_LENGTH: u32 = 1 << (16 + INDEX_SHIFT);

/// Value in the index-2-null-offset header field meaning
/// "no dedicated index-2 null block"; out of range for any valid offset.
pub const NO_INDEX2_NULL_OFFSET: u16 = 0xffff;

/// Value in the data-null-offset header field meaning
/// "no dedicated data null block"; out of range for any valid offset.
pub const NO_DATA_NULL_OFFSET: u32 = 0xfffff;

/// The highest code point.
pub const CODE_POINT_MAX: u32 = 0x10ffff;
