// This file is part of ICU4X. For terms of use, please see the file
// called LICENSE at the top level of the ICU4X source tree
// (online at: https://github.com/unicode-org/icu4x/blob/main/LICENSE ).

use crate::error::Error;
use crate::impl_const::*;

use core::ops::RangeInclusive;
use yoke::Yokeable;
use zerofrom::ZeroFrom;
use zerovec::ZeroVec;

/// The width of the values stored in the data array of a [`CodePointTrie`].
///
/// The width is a property of the serialized image, not of the reader: a
/// 16-bit trie shares storage between the index array and the data array,
/// a 32-bit trie keeps them separate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "databake", derive(databake::Bake))]
#[cfg_attr(feature = "databake", databake(path = utrie3))]
pub enum ValueWidth {
    /// 16 bits per data entry; the data array is appended to the index array
    /// and addressed through it.
    Bits16 = 0,
    /// 32 bits per data entry in a separate array.
    Bits32 = 1,
}

impl ValueWidth {
    pub(crate) fn try_from_u32(value: u32) -> Result<Self, Error> {
        match value {
            0 => Ok(ValueWidth::Bits16),
            1 => Ok(ValueWidth::Bits32),
            _ => Err(Error::InvalidFormat {
                reason: "unknown value width code",
            }),
        }
    }

    /// Bytes per data entry.
    pub(crate) fn entry_size(self) -> usize {
        match self {
            ValueWidth::Bits16 => 2,
            ValueWidth::Bits32 => 4,
        }
    }
}

/// The data array of a [`CodePointTrie`], in one of the two supported widths.
///
/// For 16-bit tries, data offsets stored in the index array are relative to
/// the *start of the index array* — the serialized form appends the data
/// entries directly after the index entries and addresses both through one
/// base. This variant therefore resolves offsets `>= indexLength` into its
/// own storage and smaller offsets into the index array. 32-bit offsets are
/// relative to the data array itself.
#[derive(Debug, Eq, PartialEq, Clone, Yokeable, ZeroFrom)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "databake", derive(databake::Bake))]
#[cfg_attr(feature = "databake", databake(path = utrie3))]
pub enum CodePointTrieData<'trie> {
    /// 16-bit data entries, the tail of the serialized index storage.
    Bits16(#[cfg_attr(feature = "serde", serde(borrow))] ZeroVec<'trie, u16>),
    /// 32-bit data entries.
    Bits32(#[cfg_attr(feature = "serde", serde(borrow))] ZeroVec<'trie, u32>),
}

impl CodePointTrieData<'_> {
    /// Number of data entries.
    pub fn len(&self) -> usize {
        match self {
            CodePointTrieData::Bits16(v) => v.len(),
            CodePointTrieData::Bits32(v) => v.len(),
        }
    }

    /// Whether the data array is empty (never true for a well-formed trie).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The width tag matching this variant.
    pub fn value_width(&self) -> ValueWidth {
        match self {
            CodePointTrieData::Bits16(_) => ValueWidth::Bits16,
            CodePointTrieData::Bits32(_) => ValueWidth::Bits32,
        }
    }

    fn get(&self, i: usize) -> Option<u32> {
        match self {
            CodePointTrieData::Bits16(v) => v.get(i).map(u32::from),
            CodePointTrieData::Bits32(v) => v.get(i),
        }
    }
}

/// The fixed-width scalar fields of a [`CodePointTrie`], as carried by the
/// serialized header (with the shifted fields expanded).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Yokeable, ZeroFrom)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "databake", derive(databake::Bake))]
#[cfg_attr(feature = "databake", databake(path = utrie3))]
pub struct CodePointTrieHeader {
    /// The first code point of the high range `high_start..=U+10FFFF`, whose
    /// values are all [`Self::high_value`] and which the index and data
    /// arrays do not cover. Always a multiple of 16384 (the code point span
    /// of one index-1 entry); `0x110000` when there is no high range.
    pub high_start: u32,
    /// `high_start >> 14`, as stored in the serialized header.
    pub shifted_high_start: u16,
    /// Offset of the index-2 null block inside the index array, or
    /// [`NO_INDEX2_NULL_OFFSET`](crate::impl_const::NO_INDEX2_NULL_OFFSET)
    /// if there is none.
    pub index2_null_offset: u16,
    /// Offset of the data null block, or
    /// [`NO_DATA_NULL_OFFSET`](crate::impl_const::NO_DATA_NULL_OFFSET) if
    /// there is none. For 16-bit tries this offset is relative to the start
    /// of the index array, like every data offset in that width.
    pub data_null_offset: u32,
    /// The value for code points in `high_start..=U+10FFFF`.
    pub high_value: u32,
    /// The value returned for inputs outside `0..=U+10FFFF` and for
    /// ill-formed UTF-8.
    pub error_value: u32,
}

/// A compressed, immutable mapping from every Unicode code point
/// (`U+0000..=U+10FFFF`) to an unsigned integer value.
///
/// The mapping is stored as a multi-level index with block sharing: large
/// runs of code points holding the same value collapse to a single shared
/// data block, so the whole table is a few kilobytes instead of the flat
/// 2^21-entry array it stands in for. Lookups cost two array reads for
/// ASCII and the BMP and four for supplementary code points.
///
/// A trie is produced by deserializing an image with
/// [`CodePointTrie::try_from_bytes`] (zero-copy; the arrays borrow the
/// image) or assembled from parts with [`CodePointTrie::try_new`]. It is
/// immutable from then on and freely shareable across threads.
///
/// For more information on the format family:
/// - [ICU Site design doc](http://site.icu-project.org/design/struct/utrie)
/// - [ICU User Guide section on Properties lookup](https://unicode-org.github.io/icu/userguide/strings/properties.html#lookup)
// serde impls in crate::serde
#[derive(Debug, Eq, PartialEq, Clone, Yokeable, ZeroFrom)]
pub struct CodePointTrie<'trie> {
    pub(crate) header: CodePointTrieHeader,
    pub(crate) index: ZeroVec<'trie, u16>,
    pub(crate) data: CodePointTrieData<'trie>,
    // Recovered from the data null block on construction; the serialized
    // form does not carry it. serde impl skips this field.
    pub(crate) initial_value: u32,
}

impl<'trie> CodePointTrie<'trie> {
    #[doc(hidden)] // databake internal
    pub const fn from_parts(
        header: CodePointTrieHeader,
        index: ZeroVec<'trie, u16>,
        data: CodePointTrieData<'trie>,
        initial_value: u32,
    ) -> Self {
        Self {
            header,
            index,
            data,
            initial_value,
        }
    }

    /// Returns a new [`CodePointTrie`] backed by the given `index` and
    /// `data` arrays, validating the structural invariants that the lookup
    /// paths rely on:
    ///
    /// - `high_start` agrees with its shifted form and is a multiple of the
    ///   index-1 granularity;
    /// - the index array covers at least the linear BMP index-2 table and
    ///   its length fits the serialized 16-bit field;
    /// - the data array length is a multiple of the data block length, is at
    ///   least the linear ASCII range, and stays addressable by shifted
    ///   16-bit index entries.
    ///
    /// The null-block offsets must fit their serialized fields but are not
    /// bounds-checked against the arrays: an out-of-range offset means "no
    /// null block", in which case the initial value falls back to
    /// `high_value`.
    pub fn try_new(
        header: CodePointTrieHeader,
        index: ZeroVec<'trie, u16>,
        data: CodePointTrieData<'trie>,
    ) -> Result<CodePointTrie<'trie>, Error> {
        if header.high_start > 0x11_0000
            || (header.high_start & (CP_PER_INDEX_1_ENTRY - 1)) != 0
            || u32::from(header.shifted_high_start) << SHIFT_1 != header.high_start
        {
            return Err(Error::InvalidFormat {
                reason: "high start out of range or inconsistent with its shifted form",
            });
        }
        if index.len() < INDEX_1_OFFSET as usize || index.len() > u16::MAX as usize {
            return Err(Error::InvalidFormat {
                reason: "index array length out of range",
            });
        }
        let data_length = data.len() as u32;
        if data_length % DATA_BLOCK_LENGTH != 0
            || data_length < ASCII_LIMIT
            || data_length >= MAX_DATA_LENGTH
        {
            return Err(Error::InvalidFormat {
                reason: "data array length out of range",
            });
        }
        // The serialized options field stores this offset in 20 bits.
        if header.data_null_offset > NO_DATA_NULL_OFFSET {
            return Err(Error::InvalidFormat {
                reason: "data null offset does not fit the serialized form",
            });
        }

        let initial_value = match &data {
            CodePointTrieData::Bits16(d16) => {
                let dno = header.data_null_offset as usize;
                if dno < index.len() {
                    index.get(dno).map(u32::from)
                } else {
                    d16.get(dno - index.len()).map(u32::from)
                }
            }
            CodePointTrieData::Bits32(d32) => d32.get(header.data_null_offset as usize),
        }
        .unwrap_or(header.high_value);

        Ok(CodePointTrie {
            header,
            index,
            data,
            initial_value,
        })
    }

    /// The value stored in the data array at `data_index`, resolved per the
    /// width's offset convention, or `None` when the index points outside
    /// the arrays (possible only for a corrupt image; callers substitute
    /// the error value).
    pub(crate) fn data_value(&self, data_index: u32) -> Option<u32> {
        match &self.data {
            CodePointTrieData::Bits16(d16) => {
                let di = data_index as usize;
                if di < self.index.len() {
                    self.index.get(di).map(u32::from)
                } else {
                    d16.get(di - self.index.len()).map(u32::from)
                }
            }
            CodePointTrieData::Bits32(_) => self.data.get(data_index as usize),
        }
    }

    /// Data index for a BMP code point. BMP index entries hold final data
    /// offsets; only supplementary index-2 entries are stored shifted.
    #[inline(always)]
    pub(crate) fn bmp_index(&self, code_point: u32) -> Option<u32> {
        let entry = self.index.get((code_point >> SHIFT_2) as usize)?;
        Some(u32::from(entry) + (code_point & DATA_MASK))
    }

    /// Data index for a supplementary code point below `high_start`:
    /// index-1 entry, then index-2 entry (shifted), then in-block offset.
    pub(crate) fn supp_index(&self, code_point: u32) -> Option<u32> {
        let i1 = (INDEX_1_OFFSET - OMITTED_BMP_INDEX_1_LENGTH) + (code_point >> SHIFT_1);
        let i2_block = u32::from(self.index.get(i1 as usize)?);
        let i2 = (code_point >> SHIFT_2) & INDEX_2_MASK;
        let block = u32::from(self.index.get((i2_block + i2) as usize)?) << INDEX_SHIFT;
        Some(block + (code_point & DATA_MASK))
    }

    /// Returns the value that is associated with `code_point` in this
    /// [`CodePointTrie`].
    ///
    /// This is the hot path: one data read for ASCII, two array reads for
    /// the rest of the BMP, four for supplementary code points, and no read
    /// at all for the high range. Inputs above `U+10FFFF` yield the trie's
    /// error value; the lookup is total and never fails.
    #[inline(always)]
    pub fn get32(&self, code_point: u32) -> u32 {
        if code_point <= 0x7f {
            // The first 0x80 data entries are the literal ASCII values.
            return self
                .data
                .get(code_point as usize)
                .unwrap_or(self.header.error_value);
        }
        if code_point > CODE_POINT_MAX {
            return self.header.error_value;
        }
        if code_point >= self.header.high_start {
            return self.header.high_value;
        }
        let data_index = if code_point <= 0xffff {
            self.bmp_index(code_point)
        } else {
            self.supp_index(code_point)
        };
        data_index
            .and_then(|di| self.data_value(di))
            .unwrap_or(self.header.error_value)
    }

    /// Returns the value that is associated with `c` in this
    /// [`CodePointTrie`].
    #[inline(always)]
    pub fn get(&self, c: char) -> u32 {
        self.get32(u32::from(c))
    }

    /// Returns a [`CodePointMapRange`] for the longest stretch of
    /// consecutive code points starting at `start` that share one value, or
    /// `None` when `start` is above `U+10FFFF`.
    ///
    /// The scan exploits the block structure instead of calling
    /// [`CodePointTrie::get32`] per code point: data blocks and index-2
    /// blocks shared with the previous step are skipped whole, and null
    /// blocks extend the run by entire aligned spans without touching the
    /// data array. The returned end is `U+10FFFF` on the final range.
    pub fn get_range(&self, start: u32) -> Option<CodePointMapRange> {
        self.get_range_by(start, |value| value)
    }

    /// Like [`CodePointTrie::get_range`], but compares code points by the
    /// image of their values under `filter`, so runs that `filter` maps
    /// together coalesce into one range.
    ///
    /// The trie's initial value is normalized before `filter` sees
    /// anything: every occurrence of the raw initial value is replaced by
    /// `filter(initial_value)` first, so a filter need not know which
    /// stored value plays the "default" role.
    pub fn get_range_mapped(
        &self,
        start: u32,
        filter: impl FnMut(u32) -> u32,
    ) -> Option<CodePointMapRange> {
        self.get_range_by(start, filter)
    }

    fn get_range_by<F>(&self, start: u32, mut filter: F) -> Option<CodePointMapRange>
    where
        F: FnMut(u32) -> u32,
    {
        if start > CODE_POINT_MAX {
            return None;
        }
        if start >= self.header.high_start {
            return Some(CodePointMapRange {
                range: start..=CODE_POINT_MAX,
                value: filter(self.header.high_value),
            });
        }

        let null_value = filter(self.initial_value);
        let mut prev_i2_block = u32::MAX;
        let mut prev_block = u32::MAX;
        let mut c = start;
        let mut value = 0;
        let mut have_value = false;

        loop {
            let i2_block;
            if c <= 0xffff {
                i2_block = (c >> SHIFT_2) & !INDEX_2_MASK;
            } else {
                let i1 = (INDEX_1_OFFSET - OMITTED_BMP_INDEX_1_LENGTH) + (c >> SHIFT_1);
                i2_block = u32::from(self.index.get(i1 as usize)?);
                if i2_block == prev_i2_block && (c - start) >= CP_PER_INDEX_1_ENTRY {
                    // The index-2 block is the same as the previous one, and
                    // filled with value. Only possible for supplementary code
                    // points: the linear BMP index table yields unique
                    // i2_block values.
                    debug_assert!((c & (CP_PER_INDEX_1_ENTRY - 1)) == 0);
                    c += CP_PER_INDEX_1_ENTRY;
                    if c >= self.header.high_start {
                        break;
                    }
                    continue;
                }
            }
            prev_i2_block = i2_block;
            if i2_block == u32::from(self.header.index2_null_offset) {
                // This is the index-2 null block: every data block it points
                // to holds the initial value. End a run that carries a
                // different value, otherwise extend by the whole span.
                if have_value {
                    if null_value != value {
                        return Some(CodePointMapRange {
                            range: start..=(c - 1),
                            value,
                        });
                    }
                } else {
                    value = null_value;
                    have_value = true;
                }
                prev_block = self.header.data_null_offset;
                c = (c + CP_PER_INDEX_1_ENTRY) & !(CP_PER_INDEX_1_ENTRY - 1);
                if c >= self.header.high_start {
                    break;
                }
                continue;
            }
            // Enumerate data blocks for one index-2 block.
            let mut i2 = (c >> SHIFT_2) & INDEX_2_MASK;
            while i2 < INDEX_2_BLOCK_LENGTH {
                let mut block = u32::from(self.index.get((i2_block + i2) as usize)?);
                if i2_block >= INDEX_2_BMP_LENGTH {
                    // Supplementary index-2 entries are stored shifted; BMP
                    // entries already hold the final offset.
                    block <<= INDEX_SHIFT;
                }
                if block == prev_block && (c - start) >= DATA_BLOCK_LENGTH {
                    // The block is the same as the previous one, and filled
                    // with value.
                    debug_assert!((c & DATA_MASK) == 0);
                    c += DATA_BLOCK_LENGTH;
                } else {
                    prev_block = block;
                    if block == self.header.data_null_offset {
                        // This is the data null block.
                        if have_value {
                            if null_value != value {
                                return Some(CodePointMapRange {
                                    range: start..=(c - 1),
                                    value,
                                });
                            }
                        } else {
                            value = null_value;
                            have_value = true;
                        }
                        c = (c + DATA_BLOCK_LENGTH) & !DATA_MASK;
                    } else {
                        let mut di = block + (c & DATA_MASK);
                        let mut value2 = maybe_filter_value(
                            self.data_value(di)?,
                            self.initial_value,
                            null_value,
                            &mut filter,
                        );
                        if have_value {
                            if value2 != value {
                                return Some(CodePointMapRange {
                                    range: start..=(c - 1),
                                    value,
                                });
                            }
                        } else {
                            value = value2;
                            have_value = true;
                        }
                        c += 1;
                        while (c & DATA_MASK) != 0 {
                            di += 1;
                            value2 = maybe_filter_value(
                                self.data_value(di)?,
                                self.initial_value,
                                null_value,
                                &mut filter,
                            );
                            if value2 != value {
                                return Some(CodePointMapRange {
                                    range: start..=(c - 1),
                                    value,
                                });
                            }
                            c += 1;
                        }
                    }
                }
                i2 += 1;
            }
            if c >= self.header.high_start {
                break;
            }
        }

        debug_assert!(have_value);
        // c == high_start here. Merge with the high range when its value
        // matches, otherwise stop just before it.
        let high = maybe_filter_value(
            self.header.high_value,
            self.initial_value,
            null_value,
            &mut filter,
        );
        let end = if high != value { c - 1 } else { CODE_POINT_MAX };
        Some(CodePointMapRange {
            range: start..=end,
            value,
        })
    }

    /// Yields an [`Iterator`] returning ranges of consecutive code points
    /// that share the same value, as given by [`CodePointTrie::get_range`].
    /// Concatenating the ranges partitions `U+0000..=U+10FFFF`.
    pub fn iter_ranges(&self) -> CodePointMapRangeIterator<'_> {
        CodePointMapRangeIterator {
            trie: self,
            cpm_range: Some(CodePointMapRange {
                range: u32::MAX..=u32::MAX,
                value: self.header.error_value,
            }),
        }
    }

    /// Yields an [`Iterator`] returning the ranges of the code points whose
    /// values match `value`.
    pub fn iter_ranges_for_value(
        &self,
        value: u32,
    ) -> impl Iterator<Item = RangeInclusive<u32>> + '_ {
        self.iter_ranges()
            .filter(move |cpm_range| cpm_range.value == value)
            .map(|cpm_range| cpm_range.range)
    }

    /// Converts a possibly-borrowed trie into one that owns its arrays,
    /// deep-copying borrowed data and erasing the lifetime tie to the
    /// source image.
    #[cfg(feature = "alloc")]
    pub fn into_owned(self) -> CodePointTrie<'static> {
        CodePointTrie {
            header: self.header,
            index: self.index.into_owned(),
            data: match self.data {
                CodePointTrieData::Bits16(v) => CodePointTrieData::Bits16(v.into_owned()),
                CodePointTrieData::Bits32(v) => CodePointTrieData::Bits32(v.into_owned()),
            },
            initial_value: self.initial_value,
        }
    }

    /// The header scalars of this trie.
    pub fn header(&self) -> &CodePointTrieHeader {
        &self.header
    }

    /// The width of the data entries.
    pub fn value_width(&self) -> ValueWidth {
        self.data.value_width()
    }

    /// The first code point of the high range; see
    /// [`CodePointTrieHeader::high_start`].
    pub fn high_start(&self) -> u32 {
        self.header.high_start
    }

    /// The value for every code point in `high_start..=U+10FFFF`.
    pub fn high_value(&self) -> u32 {
        self.header.high_value
    }

    /// The value returned for out-of-range inputs and ill-formed UTF-8.
    pub fn error_value(&self) -> u32 {
        self.header.error_value
    }

    /// The "default" value: what the null blocks hold, and what the range
    /// scan substitutes before applying a value filter.
    pub fn initial_value(&self) -> u32 {
        self.initial_value
    }
}

/// Converts occurrences of the trie's initial value into the filtered
/// `null_value` and every other value into its image under `filter`, so a
/// missing filter degenerates to the identity after null normalization.
fn maybe_filter_value<F>(value: u32, initial_value: u32, null_value: u32, filter: &mut F) -> u32
where
    F: FnMut(u32) -> u32,
{
    if value == initial_value {
        null_value
    } else {
        filter(value)
    }
}

#[cfg(feature = "databake")]
impl databake::Bake for CodePointTrie<'_> {
    fn bake(&self, env: &databake::CrateEnv) -> databake::TokenStream {
        env.insert("utrie3");
        let header = self.header.bake(env);
        let index = self.index.bake(env);
        let data = self.data.bake(env);
        let initial_value = self.initial_value.bake(env);
        databake::quote! { utrie3::CodePointTrie::from_parts(#header, #index, #data, #initial_value) }
    }
}

#[cfg(feature = "databake")]
impl databake::BakeSize for CodePointTrie<'_> {
    fn borrows_size(&self) -> usize {
        self.index.borrows_size() + self.data.borrows_size()
    }
}

/// Represents a range of consecutive code points sharing the same value in
/// the trie, as produced by [`CodePointTrie::get_range`].
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct CodePointMapRange {
    /// Range of code points from start to end (inclusive).
    pub range: RangeInclusive<u32>,
    /// Value associated with every code point of the range.
    pub value: u32,
}

/// A custom [`Iterator`] type specifically for a code point trie that
/// returns [`CodePointMapRange`]s.
#[derive(Debug)]
pub struct CodePointMapRangeIterator<'a> {
    trie: &'a CodePointTrie<'a>,
    // None means iteration has ended; the u32::MAX start marks the state
    // before the first `next()` call, so the first range starts at 0.
    cpm_range: Option<CodePointMapRange>,
}

impl Iterator for CodePointMapRangeIterator<'_> {
    type Item = CodePointMapRange;

    fn next(&mut self) -> Option<Self::Item> {
        self.cpm_range = match &self.cpm_range {
            Some(cpmr) => {
                if *cpmr.range.start() == u32::MAX {
                    self.trie.get_range(0)
                } else {
                    self.trie.get_range(cpmr.range.end() + 1)
                }
            }
            None => None,
        };
        // Note: Clone is cheap. We can't Copy because RangeInclusive does
        // not impl Copy.
        self.cpm_range.clone()
    }
}
