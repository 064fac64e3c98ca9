// This file is part of ICU4X. For terms of use, please see the file
// called LICENSE at the top level of the ICU4X source tree
// (online at: https://github.com/unicode-org/icu4x/blob/main/LICENSE ).

//! The serialized image codec: header layout, zero-copy deserialization,
//! exact-size serialization, and the signature-based version probe.
//!
//! A serialized trie is a 24-byte little-endian header followed by the
//! `u16` index array and the `u16` or `u32` data array, copied verbatim:
//!
//! ```text
//! 0   signature          u32   "Tri3"
//! 4   options            u32   (dataNullOffset << 12) | valueWidthCode
//! 8   indexLength        u16
//! 10  shiftedDataLength  u16   dataLength >> 2
//! 12  index2NullOffset   u16
//! 14  shiftedHighStart   u16   highStart >> 14
//! 16  highValue          u32
//! 20  errorValue         u32
//! 24  index entries, then data entries
//! ```

use crate::cptrie::{CodePointTrie, CodePointTrieData, CodePointTrieHeader, ValueWidth};
use crate::error::Error;
use crate::impl_const::*;

use zerovec::ZeroVec;

/// Size of the fixed header in bytes.
pub const HEADER_LENGTH: usize = 24;

/// "Tri3" signature of this format version.
pub(crate) const SIGNATURE_3: u32 = 0x5472_6933;
/// "Tri2", the predecessor format.
pub(crate) const SIGNATURE_2: u32 = 0x5472_6932;
/// "Trie", the original format.
pub(crate) const SIGNATURE_1: u32 = 0x5472_6965;

/// Low bits of `options` carrying the value width code.
pub(crate) const OPTIONS_VALUE_BITS_MASK: u32 = 0xf;
/// Reserved `options` bits; must be zero. The format is closed: new
/// capabilities get a new signature, not a flag.
pub(crate) const OPTIONS_RESERVED_MASK: u32 = 0x0f00;
/// The data null offset is stored in the top 20 bits of `options`.
pub(crate) const OPTIONS_DATA_NULL_OFFSET_SHIFT: u32 = 12;

pub(crate) fn read_u16(bytes: &[u8], pos: usize) -> Option<u16> {
    bytes
        .get(pos..pos + 2)?
        .try_into()
        .ok()
        .map(u16::from_le_bytes)
}

pub(crate) fn read_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    bytes
        .get(pos..pos + 4)?
        .try_into()
        .ok()
        .map(u32::from_le_bytes)
}

fn write_bytes(dest: &mut [u8], pos: usize, value: &[u8]) -> Option<()> {
    dest.get_mut(pos..pos + value.len())?.copy_from_slice(value);
    Some(())
}

impl<'trie> CodePointTrie<'trie> {
    /// Parses a serialized image into a [`CodePointTrie`] whose arrays
    /// borrow from `bytes`.
    ///
    /// `value_width` is the width the caller expects; an image declaring the
    /// other width is rejected, as are images with a wrong signature,
    /// nonzero reserved option bits, or too few bytes for the header or the
    /// declared arrays. Trailing bytes after the image are ignored, so a
    /// trie may be embedded in a larger data file; [`Self::serialized_length`]
    /// reports where it ends.
    pub fn try_from_bytes(
        value_width: ValueWidth,
        bytes: &'trie [u8],
    ) -> Result<CodePointTrie<'trie>, Error> {
        if bytes.len() < HEADER_LENGTH {
            return Err(Error::InvalidFormat {
                reason: "image shorter than the header",
            });
        }
        let signature = read_u32(bytes, 0).ok_or(Error::InvalidFormat {
            reason: "image shorter than the header",
        })?;
        if signature != SIGNATURE_3 {
            return Err(Error::InvalidFormat {
                reason: "signature mismatch",
            });
        }
        let options = read_u32(bytes, 4).ok_or(Error::InvalidFormat {
            reason: "image shorter than the header",
        })?;
        let width = ValueWidth::try_from_u32(options & OPTIONS_VALUE_BITS_MASK)?;
        if width != value_width {
            return Err(Error::InvalidFormat {
                reason: "image value width does not match the requested width",
            });
        }
        if (options & OPTIONS_RESERVED_MASK) != 0 {
            return Err(Error::InvalidFormat {
                reason: "reserved options bits set",
            });
        }

        let short_header = Error::InvalidFormat {
            reason: "image shorter than the header",
        };
        let index_length = usize::from(read_u16(bytes, 8).ok_or(short_header)?);
        let shifted_data_length = read_u16(bytes, 10).ok_or(short_header)?;
        let index2_null_offset = read_u16(bytes, 12).ok_or(short_header)?;
        let shifted_high_start = read_u16(bytes, 14).ok_or(short_header)?;
        let high_value = read_u32(bytes, 16).ok_or(short_header)?;
        let error_value = read_u32(bytes, 20).ok_or(short_header)?;

        let data_length = (u32::from(shifted_data_length) as usize) << INDEX_SHIFT;
        let data_null_offset = options >> OPTIONS_DATA_NULL_OFFSET_SHIFT;
        let high_start = u32::from(shifted_high_start) << SHIFT_1;

        let truncated = Error::InvalidFormat {
            reason: "image shorter than its declared arrays",
        };
        let index_end = HEADER_LENGTH + index_length * 2;
        let data_end = index_end + data_length * width.entry_size();
        let index_bytes = bytes.get(HEADER_LENGTH..index_end).ok_or(truncated)?;
        let data_bytes = bytes.get(index_end..data_end).ok_or(truncated)?;

        let parse_error = Error::InvalidFormat {
            reason: "array bytes do not parse",
        };
        let index = ZeroVec::parse_bytes(index_bytes).map_err(|_| parse_error)?;
        let data = match width {
            ValueWidth::Bits16 => {
                CodePointTrieData::Bits16(ZeroVec::parse_bytes(data_bytes).map_err(|_| parse_error)?)
            }
            ValueWidth::Bits32 => {
                CodePointTrieData::Bits32(ZeroVec::parse_bytes(data_bytes).map_err(|_| parse_error)?)
            }
        };

        let header = CodePointTrieHeader {
            high_start,
            shifted_high_start,
            index2_null_offset,
            data_null_offset,
            high_value,
            error_value,
        };
        CodePointTrie::try_new(header, index, data)
    }

    /// The exact size in bytes of this trie's serialized image.
    pub fn serialized_length(&self) -> usize {
        HEADER_LENGTH + self.index.len() * 2 + self.data.len() * self.value_width().entry_size()
    }

    /// Writes the serialized image into `dest` and returns the number of
    /// bytes written.
    ///
    /// When `dest` is too small, fails with
    /// [`Error::BufferOverflow`] carrying the required size so the caller
    /// can retry with a larger buffer; the destination contents are
    /// unspecified in that case.
    pub fn serialize_into(&self, dest: &mut [u8]) -> Result<usize, Error> {
        let needed = self.serialized_length();
        if dest.len() < needed {
            return Err(Error::BufferOverflow { needed });
        }
        let overflow = Error::BufferOverflow { needed };

        let options = (self.header.data_null_offset << OPTIONS_DATA_NULL_OFFSET_SHIFT)
            | self.value_width() as u32;
        let shifted_data_length = (self.data.len() as u32) >> INDEX_SHIFT;

        write_bytes(dest, 0, &SIGNATURE_3.to_le_bytes()).ok_or(overflow)?;
        write_bytes(dest, 4, &options.to_le_bytes()).ok_or(overflow)?;
        write_bytes(dest, 8, &(self.index.len() as u16).to_le_bytes()).ok_or(overflow)?;
        write_bytes(dest, 10, &(shifted_data_length as u16).to_le_bytes()).ok_or(overflow)?;
        write_bytes(dest, 12, &self.header.index2_null_offset.to_le_bytes()).ok_or(overflow)?;
        write_bytes(dest, 14, &self.header.shifted_high_start.to_le_bytes()).ok_or(overflow)?;
        write_bytes(dest, 16, &self.header.high_value.to_le_bytes()).ok_or(overflow)?;
        write_bytes(dest, 20, &self.header.error_value.to_le_bytes()).ok_or(overflow)?;

        write_bytes(dest, HEADER_LENGTH, self.index.as_bytes()).ok_or(overflow)?;
        let data_bytes = match &self.data {
            CodePointTrieData::Bits16(v) => v.as_bytes(),
            CodePointTrieData::Bits32(v) => v.as_bytes(),
        };
        write_bytes(dest, HEADER_LENGTH + self.index.len() * 2, data_bytes).ok_or(overflow)?;
        Ok(needed)
    }

    /// Serializes this trie into a freshly allocated, exactly sized buffer.
    #[cfg(feature = "alloc")]
    pub fn to_bytes(&self) -> alloc::vec::Vec<u8> {
        let mut bytes = alloc::vec![0; self.serialized_length()];
        let written = self.serialize_into(&mut bytes);
        debug_assert_eq!(written, Ok(bytes.len()));
        bytes
    }
}

/// Classifies a byte buffer as a serialized trie of format version 1, 2, or
/// 3 by its signature, returning 0 for anything else (including buffers
/// shorter than 16 bytes, the smallest header of the format family).
///
/// With `any_endian` set, byte-reversed signatures are also recognized, so
/// an image produced on an opposite-endian platform still reports its
/// version.
///
/// # Examples
///
/// ```
/// use utrie3::get_version;
///
/// let bytes = *b"3irT\0\0\0\0\0\0\0\0\0\0\0\0";
/// assert_eq!(get_version(&bytes, false), 3);
///
/// // The same signature with its bytes reversed, as an opposite-endian
/// // platform would store it:
/// let swapped = *b"Tri3\0\0\0\0\0\0\0\0\0\0\0\0";
/// assert_eq!(get_version(&swapped, false), 0);
/// assert_eq!(get_version(&swapped, true), 3);
/// ```
pub fn get_version(bytes: &[u8], any_endian: bool) -> u8 {
    if bytes.len() < 16 {
        return 0;
    }
    let signature = match read_u32(bytes, 0) {
        Some(signature) => signature,
        None => return 0,
    };
    for (sig, version) in [(SIGNATURE_3, 3), (SIGNATURE_2, 2), (SIGNATURE_1, 1)] {
        if signature == sig || (any_endian && signature.swap_bytes() == sig) {
            return version;
        }
    }
    0
}
