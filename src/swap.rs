// This file is part of ICU4X. For terms of use, please see the file
// called LICENSE at the top level of the ICU4X source tree
// (online at: https://github.com/unicode-org/icu4x/blob/main/LICENSE ).

//! Endianness conversion of serialized images.
//!
//! These functions rewrite a serialized trie in the opposite endianness
//! without deserializing it: header scalars are reversed per their declared
//! widths, the index array as 16-bit words, and the data array as 16-bit or
//! 32-bit words depending on the value width. The direction is detected
//! from the signature, so the same call converts little-endian images to
//! big-endian and back; applying it twice restores the original bytes.

use crate::cptrie::ValueWidth;
use crate::error::Error;
use crate::impl_const::*;
use crate::serialized::{
    HEADER_LENGTH, OPTIONS_RESERVED_MASK, OPTIONS_VALUE_BITS_MASK, SIGNATURE_3,
};

struct SwapLayout {
    size: usize,
    index_length: usize,
    data_length: usize,
    width: ValueWidth,
}

/// Reads the header in whichever endianness its signature declares and
/// computes the image size, rejecting anything that is not a well-formed
/// serialized trie of this version.
fn validate(bytes: &[u8]) -> Result<SwapLayout, Error> {
    if bytes.len() < HEADER_LENGTH {
        return Err(Error::IndexOutOfBounds);
    }
    let read_u32 = |pos: usize, swapped: bool| -> Option<u32> {
        let raw: [u8; 4] = bytes.get(pos..pos + 4)?.try_into().ok()?;
        let value = u32::from_le_bytes(raw);
        Some(if swapped { value.swap_bytes() } else { value })
    };
    let read_u16 = |pos: usize, swapped: bool| -> Option<u16> {
        let raw: [u8; 2] = bytes.get(pos..pos + 2)?.try_into().ok()?;
        let value = u16::from_le_bytes(raw);
        Some(if swapped { value.swap_bytes() } else { value })
    };

    let short = Error::IndexOutOfBounds;
    let raw_signature = read_u32(0, false).ok_or(short)?;
    let swapped = if raw_signature == SIGNATURE_3 {
        false
    } else if raw_signature.swap_bytes() == SIGNATURE_3 {
        true
    } else {
        return Err(Error::InvalidFormat {
            reason: "signature mismatch",
        });
    };

    let options = read_u32(4, swapped).ok_or(short)?;
    let width = ValueWidth::try_from_u32(options & OPTIONS_VALUE_BITS_MASK)?;
    if (options & OPTIONS_RESERVED_MASK) != 0 {
        return Err(Error::InvalidFormat {
            reason: "reserved options bits set",
        });
    }
    let index_length = usize::from(read_u16(8, swapped).ok_or(short)?);
    let data_length = usize::from(read_u16(10, swapped).ok_or(short)?) << INDEX_SHIFT;
    if index_length < INDEX_1_OFFSET as usize {
        return Err(Error::InvalidFormat {
            reason: "index array shorter than the linear BMP index",
        });
    }
    if data_length < ASCII_LIMIT as usize {
        return Err(Error::InvalidFormat {
            reason: "data array shorter than the linear ASCII range",
        });
    }

    Ok(SwapLayout {
        size: HEADER_LENGTH + index_length * 2 + data_length * width.entry_size(),
        index_length,
        data_length,
        width,
    })
}

/// Reverses the bytes of each `word`-sized scalar in
/// `buf[start..start + len]`. Word reversal is its own inverse, so the
/// caller does not need to pass a direction.
fn reverse_words(buf: &mut [u8], start: usize, len: usize, word: usize) {
    if let Some(region) = buf.get_mut(start..start + len) {
        for chunk in region.chunks_exact_mut(word) {
            chunk.reverse();
        }
    }
}

fn swap_region(buf: &mut [u8], layout: &SwapLayout) {
    // signature and options
    reverse_words(buf, 0, 8, 4);
    // the four 16-bit length/offset fields
    reverse_words(buf, 8, 8, 2);
    // high value and error value
    reverse_words(buf, 16, 8, 4);

    let index_bytes = layout.index_length * 2;
    reverse_words(buf, HEADER_LENGTH, index_bytes, 2);
    reverse_words(
        buf,
        HEADER_LENGTH + index_bytes,
        layout.data_length * layout.width.entry_size(),
        layout.width.entry_size(),
    );
}

/// Returns the size in bytes of the image at the start of `input`, in
/// either endianness, without copying anything. This is the swap's
/// preflight: the reported size is what [`swap`] requires of both buffers.
pub fn swapped_size(input: &[u8]) -> Result<usize, Error> {
    Ok(validate(input)?.size)
}

/// Copies the serialized image at the start of `input` into `output` with
/// the endianness of every scalar reversed, returning the number of bytes
/// written. Fails with [`Error::IndexOutOfBounds`] when either buffer is
/// shorter than the image.
pub fn swap(input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
    let layout = validate(input)?;
    let src = input.get(..layout.size).ok_or(Error::IndexOutOfBounds)?;
    let dst = output
        .get_mut(..layout.size)
        .ok_or(Error::IndexOutOfBounds)?;
    dst.copy_from_slice(src);
    swap_region(dst, &layout);
    Ok(layout.size)
}

/// In-place variant of [`swap`]: reverses the endianness of the image at
/// the start of `buf` and returns its size.
pub fn swap_in_place(buf: &mut [u8]) -> Result<usize, Error> {
    let layout = validate(buf)?;
    if buf.len() < layout.size {
        return Err(Error::IndexOutOfBounds);
    }
    swap_region(buf, &layout);
    Ok(layout.size)
}
