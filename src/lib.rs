// This file is part of ICU4X. For terms of use, please see the file
// called LICENSE at the top level of the ICU4X source tree
// (online at: https://github.com/unicode-org/icu4x/blob/main/LICENSE ).

//! A zero-copy reader for serialized code point tries: compressed,
//! immutable lookup tables mapping every Unicode code point
//! (`U+0000..=U+10FFFF`) to an unsigned integer value.
//!
//! The table is a multi-level index with block sharing, a few kilobytes
//! where a flat array would take megabytes, built for very hot
//! per-character property lookups (general category, script, line-break
//! class, case-folding index, ...). Lookups are two array reads for ASCII
//! and BMP code points and four for supplementary ones; large runs of
//! identical values collapse into shared blocks that the range iterator
//! skips whole.
//!
//! [`CodePointTrie`] does not support mutation: a trie is deserialized
//! from (or serialized to) the binary image produced by a builder, and is
//! immutable and freely shareable from then on. Deserialization borrows
//! the image; [`CodePointTrie::into_owned`] produces a `'static` copy.
//!
//! Besides the lookup and range-scan paths, the crate ships the format
//! tooling that travels with the image: exact-size serialization
//! ([`CodePointTrie::serialize_into`]), endianness conversion of an image
//! in place or into a destination buffer ([`swap`], [`swap_in_place`]),
//! a signature-based version probe covering the whole format family
//! ([`get_version`]), and a backward-UTF-8 entry point that fuses decoding
//! with index resolution ([`CodePointTrie::utf8_prev`]).

// https://github.com/unicode-org/icu4x/blob/main/documents/process/boilerplate.md#library-annotations
#![cfg_attr(not(any(test, doc)), no_std)]
#![cfg_attr(
    not(test),
    deny(
        clippy::indexing_slicing,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic
    )
)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod cptrie;
mod error;
pub mod impl_const;
mod serialized;
#[cfg(feature = "serde")]
mod serde;
mod swap;
mod utf8;

pub use cptrie::CodePointMapRange;
pub use cptrie::CodePointMapRangeIterator;
pub use cptrie::CodePointTrie;
pub use cptrie::CodePointTrieData;
pub use cptrie::CodePointTrieHeader;
pub use cptrie::ValueWidth;
pub use error::Error;
pub use serialized::get_version;
pub use serialized::HEADER_LENGTH;
pub use swap::swap;
pub use swap::swap_in_place;
pub use swap::swapped_size;
pub use utf8::Utf8PrevIndex;
pub use utf8::Utf8PrevValue;
