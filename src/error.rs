// This file is part of ICU4X. For terms of use, please see the file
// called LICENSE at the top level of the ICU4X source tree
// (online at: https://github.com/unicode-org/icu4x/blob/main/LICENSE ).

//! Custom error type(s) for the parent module.

use displaydoc::Display;

/// A custom error type for [`CodePointTrie`](crate::CodePointTrie).
#[derive(Copy, Clone, Display, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The byte image is not a well-formed serialized trie: {reason}
    #[displaydoc("The byte image is not a well-formed serialized trie: {reason}")]
    InvalidFormat {
        /// Which validation step rejected the image.
        reason: &'static str,
    },
    /// The destination buffer is too small; {needed} bytes are required
    #[displaydoc("The destination buffer is too small; {needed} bytes are required")]
    BufferOverflow {
        /// The exact size the caller must provide for a retry to succeed.
        needed: usize,
    },
    /// A buffer passed to the endianness swap is shorter than the image it must hold
    #[displaydoc(
        "A buffer passed to the endianness swap is shorter than the image it must hold"
    )]
    IndexOutOfBounds,
}

impl core::error::Error for Error {}
