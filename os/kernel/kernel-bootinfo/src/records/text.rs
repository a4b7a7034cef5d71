//! # Text Tags
//!
//! Command-line and bootloader-identity tags carry NUL-terminated text whose
//! maximum length is implied by the tag size. A terminator must exist within
//! the tag; text running off the end of the tag is never handed out.

use super::require_size;
use crate::error::TagRejection;
use crate::tag::{RawTag, TAG_HEADER_SIZE};
use core::fmt::{self, Write};

/// Validated view of a NUL-terminated text tag.
#[derive(Debug, Copy, Clone)]
pub struct TextTag<'a> {
    raw: RawTag<'a>,
    text: &'a [u8],
}

impl<'a> TryFrom<RawTag<'a>> for TextTag<'a> {
    type Error = TagRejection;

    fn try_from(raw: RawTag<'a>) -> Result<Self, Self::Error> {
        require_size(&raw, TAG_HEADER_SIZE + 1)?;
        let payload = raw.payload();
        let nul = payload
            .iter()
            .position(|&b| b == 0)
            .ok_or(TagRejection::Unterminated)?;
        Ok(Self {
            raw,
            text: &payload[..nul],
        })
    }
}

impl<'a> TextTag<'a> {
    #[must_use]
    pub const fn raw(&self) -> &RawTag<'a> {
        &self.raw
    }

    /// The text bytes, terminator excluded.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.text
    }

    /// The text, if it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.text).ok()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for TextTag<'_> {
    /// Writes the text, replacing invalid UTF-8 sequences with `U+FFFD`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.text.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}
