//! # Initial Ramdisk Tag
//!
//! ```text
//! 0x00  tag header (type = 11)
//! 0x08  u64  start
//! 0x10  u64  length
//! ```

use super::Fields;
use crate::error::TagRejection;
use crate::tag::RawTag;

/// Encoded size of an initrd tag, header included.
pub const INITRD_TAG_SIZE: usize = 24;

/// Validated view of an initrd tag; start and length are non-zero.
#[derive(Debug, Copy, Clone)]
pub struct InitrdTag<'a> {
    raw: RawTag<'a>,
    start: u64,
    length: u64,
}

impl<'a> TryFrom<RawTag<'a>> for InitrdTag<'a> {
    type Error = TagRejection;

    fn try_from(raw: RawTag<'a>) -> Result<Self, Self::Error> {
        let fields = Fields::new(&raw, INITRD_TAG_SIZE)?;
        let start = fields.u64(8)?;
        let length = fields.u64(16)?;
        if start == 0 {
            return Err(TagRejection::Zero("initrd start"));
        }
        if length == 0 {
            return Err(TagRejection::Zero("initrd length"));
        }
        Ok(Self { raw, start, length })
    }
}

impl<'a> InitrdTag<'a> {
    #[must_use]
    pub const fn raw(&self) -> &RawTag<'a> {
        &self.raw
    }

    /// Physical address of the first ramdisk byte.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Ramdisk size in bytes.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }
}
