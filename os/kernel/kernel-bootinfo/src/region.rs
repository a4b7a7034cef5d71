//! # Validated Boot Info Region

use crate::header::{BootInfoHeader, HeaderError};
use crate::limits::Limits;
use crate::tag::{RawTag, TagPosition, Tags, next_tag};

/// A byte region whose header passed validation.
///
/// The wrapped slice is narrowed to exactly `total_size` bytes, so every
/// offset computed from the region is bounded by the producer's declared end
/// and by the memory the caller actually handed over.
#[derive(Debug, Copy, Clone)]
pub struct BootRegion<'a> {
    bytes: &'a [u8],
    header: BootInfoHeader,
}

impl<'a> BootRegion<'a> {
    /// Validates the header of `bytes` with [`Limits::DEFAULT`].
    ///
    /// # Errors
    /// The first header check that failed.
    pub fn new(bytes: &'a [u8]) -> Result<Self, HeaderError> {
        Self::with_limits(bytes, &Limits::DEFAULT)
    }

    /// Validates the header of `bytes` against `limits`.
    ///
    /// # Errors
    /// The first header check that failed.
    pub fn with_limits(bytes: &'a [u8], limits: &Limits) -> Result<Self, HeaderError> {
        let header = BootInfoHeader::read_with_limits(bytes, limits)?;
        let bytes = bytes
            .get(..header.total_len())
            .ok_or(HeaderError::Truncated {
                total_size: header.total_size,
                available: bytes.len(),
            })?;
        Ok(Self { bytes, header })
    }

    #[must_use]
    pub const fn header(&self) -> &BootInfoHeader {
        &self.header
    }

    /// The region bytes, header included, exactly `total_size` long.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; a valid region holds at least a header and an End tag.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Steps the tag cursor; see [`next_tag`].
    #[must_use]
    pub fn next_tag(&self, current: Option<TagPosition>) -> Option<TagPosition> {
        next_tag(self, current)
    }

    /// Iterates all tags reachable from the start of the region.
    #[must_use]
    pub const fn tags(&self) -> Tags<'a> {
        Tags::new(*self)
    }

    /// Borrows the bytes of the tag at `position`, header included.
    #[must_use]
    pub fn tag(&self, position: TagPosition) -> Option<RawTag<'a>> {
        let bytes = self.bytes.get(position.offset()..position.end()?)?;
        Some(RawTag::new(position, bytes))
    }
}
