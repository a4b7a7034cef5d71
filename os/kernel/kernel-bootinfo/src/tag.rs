//! # Tags and the Tag Cursor
//!
//! Every record following the region header starts with an 8-byte tag header:
//!
//! ```text
//! 0x00  u16  type   TagType
//! 0x02  u16  flags
//! 0x04  u32  size   bytes in this tag, header included
//! ```
//!
//! Tags start on 8-byte boundaries relative to the region start. The next tag
//! follows at the current offset plus `size` rounded up to a multiple of 8.
//!
//! [`next_tag`] is the single place where tag positions are computed. Any
//! [`TagPosition`] it returns lies completely inside the region: its header
//! and its declared `size` bytes.

use crate::bytes::{align_up, read_u16_le, read_u32_le, to_usize};
use crate::header::HEADER_SIZE;
use crate::region::BootRegion;
use core::fmt;
use core::iter::FusedIterator;

/// Size of the generic tag header in bytes.
pub const TAG_HEADER_SIZE: usize = 8;

/// Alignment of every tag relative to the region start.
pub const TAG_ALIGN: u32 = 8;

/// First tag type reserved for vendor extensions.
pub const VENDOR_TAG_BASE: u16 = 0x8000;

/// Tag type code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TagType {
    End,
    Cmdline,
    MemoryMap,
    Framebuffer,
    Modules,
    AcpiRsdp,
    Smp,
    BootTime,
    Bootloader,
    KernelFile,
    EfiSystemTable,
    Initrd,
    /// Vendor extension (`>= 0x8000`); never decoded.
    Vendor(u16),
    /// Unassigned code below the vendor range; never decoded.
    Unknown(u16),
}

impl From<u16> for TagType {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::End,
            0x0001 => Self::Cmdline,
            0x0002 => Self::MemoryMap,
            0x0003 => Self::Framebuffer,
            0x0004 => Self::Modules,
            0x0005 => Self::AcpiRsdp,
            0x0006 => Self::Smp,
            0x0007 => Self::BootTime,
            0x0008 => Self::Bootloader,
            0x0009 => Self::KernelFile,
            0x000A => Self::EfiSystemTable,
            0x000B => Self::Initrd,
            v if v >= VENDOR_TAG_BASE => Self::Vendor(v),
            v => Self::Unknown(v),
        }
    }
}

impl From<TagType> for u16 {
    fn from(value: TagType) -> Self {
        match value {
            TagType::End => 0x0000,
            TagType::Cmdline => 0x0001,
            TagType::MemoryMap => 0x0002,
            TagType::Framebuffer => 0x0003,
            TagType::Modules => 0x0004,
            TagType::AcpiRsdp => 0x0005,
            TagType::Smp => 0x0006,
            TagType::BootTime => 0x0007,
            TagType::Bootloader => 0x0008,
            TagType::KernelFile => 0x0009,
            TagType::EfiSystemTable => 0x000A,
            TagType::Initrd => 0x000B,
            TagType::Vendor(v) | TagType::Unknown(v) => v,
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => f.write_str("end"),
            Self::Cmdline => f.write_str("command line"),
            Self::MemoryMap => f.write_str("memory map"),
            Self::Framebuffer => f.write_str("framebuffer"),
            Self::Modules => f.write_str("modules"),
            Self::AcpiRsdp => f.write_str("ACPI RSDP"),
            Self::Smp => f.write_str("SMP"),
            Self::BootTime => f.write_str("boot time"),
            Self::Bootloader => f.write_str("bootloader"),
            Self::KernelFile => f.write_str("kernel file"),
            Self::EfiSystemTable => f.write_str("EFI system table"),
            Self::Initrd => f.write_str("initrd"),
            Self::Vendor(v) => write!(f, "vendor {v:#06x}"),
            Self::Unknown(v) => write!(f, "unknown {v:#06x}"),
        }
    }
}

/// Decoded generic tag header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TagHeader {
    pub tag_type: TagType,
    pub flags: u16,
    pub size: u32,
}

impl TagHeader {
    fn read(buf: &[u8], off: usize) -> Option<Self> {
        Some(Self {
            tag_type: TagType::from(read_u16_le(buf, off)?),
            flags: read_u16_le(buf, off.checked_add(2)?)?,
            size: read_u32_le(buf, off.checked_add(4)?)?,
        })
    }
}

/// Offset of a tag within its region, together with its decoded header.
///
/// Positions are only ever produced by [`next_tag`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TagPosition {
    offset: usize,
    header: TagHeader,
}

impl TagPosition {
    /// Byte offset of the tag header from the start of the region.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub const fn header(&self) -> &TagHeader {
        &self.header
    }

    #[must_use]
    pub const fn tag_type(&self) -> TagType {
        self.header.tag_type
    }

    /// Declared size of the tag, header included.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.header.size
    }

    /// Offset one past the last declared byte of the tag.
    #[must_use]
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(to_usize(self.header.size)?)
    }
}

/// Returns the tag following `current`, or the first tag if `current` is `None`.
///
/// Returns `None` when:
/// * `current` is an End tag;
/// * `current` declares a size smaller than a tag header;
/// * rounding `current`'s size up to [`TAG_ALIGN`] overflows;
/// * a full tag header does not fit before the end of the region;
/// * the candidate's declared size runs past the end of the region.
///
/// The function keeps no state; calling it again with `None` restarts the
/// walk and yields the same sequence for the same region.
#[must_use]
pub fn next_tag(region: &BootRegion<'_>, current: Option<TagPosition>) -> Option<TagPosition> {
    let bytes = region.bytes();

    let offset = match current {
        None => HEADER_SIZE,
        Some(tag) => {
            if tag.tag_type() == TagType::End {
                return None;
            }

            let size = tag.size();
            if to_usize(size)? < TAG_HEADER_SIZE {
                return None;
            }

            let aligned = align_up(size, TAG_ALIGN)?;
            tag.offset.checked_add(to_usize(aligned)?)?
        }
    };

    let header_end = offset.checked_add(TAG_HEADER_SIZE)?;
    if header_end > bytes.len() {
        return None;
    }

    let header = TagHeader::read(bytes, offset)?;
    let position = TagPosition { offset, header };
    if position.end()? > bytes.len() {
        return None;
    }

    Some(position)
}

/// A tag together with the region bytes it covers.
#[derive(Debug, Copy, Clone)]
pub struct RawTag<'a> {
    position: TagPosition,
    bytes: &'a [u8],
}

impl<'a> RawTag<'a> {
    pub(crate) const fn new(position: TagPosition, bytes: &'a [u8]) -> Self {
        Self { position, bytes }
    }

    #[must_use]
    pub const fn position(&self) -> TagPosition {
        self.position
    }

    #[must_use]
    pub const fn tag_type(&self) -> TagType {
        self.position.tag_type()
    }

    #[must_use]
    pub const fn flags(&self) -> u16 {
        self.position.header.flags
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.position.size()
    }

    /// The declared extent of the tag, header included.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The bytes following the tag header (empty for undersized tags).
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        self.bytes.get(TAG_HEADER_SIZE..).unwrap_or_default()
    }
}

/// Iterator over the tags of a region, driven by [`next_tag`].
///
/// Stops after an End tag or as soon as the cursor gives up.
#[derive(Debug, Clone)]
pub struct Tags<'a> {
    region: BootRegion<'a>,
    current: Option<TagPosition>,
    done: bool,
}

impl<'a> Tags<'a> {
    pub(crate) const fn new(region: BootRegion<'a>) -> Self {
        Self {
            region,
            current: None,
            done: false,
        }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = RawTag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(position) = next_tag(&self.region, self.current) else {
            self.done = true;
            return None;
        };

        self.current = Some(position);
        let tag = self.region.tag(position);
        if tag.is_none() {
            self.done = true;
        }
        tag
    }
}

impl FusedIterator for Tags<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BootInfoBuilder;

    #[test]
    fn tag_type_codes_round_trip_through_u16() {
        for code in [0u16, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 0x7fff, 0x8000, 0xffff] {
            assert_eq!(u16::from(TagType::from(code)), code);
        }
        assert_eq!(TagType::from(12), TagType::Unknown(12));
        assert_eq!(TagType::from(0x8001), TagType::Vendor(0x8001));
    }

    #[test]
    fn first_tag_follows_header() {
        let blob = BootInfoBuilder::new().build();
        let region = BootRegion::new(&blob).unwrap();
        let first = next_tag(&region, None).unwrap();
        assert_eq!(first.offset(), HEADER_SIZE);
        assert_eq!(first.tag_type(), TagType::End);
        assert_eq!(next_tag(&region, Some(first)), None);
    }

    #[test]
    fn unaligned_sizes_are_rounded_up() {
        let blob = BootInfoBuilder::new()
            .raw_tag(0x8000, 0, &[1, 2, 3])
            .build();
        let region = BootRegion::new(&blob).unwrap();
        let first = next_tag(&region, None).unwrap();
        assert_eq!(first.size(), 11);
        let second = next_tag(&region, Some(first)).unwrap();
        assert_eq!(second.offset(), HEADER_SIZE + 16);
        assert_eq!(second.tag_type(), TagType::End);
    }

    #[test]
    fn undersized_tag_stops_the_walk() {
        let blob = BootInfoBuilder::new().raw_tag_sized(0x8000, 4, &[]).build();
        let region = BootRegion::new(&blob).unwrap();
        let first = next_tag(&region, None).unwrap();
        assert_eq!(first.size(), 4);
        assert_eq!(next_tag(&region, Some(first)), None);
    }

    #[test]
    fn oversized_tag_is_never_returned() {
        let blob = BootInfoBuilder::new()
            .raw_tag_sized(0x8000, 0x1000, &[])
            .build();
        let region = BootRegion::new(&blob).unwrap();
        assert_eq!(next_tag(&region, None), None);
    }

    #[test]
    fn huge_size_overflow_in_alignment_stops_the_walk() {
        let blob = BootInfoBuilder::new()
            .raw_tag_sized(0x8000, u32::MAX, &[])
            .build();
        let region = BootRegion::new(&blob).unwrap();
        // The declared size exceeds the region, so not even the first tag is handed out.
        assert_eq!(next_tag(&region, None), None);
    }

    #[test]
    fn payload_of_undersized_tag_is_empty() {
        let blob = BootInfoBuilder::new().raw_tag_sized(0x8000, 0, &[]).build();
        let region = BootRegion::new(&blob).unwrap();
        let tag = region.tags().next().unwrap();
        assert!(tag.payload().is_empty());
        assert!(tag.bytes().is_empty());
    }
}
