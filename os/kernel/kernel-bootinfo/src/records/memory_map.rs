//! # Memory Map Tag
//!
//! ```text
//! 0x00  tag header (type = 2)
//! 0x08  u32  entry_size    stride between entries, >= 24
//! 0x0C  u32  entry_count
//! 0x10  entries[entry_count], each:
//!         u64 base, u64 length, u32 type, u32 attributes
//! ```

use super::{Fields, require_size};
use crate::bytes::{add_or_keep, read_u32_le, read_u64_le, to_usize};
use crate::error::TagRejection;
use crate::tag::RawTag;
use core::fmt;
use core::iter::FusedIterator;

/// Tag header plus the `entry_size` and `entry_count` fields.
pub const MEMORY_MAP_HEADER_SIZE: usize = 16;

/// Encoded size of one [`MemoryMapEntry`]; the smallest legal stride.
pub const MEMORY_MAP_ENTRY_SIZE: usize = 24;

const MIB: u64 = 1024 * 1024;

/// Physical memory range type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MemoryType {
    /// Do not use.
    Reserved,
    /// Free RAM.
    Usable,
    /// ACPI tables; reusable once parsed.
    AcpiReclaimable,
    /// ACPI non-volatile storage; never touch.
    AcpiNvs,
    /// Faulty memory.
    Bad,
    /// Used by the bootloader; reclaimable.
    Bootloader,
    /// Kernel image.
    Kernel,
    /// Video memory.
    Framebuffer,
    /// Initial ramdisk.
    Initrd,
    /// Loaded boot modules.
    Modules,
    Unknown(u32),
}

impl MemoryType {
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Usable)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reserved => "Reserved",
            Self::Usable => "Usable",
            Self::AcpiReclaimable => "ACPI Reclaimable",
            Self::AcpiNvs => "ACPI NVS",
            Self::Bad => "Bad Memory",
            Self::Bootloader => "Bootloader",
            Self::Kernel => "Kernel",
            Self::Framebuffer => "Framebuffer",
            Self::Initrd => "InitRD",
            Self::Modules => "Modules",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl From<u32> for MemoryType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Reserved,
            1 => Self::Usable,
            2 => Self::AcpiReclaimable,
            3 => Self::AcpiNvs,
            4 => Self::Bad,
            5 => Self::Bootloader,
            6 => Self::Kernel,
            7 => Self::Framebuffer,
            8 => Self::Initrd,
            9 => Self::Modules,
            v => Self::Unknown(v),
        }
    }
}

impl From<MemoryType> for u32 {
    fn from(value: MemoryType) -> Self {
        match value {
            MemoryType::Reserved => 0,
            MemoryType::Usable => 1,
            MemoryType::AcpiReclaimable => 2,
            MemoryType::AcpiNvs => 3,
            MemoryType::Bad => 4,
            MemoryType::Bootloader => 5,
            MemoryType::Kernel => 6,
            MemoryType::Framebuffer => 7,
            MemoryType::Initrd => 8,
            MemoryType::Modules => 9,
            MemoryType::Unknown(v) => v,
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One physical memory range.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryMapEntry {
    pub base: u64,
    pub length: u64,
    pub memory_type: MemoryType,
    pub attributes: u32,
}

impl MemoryMapEntry {
    #[must_use]
    pub const fn new(base: u64, length: u64, memory_type: MemoryType) -> Self {
        Self {
            base,
            length,
            memory_type,
            attributes: 0,
        }
    }

    /// Exclusive end address, or `None` if the range wraps the address space.
    #[must_use]
    pub const fn end(&self) -> Option<u64> {
        self.base.checked_add(self.length)
    }

    fn read(buf: &[u8], off: usize) -> Option<Self> {
        Some(Self {
            base: read_u64_le(buf, off)?,
            length: read_u64_le(buf, off.checked_add(8)?)?,
            memory_type: MemoryType::from(read_u32_le(buf, off.checked_add(16)?)?),
            attributes: read_u32_le(buf, off.checked_add(20)?)?,
        })
    }
}

/// One memory map table row: base, length and type name.
impl fmt::Display for MemoryMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x} | {:#018x} | {}", self.base, self.length, self.memory_type)
    }
}

/// Validated view of a memory map tag.
///
/// All `entry_count` entries lie within the tag's declared extent.
#[derive(Debug, Copy, Clone)]
pub struct MemoryMapTag<'a> {
    raw: RawTag<'a>,
    entry_size: u32,
    entry_count: u32,
}

impl<'a> TryFrom<RawTag<'a>> for MemoryMapTag<'a> {
    type Error = TagRejection;

    fn try_from(raw: RawTag<'a>) -> Result<Self, Self::Error> {
        let fields = Fields::new(&raw, MEMORY_MAP_HEADER_SIZE)?;
        let entry_size = fields.u32(8)?;
        let entry_count = fields.u32(12)?;

        let stride = to_usize(entry_size).ok_or(TagRejection::EntrySizeTooSmall(entry_size))?;
        if stride < MEMORY_MAP_ENTRY_SIZE {
            return Err(TagRejection::EntrySizeTooSmall(entry_size));
        }

        let out_of_bounds = TagRejection::EntriesOutOfBounds {
            entry_size,
            count: entry_count,
        };
        let span = to_usize(entry_count)
            .and_then(|count| count.checked_mul(stride))
            .and_then(|len| len.checked_add(MEMORY_MAP_HEADER_SIZE))
            .ok_or(out_of_bounds)?;
        require_size(&raw, span).map_err(|_| out_of_bounds)?;

        Ok(Self {
            raw,
            entry_size,
            entry_count,
        })
    }
}

impl<'a> MemoryMapTag<'a> {
    #[must_use]
    pub const fn raw(&self) -> &RawTag<'a> {
        &self.raw
    }

    /// Stride between entries in bytes.
    #[must_use]
    pub const fn entry_size(&self) -> u32 {
        self.entry_size
    }

    #[must_use]
    pub const fn entry_count(&self) -> u32 {
        self.entry_count
    }

    #[must_use]
    pub fn entries(&self) -> MemoryMapEntries<'a> {
        MemoryMapEntries {
            bytes: self.raw.bytes(),
            stride: to_usize(self.entry_size).unwrap_or(MEMORY_MAP_ENTRY_SIZE),
            next: 0,
            count: to_usize(self.entry_count).unwrap_or(0),
        }
    }

    /// Sum of the lengths of all [`MemoryType::Usable`] entries.
    ///
    /// An entry whose length would overflow the running total is left out;
    /// later entries are still added if they fit.
    #[must_use]
    pub fn usable_bytes(&self) -> u64 {
        self.entries()
            .filter(|e| e.memory_type.is_usable())
            .fold(0, |total, e| add_or_keep(total, e.length))
    }

    /// [`usable_bytes`](Self::usable_bytes) in whole mebibytes (truncating,
    /// saturating at `u32::MAX`).
    #[must_use]
    pub fn usable_mebibytes(&self) -> u32 {
        u32::try_from(self.usable_bytes() / MIB).unwrap_or(u32::MAX)
    }
}

/// Iterator over the entries of a [`MemoryMapTag`].
#[derive(Debug, Clone)]
pub struct MemoryMapEntries<'a> {
    bytes: &'a [u8],
    stride: usize,
    next: usize,
    count: usize,
}

impl Iterator for MemoryMapEntries<'_> {
    type Item = MemoryMapEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }

        let off = self
            .next
            .checked_mul(self.stride)
            .and_then(|o| o.checked_add(MEMORY_MAP_HEADER_SIZE));
        let Some(entry) = off.and_then(|off| MemoryMapEntry::read(self.bytes, off)) else {
            self.next = self.count;
            return None;
        };

        self.next += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count.saturating_sub(self.next)))
    }
}

impl FusedIterator for MemoryMapEntries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BootInfoBuilder;
    use crate::region::BootRegion;
    use crate::tag::TagType;

    fn first_tag(blob: &[u8]) -> RawTag<'_> {
        let region = BootRegion::new(blob).unwrap();
        region.tags().next().unwrap()
    }

    #[test]
    fn decodes_entries_with_wider_stride() {
        let blob = BootInfoBuilder::new()
            .memory_map_with_stride(
                32,
                &[
                    MemoryMapEntry::new(0, 0x9_f000, MemoryType::Usable),
                    MemoryMapEntry::new(0x10_0000, 0x100_0000, MemoryType::Kernel),
                ],
            )
            .build();
        let raw = first_tag(&blob);
        assert_eq!(raw.tag_type(), TagType::MemoryMap);

        let mmap = MemoryMapTag::try_from(raw).unwrap();
        assert_eq!(mmap.entry_size(), 32);
        assert_eq!(mmap.entry_count(), 2);
        let entries: Vec<_> = mmap.entries().collect();
        assert_eq!(entries[1].base, 0x10_0000);
        assert_eq!(entries[1].memory_type, MemoryType::Kernel);
        assert_eq!(mmap.usable_bytes(), 0x9_f000);
    }

    #[test]
    fn rejects_short_stride() {
        let blob = BootInfoBuilder::new().memory_map_raw(16, 0, &[]).build();
        assert_eq!(
            MemoryMapTag::try_from(first_tag(&blob)).unwrap_err(),
            TagRejection::EntrySizeTooSmall(16)
        );
    }

    #[test]
    fn rejects_count_beyond_tag() {
        let blob = BootInfoBuilder::new()
            .memory_map_raw(24, 3, &[0u8; 48])
            .build();
        assert_eq!(
            MemoryMapTag::try_from(first_tag(&blob)).unwrap_err(),
            TagRejection::EntriesOutOfBounds {
                entry_size: 24,
                count: 3
            }
        );
    }

    #[test]
    fn rejects_tag_without_counts() {
        let blob = BootInfoBuilder::new()
            .raw_tag(TagType::MemoryMap.into(), 0, &[0u8; 4])
            .build();
        assert_eq!(
            MemoryMapTag::try_from(first_tag(&blob)).unwrap_err(),
            TagRejection::TooSmall { size: 12, min: 16 }
        );
    }

    #[test]
    fn overflowing_lengths_keep_the_running_total() {
        let blob = BootInfoBuilder::new()
            .memory_map(&[
                MemoryMapEntry::new(0, u64::MAX - MIB, MemoryType::Usable),
                MemoryMapEntry::new(0, 2 * MIB, MemoryType::Usable),
                MemoryMapEntry::new(0, MIB, MemoryType::Usable),
            ])
            .build();
        let mmap = MemoryMapTag::try_from(first_tag(&blob)).unwrap();
        assert_eq!(mmap.usable_bytes(), u64::MAX);
        assert_eq!(mmap.usable_mebibytes(), u32::MAX);
    }

    #[test]
    fn only_usable_entries_count() {
        let blob = BootInfoBuilder::new()
            .memory_map(&[
                MemoryMapEntry::new(0, 8 * MIB, MemoryType::Usable),
                MemoryMapEntry::new(0, 64 * MIB, MemoryType::Reserved),
                MemoryMapEntry::new(0, 64 * MIB, MemoryType::AcpiReclaimable),
                MemoryMapEntry::new(0, 3 * MIB + 5, MemoryType::Usable),
            ])
            .build();
        let mmap = MemoryMapTag::try_from(first_tag(&blob)).unwrap();
        assert_eq!(mmap.usable_mebibytes(), 11);
    }

    #[test]
    fn memory_type_names() {
        assert_eq!(MemoryType::from(2).to_string(), "ACPI Reclaimable");
        assert_eq!(MemoryType::from(42), MemoryType::Unknown(42));
        assert_eq!(u32::from(MemoryType::Unknown(42)), 42);
        assert_eq!(MemoryType::Unknown(42).name(), "Unknown");
    }
}
