//! # SMP Tag
//!
//! ```text
//! 0x00  tag header (type = 6)
//! 0x08  u32  cpu_count
//! 0x0C  u32  bsp_id
//! 0x10  cpus[], each: u32 id, u32 flags
//! ```
//!
//! The CPU array is advisory: the kernel only relies on `cpu_count`. Entries
//! are yielded for as many records as fit into the tag, at most `cpu_count`.

use super::Fields;
use crate::bytes::{read_u32_le, to_usize};
use crate::error::TagRejection;
use crate::tag::RawTag;
use bitfield_struct::bitfield;
use core::iter::FusedIterator;

/// Tag header plus the `cpu_count` and `bsp_id` fields.
pub const SMP_TAG_HEADER_SIZE: usize = 16;

/// Encoded size of one [`CpuEntry`].
pub const CPU_ENTRY_SIZE: usize = 8;

/// Per-CPU flags.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct CpuFlags {
    /// The processor is usable.
    pub enabled: bool,
    /// The processor is the bootstrap processor.
    pub bootstrap: bool,
    #[bits(30)]
    __: u32,
}

/// One processor record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CpuEntry {
    /// Local APIC ID.
    pub id: u32,
    pub flags: CpuFlags,
}

impl CpuEntry {
    #[must_use]
    pub const fn new(id: u32, flags: CpuFlags) -> Self {
        Self { id, flags }
    }
}

/// Validated view of an SMP tag; `cpu_count` is non-zero.
#[derive(Debug, Copy, Clone)]
pub struct SmpTag<'a> {
    raw: RawTag<'a>,
    cpu_count: u32,
    bsp_id: u32,
}

impl<'a> TryFrom<RawTag<'a>> for SmpTag<'a> {
    type Error = TagRejection;

    fn try_from(raw: RawTag<'a>) -> Result<Self, Self::Error> {
        let fields = Fields::new(&raw, SMP_TAG_HEADER_SIZE)?;
        let cpu_count = fields.u32(8)?;
        let bsp_id = fields.u32(12)?;
        if cpu_count == 0 {
            return Err(TagRejection::Zero("CPU count"));
        }
        Ok(Self {
            raw,
            cpu_count,
            bsp_id,
        })
    }
}

impl<'a> SmpTag<'a> {
    #[must_use]
    pub const fn raw(&self) -> &RawTag<'a> {
        &self.raw
    }

    #[must_use]
    pub const fn cpu_count(&self) -> u32 {
        self.cpu_count
    }

    /// APIC ID of the bootstrap processor.
    #[must_use]
    pub const fn bsp_id(&self) -> u32 {
        self.bsp_id
    }

    #[must_use]
    pub fn cpus(&self) -> CpuEntries<'a> {
        let bytes = self.raw.bytes();
        let fit = bytes.len().saturating_sub(SMP_TAG_HEADER_SIZE) / CPU_ENTRY_SIZE;
        let declared = to_usize(self.cpu_count).unwrap_or(fit);
        CpuEntries {
            bytes,
            next: 0,
            count: fit.min(declared),
        }
    }
}

/// Iterator over the CPU records of an [`SmpTag`].
#[derive(Debug, Clone)]
pub struct CpuEntries<'a> {
    bytes: &'a [u8],
    next: usize,
    count: usize,
}

impl Iterator for CpuEntries<'_> {
    type Item = CpuEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let off = SMP_TAG_HEADER_SIZE + self.next * CPU_ENTRY_SIZE;
        let entry = read_u32_le(self.bytes, off)
            .zip(read_u32_le(self.bytes, off + 4))
            .map(|(id, flags)| CpuEntry::new(id, CpuFlags::from_bits(flags)));
        if entry.is_some() {
            self.next += 1;
        } else {
            self.next = self.count;
        }
        entry
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CpuEntries<'_> {}

impl FusedIterator for CpuEntries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BootInfoBuilder;
    use crate::region::BootRegion;
    use crate::tag::TagType;

    fn decode(blob: &[u8]) -> Result<SmpTag<'_>, TagRejection> {
        let region = BootRegion::new(blob).unwrap();
        SmpTag::try_from(region.tags().next().unwrap())
    }

    #[test]
    fn decodes_cpus_and_flags() {
        let bsp = CpuFlags::new().with_enabled(true).with_bootstrap(true);
        let ap = CpuFlags::new().with_enabled(true);
        let blob = BootInfoBuilder::new()
            .smp(0, &[CpuEntry::new(0, bsp), CpuEntry::new(1, ap), CpuEntry::new(2, CpuFlags::new())])
            .build();
        let smp = decode(&blob).unwrap();
        assert_eq!(smp.cpu_count(), 3);
        assert_eq!(smp.bsp_id(), 0);

        let cpus: Vec<_> = smp.cpus().collect();
        assert_eq!(cpus.len(), 3);
        assert!(cpus[0].flags.bootstrap());
        assert!(cpus[1].flags.enabled() && !cpus[1].flags.bootstrap());
        assert!(!cpus[2].flags.enabled());
        assert_eq!(bsp.into_bits(), 0b11);
    }

    #[test]
    fn cpu_array_is_bounded_by_tag_size() {
        // Claims 64 CPUs but carries a single record.
        let mut payload = Vec::new();
        payload.extend_from_slice(&64u32.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&7u32.to_le_bytes());
        payload.extend_from_slice(&1u32.to_le_bytes());
        let blob = BootInfoBuilder::new()
            .raw_tag(TagType::Smp.into(), 0, &payload)
            .build();
        let smp = decode(&blob).unwrap();
        assert_eq!(smp.cpu_count(), 64);
        let cpus = smp.cpus();
        assert_eq!(cpus.len(), 1);
        assert_eq!(cpus.collect::<Vec<_>>(), [CpuEntry::new(7, CpuFlags::from_bits(1))]);
    }

    #[test]
    fn undersized_tag_is_rejected() {
        let blob = BootInfoBuilder::new()
            .raw_tag(TagType::Smp.into(), 0, &[1, 0, 0, 0, 0, 0, 0])
            .build();
        assert_eq!(
            decode(&blob).unwrap_err(),
            TagRejection::TooSmall { size: 15, min: 16 }
        );
    }

    #[test]
    fn zero_cpu_count_is_rejected() {
        let blob = BootInfoBuilder::new().smp(0, &[]).build();
        assert_eq!(decode(&blob).unwrap_err(), TagRejection::Zero("CPU count"));
    }
}
