//! # Typed Tag Views
//!
//! One decoder per tag kind the kernel consumes. Each view is built with
//! `TryFrom<RawTag>`, which checks the minimum size and every field the kernel
//! relies on before the view exists. A failed conversion only skips that tag.
//!
//! Views borrow the region; nothing is copied out except the decoded scalar
//! fields.

mod acpi;
mod framebuffer;
mod initrd;
mod memory_map;
mod smp;
mod text;

pub use acpi::{ACPI_RSDP_TAG_SIZE, AcpiRsdpTag};
pub use framebuffer::{ColorChannel, FRAMEBUFFER_TAG_SIZE, FramebufferTag, PixelLayout};
pub use initrd::{INITRD_TAG_SIZE, InitrdTag};
pub use memory_map::{
    MEMORY_MAP_ENTRY_SIZE, MEMORY_MAP_HEADER_SIZE, MemoryMapEntries, MemoryMapEntry,
    MemoryMapTag, MemoryType,
};
pub use smp::{CPU_ENTRY_SIZE, CpuEntries, CpuEntry, CpuFlags, SMP_TAG_HEADER_SIZE, SmpTag};
pub use text::TextTag;

use crate::bytes::{read_u8, read_u32_le, read_u64_le};
use crate::error::TagRejection;
use crate::tag::RawTag;

/// Fails with [`TagRejection::TooSmall`] unless `raw` covers at least `min` bytes.
fn require_size(raw: &RawTag<'_>, min: usize) -> Result<(), TagRejection> {
    if raw.bytes().len() < min {
        return Err(TagRejection::TooSmall {
            size: raw.size(),
            min,
        });
    }
    Ok(())
}

/// Field readers for use after [`require_size`] succeeded; a failing read
/// still maps onto [`TagRejection::TooSmall`] rather than panicking.
struct Fields<'r, 'a> {
    raw: &'r RawTag<'a>,
    min: usize,
}

impl<'r, 'a> Fields<'r, 'a> {
    fn new(raw: &'r RawTag<'a>, min: usize) -> Result<Self, TagRejection> {
        require_size(raw, min)?;
        Ok(Self { raw, min })
    }

    const fn too_small(&self) -> TagRejection {
        TagRejection::TooSmall {
            size: self.raw.size(),
            min: self.min,
        }
    }

    fn u8(&self, off: usize) -> Result<u8, TagRejection> {
        read_u8(self.raw.bytes(), off).ok_or_else(|| self.too_small())
    }

    fn u32(&self, off: usize) -> Result<u32, TagRejection> {
        read_u32_le(self.raw.bytes(), off).ok_or_else(|| self.too_small())
    }

    fn u64(&self, off: usize) -> Result<u64, TagRejection> {
        read_u64_le(self.raw.bytes(), off).ok_or_else(|| self.too_small())
    }
}
