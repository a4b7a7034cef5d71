//! # Region Builder
//!
//! Produces encoded boot info regions. Used by host tooling to generate
//! fixtures and by the tests of this crate; tags are laid out in call order
//! and each one is padded to the next 8-byte boundary.
//!
//! ```
//! use kernel_bootinfo::records::{MemoryMapEntry, MemoryType};
//! use kernel_bootinfo::{BootInfoBuilder, try_parse};
//!
//! let blob = BootInfoBuilder::new()
//!     .memory_map(&[MemoryMapEntry::new(0, 64 << 20, MemoryType::Usable)])
//!     .cmdline("console=ttyS0")
//!     .build();
//!
//! let info = try_parse(&blob).unwrap();
//! assert_eq!(info.total_usable_memory_mb(), 64);
//! ```

use crate::header::HEADER_SIZE;
use crate::limits::{BOOT_MAGIC, MIN_VERSION};
use crate::records::{
    CPU_ENTRY_SIZE, CpuEntry, MEMORY_MAP_ENTRY_SIZE, MemoryMapEntry, PixelLayout,
};
use crate::tag::{TAG_ALIGN, TAG_HEADER_SIZE, TagType};
use alloc::vec::Vec;

/// Incrementally encodes a boot info region.
#[derive(Debug, Clone)]
pub struct BootInfoBuilder {
    magic: u32,
    version: u32,
    reserved: u32,
    total_size: Option<u32>,
    tags: Vec<u8>,
}

impl Default for BootInfoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_possible_truncation)]
const ALIGN: usize = TAG_ALIGN as usize;

/// Clamps a host length into a `u32` field.
fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl BootInfoBuilder {
    /// A builder for a valid, empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            magic: BOOT_MAGIC,
            version: MIN_VERSION,
            reserved: 0,
            total_size: None,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub const fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    #[must_use]
    pub const fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub const fn reserved(mut self, reserved: u32) -> Self {
        self.reserved = reserved;
        self
    }

    /// Overrides the `total_size` header field, which otherwise matches the
    /// encoded length.
    #[must_use]
    pub const fn total_size(mut self, total_size: u32) -> Self {
        self.total_size = Some(total_size);
        self
    }

    /// Appends a tag whose size covers exactly `payload`.
    #[must_use]
    pub fn raw_tag(self, tag_type: u16, flags: u16, payload: &[u8]) -> Self {
        let size = len_u32(TAG_HEADER_SIZE + payload.len());
        self.push_tag(tag_type, flags, size, payload)
    }

    /// Appends a tag with an arbitrary declared `size`, which need not match
    /// the payload that is actually written.
    #[must_use]
    pub fn raw_tag_sized(self, tag_type: u16, size: u32, payload: &[u8]) -> Self {
        self.push_tag(tag_type, 0, size, payload)
    }

    fn push_tag(mut self, tag_type: u16, flags: u16, size: u32, payload: &[u8]) -> Self {
        self.tags.extend_from_slice(&tag_type.to_le_bytes());
        self.tags.extend_from_slice(&flags.to_le_bytes());
        self.tags.extend_from_slice(&size.to_le_bytes());
        self.tags.extend_from_slice(payload);
        let padded = self.tags.len().next_multiple_of(ALIGN);
        self.tags.resize(padded, 0);
        self
    }

    /// Appends a memory map with the minimal 24-byte entry stride.
    #[must_use]
    pub fn memory_map(self, entries: &[MemoryMapEntry]) -> Self {
        self.memory_map_with_stride(len_u32(MEMORY_MAP_ENTRY_SIZE), entries)
    }

    /// Appends a memory map whose entries are `stride` bytes apart. Bytes
    /// beyond the 24 encoded ones are zero.
    #[must_use]
    pub fn memory_map_with_stride(self, stride: u32, entries: &[MemoryMapEntry]) -> Self {
        let stride_len = usize::try_from(stride)
            .unwrap_or(MEMORY_MAP_ENTRY_SIZE)
            .max(MEMORY_MAP_ENTRY_SIZE);
        let mut payload = Vec::with_capacity(entries.len() * stride_len);
        for entry in entries {
            let start = payload.len();
            payload.extend_from_slice(&entry.base.to_le_bytes());
            payload.extend_from_slice(&entry.length.to_le_bytes());
            payload.extend_from_slice(&u32::from(entry.memory_type).to_le_bytes());
            payload.extend_from_slice(&entry.attributes.to_le_bytes());
            payload.resize(start + stride_len, 0);
        }
        self.memory_map_raw(stride, len_u32(entries.len()), &payload)
    }

    /// Appends a memory map with the given header fields and raw entry bytes.
    #[must_use]
    pub fn memory_map_raw(self, entry_size: u32, entry_count: u32, entries: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(8 + entries.len());
        payload.extend_from_slice(&entry_size.to_le_bytes());
        payload.extend_from_slice(&entry_count.to_le_bytes());
        payload.extend_from_slice(entries);
        self.raw_tag(TagType::MemoryMap.into(), 0, &payload)
    }

    /// Appends a framebuffer in the common 32-bit BGRX layout.
    #[must_use]
    pub fn framebuffer(self, address: u64, width: u32, height: u32, pitch: u32, bpp: u8) -> Self {
        self.framebuffer_with_layout(address, width, height, pitch, bpp, PixelLayout::BGRX_8888)
    }

    #[must_use]
    pub fn framebuffer_with_layout(
        self,
        address: u64,
        width: u32,
        height: u32,
        pitch: u32,
        bpp: u8,
        layout: PixelLayout,
    ) -> Self {
        let mut payload = Vec::with_capacity(32);
        payload.extend_from_slice(&address.to_le_bytes());
        payload.extend_from_slice(&width.to_le_bytes());
        payload.extend_from_slice(&height.to_le_bytes());
        payload.extend_from_slice(&pitch.to_le_bytes());
        payload.push(bpp);
        for channel in [layout.red, layout.green, layout.blue, layout.reserved] {
            payload.extend_from_slice(&[channel.shift, channel.size]);
        }
        payload.extend_from_slice(&[0; 3]);
        self.raw_tag(TagType::Framebuffer.into(), 0, &payload)
    }

    /// Appends a NUL-terminated command line.
    #[must_use]
    pub fn cmdline(self, cmdline: &str) -> Self {
        self.text_tag(TagType::Cmdline, cmdline)
    }

    /// Appends a NUL-terminated bootloader name.
    #[must_use]
    pub fn bootloader(self, name: &str) -> Self {
        self.text_tag(TagType::Bootloader, name)
    }

    fn text_tag(self, tag_type: TagType, text: &str) -> Self {
        let mut payload = Vec::with_capacity(text.len() + 1);
        payload.extend_from_slice(text.as_bytes());
        payload.push(0);
        self.raw_tag(tag_type.into(), 0, &payload)
    }

    #[must_use]
    pub fn acpi_rsdp(self, rsdp_address: u64) -> Self {
        self.raw_tag(TagType::AcpiRsdp.into(), 0, &rsdp_address.to_le_bytes())
    }

    /// Appends an SMP tag whose `cpu_count` is the number of `cpus`.
    #[must_use]
    pub fn smp(self, bsp_id: u32, cpus: &[CpuEntry]) -> Self {
        let mut payload = Vec::with_capacity(8 + cpus.len() * CPU_ENTRY_SIZE);
        payload.extend_from_slice(&len_u32(cpus.len()).to_le_bytes());
        payload.extend_from_slice(&bsp_id.to_le_bytes());
        for cpu in cpus {
            payload.extend_from_slice(&cpu.id.to_le_bytes());
            payload.extend_from_slice(&cpu.flags.into_bits().to_le_bytes());
        }
        self.raw_tag(TagType::Smp.into(), 0, &payload)
    }

    #[must_use]
    pub fn initrd(self, start: u64, length: u64) -> Self {
        let mut payload = Vec::with_capacity(16);
        payload.extend_from_slice(&start.to_le_bytes());
        payload.extend_from_slice(&length.to_le_bytes());
        self.raw_tag(TagType::Initrd.into(), 0, &payload)
    }

    /// Appends an End tag now; tags added afterwards follow it.
    #[must_use]
    pub fn end(self) -> Self {
        self.raw_tag(TagType::End.into(), 0, &[])
    }

    /// Encodes the region followed by a closing End tag.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.end().build_without_end()
    }

    /// Encodes the region without appending an End tag.
    #[must_use]
    pub fn build_without_end(self) -> Vec<u8> {
        let total_size = self
            .total_size
            .unwrap_or_else(|| len_u32(HEADER_SIZE + self.tags.len()));

        let mut out = Vec::with_capacity(HEADER_SIZE + self.tags.len());
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&total_size.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.reserved.to_le_bytes());
        out.extend_from_slice(&self.tags);
        out
    }
}
