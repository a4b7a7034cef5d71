//! # Record Parser
//!
//! Drives the tag cursor over a validated region and collects every tag the
//! kernel consumes into a [`ParsedBootInfo`].
//!
//! ```text
//! Start ─► header check ─► iterate ─┬─ End tag ────────┐
//!              │                    ├─ cursor gives up ─┤
//!              ▼                    └─ tag cap reached ─┤
//!           Failure                                     ▼
//!                           End seen ∧ memory map ─► Success, else Failure
//! ```
//!
//! A tag that fails its type-specific validation is skipped and leaves its
//! presence flag unset; it never fails the parse on its own.

use crate::error::{ParseError, TagRejection};
use crate::limits::Limits;
use crate::records::{AcpiRsdpTag, FramebufferTag, InitrdTag, MemoryMapTag, SmpTag, TextTag};
use crate::region::BootRegion;
use crate::tag::{RawTag, TagType};
use log::{debug, trace};

/// Everything the kernel learned from the boot info region.
///
/// Views borrow the region. Once returned by the parser the record is only
/// handed out by shared reference.
#[derive(Debug, Clone)]
pub struct ParsedBootInfo<'a> {
    memory_map: Option<MemoryMapTag<'a>>,
    framebuffer: Option<FramebufferTag<'a>>,
    cmdline: Option<TextTag<'a>>,
    acpi_rsdp: Option<AcpiRsdpTag<'a>>,
    smp: Option<SmpTag<'a>>,
    initrd: Option<InitrdTag<'a>>,
    bootloader: Option<TextTag<'a>>,
    total_usable_memory_mb: u32,
    cpu_count: u32,
}

impl Default for ParsedBootInfo<'_> {
    fn default() -> Self {
        Self {
            memory_map: None,
            framebuffer: None,
            cmdline: None,
            acpi_rsdp: None,
            smp: None,
            initrd: None,
            bootloader: None,
            total_usable_memory_mb: 0,
            cpu_count: 1,
        }
    }
}

impl<'a> ParsedBootInfo<'a> {
    #[must_use]
    pub const fn has_memory_map(&self) -> bool {
        self.memory_map.is_some()
    }

    #[must_use]
    pub const fn has_framebuffer(&self) -> bool {
        self.framebuffer.is_some()
    }

    #[must_use]
    pub const fn has_cmdline(&self) -> bool {
        self.cmdline.is_some()
    }

    #[must_use]
    pub const fn has_acpi(&self) -> bool {
        self.acpi_rsdp.is_some()
    }

    #[must_use]
    pub const fn has_smp(&self) -> bool {
        self.smp.is_some()
    }

    #[must_use]
    pub const fn has_initrd(&self) -> bool {
        self.initrd.is_some()
    }

    #[must_use]
    pub const fn memory_map(&self) -> Option<&MemoryMapTag<'a>> {
        self.memory_map.as_ref()
    }

    #[must_use]
    pub const fn framebuffer(&self) -> Option<&FramebufferTag<'a>> {
        self.framebuffer.as_ref()
    }

    #[must_use]
    pub const fn cmdline(&self) -> Option<&TextTag<'a>> {
        self.cmdline.as_ref()
    }

    #[must_use]
    pub const fn acpi_rsdp(&self) -> Option<&AcpiRsdpTag<'a>> {
        self.acpi_rsdp.as_ref()
    }

    #[must_use]
    pub const fn smp(&self) -> Option<&SmpTag<'a>> {
        self.smp.as_ref()
    }

    #[must_use]
    pub const fn initrd(&self) -> Option<&InitrdTag<'a>> {
        self.initrd.as_ref()
    }

    /// Bootloader identity; optional, never required for a successful parse.
    #[must_use]
    pub const fn bootloader(&self) -> Option<&TextTag<'a>> {
        self.bootloader.as_ref()
    }

    /// Usable RAM reported by the memory map, in whole mebibytes.
    #[must_use]
    pub const fn total_usable_memory_mb(&self) -> u32 {
        self.total_usable_memory_mb
    }

    /// Processor count from the SMP tag, or 1 without one.
    #[must_use]
    pub const fn cpu_count(&self) -> u32 {
        self.cpu_count
    }

    /// Decodes one tag and records it. Unknown and unused tag types are
    /// accepted without effect.
    fn accept(&mut self, raw: RawTag<'a>) -> Result<(), TagRejection> {
        match raw.tag_type() {
            TagType::MemoryMap => {
                let mmap = MemoryMapTag::try_from(raw)?;
                self.total_usable_memory_mb = mmap.usable_mebibytes();
                self.memory_map = Some(mmap);
            }
            TagType::Framebuffer => self.framebuffer = Some(FramebufferTag::try_from(raw)?),
            TagType::Cmdline => self.cmdline = Some(TextTag::try_from(raw)?),
            TagType::AcpiRsdp => self.acpi_rsdp = Some(AcpiRsdpTag::try_from(raw)?),
            TagType::Smp => {
                let smp = SmpTag::try_from(raw)?;
                self.cpu_count = smp.cpu_count();
                self.smp = Some(smp);
            }
            TagType::Initrd => self.initrd = Some(InitrdTag::try_from(raw)?),
            TagType::Bootloader => self.bootloader = Some(TextTag::try_from(raw)?),
            TagType::End
            | TagType::Modules
            | TagType::BootTime
            | TagType::KernelFile
            | TagType::EfiSystemTable
            | TagType::Vendor(_)
            | TagType::Unknown(_) => {}
        }
        Ok(())
    }
}

/// Walks the tags of `region` into `out`, which must start out reset.
fn collect_tags<'a>(
    region: &BootRegion<'a>,
    limits: &Limits,
    out: &mut ParsedBootInfo<'a>,
) -> Result<(), ParseError> {
    let mut visited: u32 = 0;
    let mut found_end = false;

    for tag in region.tags() {
        visited += 1;
        if visited > limits.max_tags {
            debug!("boot info: giving up after {} tags", limits.max_tags);
            return Err(ParseError::TooManyTags(limits.max_tags));
        }

        if tag.tag_type() == TagType::End {
            found_end = true;
            break;
        }

        if let Err(reason) = out.accept(tag) {
            trace!(
                "boot info: skipping {} tag at offset {:#x}: {reason}",
                tag.tag_type(),
                tag.position().offset()
            );
        }
    }

    if !found_end {
        debug!("boot info: tag list is not terminated");
        return Err(ParseError::MissingEndTag);
    }

    if !out.has_memory_map() {
        debug!("boot info: no usable memory map tag");
        return Err(ParseError::MissingMemoryMap);
    }

    Ok(())
}

/// Parses an already validated region.
///
/// # Errors
/// [`ParseError::TooManyTags`], [`ParseError::MissingEndTag`] or
/// [`ParseError::MissingMemoryMap`].
pub fn parse_region<'a>(
    region: &BootRegion<'a>,
    limits: &Limits,
) -> Result<ParsedBootInfo<'a>, ParseError> {
    let mut info = ParsedBootInfo::default();
    collect_tags(region, limits, &mut info)?;
    Ok(info)
}

/// Validates and parses `bytes` against `limits`.
///
/// # Errors
/// The fatal [`ParseError`] that ended the parse.
pub fn parse_with_limits<'a>(
    bytes: &'a [u8],
    limits: &Limits,
) -> Result<ParsedBootInfo<'a>, ParseError> {
    let region = BootRegion::with_limits(bytes, limits)?;
    parse_region(&region, limits)
}

/// Validates and parses `bytes` with [`Limits::DEFAULT`].
///
/// # Errors
/// The fatal [`ParseError`] that ended the parse.
pub fn try_parse(bytes: &[u8]) -> Result<ParsedBootInfo<'_>, ParseError> {
    parse_with_limits(bytes, &Limits::DEFAULT)
}

/// Validates and parses `bytes` into `out`, returning whether the region is
/// usable.
///
/// If the header is invalid `out` is left untouched. Otherwise `out` is reset
/// first and then filled tag by tag; after a failed parse it may hold the
/// tags seen before the failure and must not be relied on.
pub fn parse<'a>(bytes: &'a [u8], out: &mut ParsedBootInfo<'a>) -> bool {
    let limits = Limits::DEFAULT;
    let Ok(region) = BootRegion::with_limits(bytes, &limits) else {
        return false;
    };

    *out = ParsedBootInfo::default();
    collect_tags(&region, &limits, out).is_ok()
}
