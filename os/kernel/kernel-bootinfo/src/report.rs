//! # Human-Readable Boot Report
//!
//! `Display` adapters that render a [`ParsedBootInfo`] as the system
//! information block and memory map table printed during early boot. They
//! write to any formatter and allocate nothing, so the kernel can send them
//! to its log sink and host tools to stdout.

use crate::parse::ParsedBootInfo;
use core::fmt;

/// Horizontal rule framing the report blocks.
pub const REPORT_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Column titles of the memory map table, aligned with
/// [`MemoryMapEntry`](crate::records::MemoryMapEntry)'s `Display` output
/// behind a two-space indent.
pub const MEMORY_MAP_COLUMNS: &str = "  Base Address       | Length             | Type";

/// System information block; see [`ParsedBootInfo::system_report`].
#[derive(Debug, Copy, Clone)]
pub struct SystemReport<'r, 'a>(&'r ParsedBootInfo<'a>);

/// Memory map table; see [`ParsedBootInfo::memory_map_report`].
#[derive(Debug, Copy, Clone)]
pub struct MemoryMapReport<'r, 'a>(&'r ParsedBootInfo<'a>);

impl<'a> ParsedBootInfo<'a> {
    #[must_use]
    pub const fn system_report(&self) -> SystemReport<'_, 'a> {
        SystemReport(self)
    }

    #[must_use]
    pub const fn memory_map_report(&self) -> MemoryMapReport<'_, 'a> {
        MemoryMapReport(self)
    }
}

impl fmt::Display for SystemReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.0;
        writeln!(f, "System Information:")?;
        writeln!(f, "{REPORT_RULE}")?;

        match info.bootloader() {
            Some(name) => writeln!(f, "  Bootloader:    {name}")?,
            None => writeln!(f, "  Bootloader:    (unknown)")?,
        }
        writeln!(f, "  CPUs:          {}", info.cpu_count())?;
        writeln!(f, "  Usable RAM:    {} MiB", info.total_usable_memory_mb())?;

        if let Some(fb) = info.framebuffer() {
            writeln!(
                f,
                "  Display:       {}x{} @ {} bpp",
                fb.width(),
                fb.height(),
                fb.bpp()
            )?;
            writeln!(f, "  Framebuffer:   {:#018x}", fb.address())?;
        }

        if let Some(cmdline) = info.cmdline() {
            writeln!(f, "  Command line:  {cmdline}")?;
        }

        match info.acpi_rsdp() {
            Some(acpi) => writeln!(f, "  ACPI:          Available at {:#018x}", acpi.rsdp_address())?,
            None => writeln!(f, "  ACPI:          Not available")?,
        }

        match info.initrd() {
            Some(initrd) => writeln!(f, "  InitRD:        Loaded ({} KiB)", initrd.length() / 1024)?,
            None => writeln!(f, "  InitRD:        Not loaded")?,
        }

        writeln!(f, "{REPORT_RULE}")
    }
}

impl fmt::Display for MemoryMapReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(mmap) = self.0.memory_map() else {
            return writeln!(f, "No memory map available!");
        };

        writeln!(f, "Memory Map:")?;
        writeln!(f, "{REPORT_RULE}")?;
        writeln!(f, "{MEMORY_MAP_COLUMNS}")?;
        writeln!(f, "{REPORT_RULE}")?;
        for entry in mmap.entries() {
            writeln!(f, "  {entry}")?;
        }
        writeln!(f, "{REPORT_RULE}")
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::BootInfoBuilder;
    use crate::records::{MemoryMapEntry, MemoryType};
    use crate::try_parse;

    #[test]
    fn minimal_system_report() {
        let blob = BootInfoBuilder::new()
            .memory_map(&[MemoryMapEntry::new(0, 32 << 20, MemoryType::Usable)])
            .build();
        let info = try_parse(&blob).unwrap();
        let text = info.system_report().to_string();
        assert!(text.contains("  Bootloader:    (unknown)\n"));
        assert!(text.contains("  CPUs:          1\n"));
        assert!(text.contains("  Usable RAM:    32 MiB\n"));
        assert!(text.contains("  ACPI:          Not available\n"));
        assert!(text.contains("  InitRD:        Not loaded\n"));
        assert!(!text.contains("Display"));
        assert!(!text.contains("Command line"));
    }

    #[test]
    fn full_system_report() {
        let blob = BootInfoBuilder::new()
            .bootloader("limine 8.0")
            .memory_map(&[MemoryMapEntry::new(0, 1 << 30, MemoryType::Usable)])
            .framebuffer(0xfd00_0000, 1280, 800, 5120, 32)
            .cmdline("quiet")
            .acpi_rsdp(0xe_0000)
            .initrd(0x200_0000, 3 * 1024 * 1024)
            .build();
        let info = try_parse(&blob).unwrap();
        let text = info.system_report().to_string();
        assert!(text.contains("  Bootloader:    limine 8.0\n"));
        assert!(text.contains("  Usable RAM:    1024 MiB\n"));
        assert!(text.contains("  Display:       1280x800 @ 32 bpp\n"));
        assert!(text.contains("  Framebuffer:   0x00000000fd000000\n"));
        assert!(text.contains("  Command line:  quiet\n"));
        assert!(text.contains("  ACPI:          Available at 0x00000000000e0000\n"));
        assert!(text.contains("  InitRD:        Loaded (3072 KiB)\n"));
    }

    #[test]
    fn memory_map_table_lists_every_entry() {
        let blob = BootInfoBuilder::new()
            .memory_map(&[
                MemoryMapEntry::new(0, 0x9_f000, MemoryType::Usable),
                MemoryMapEntry::new(0xf_0000, 0x1_0000, MemoryType::Reserved),
            ])
            .build();
        let info = try_parse(&blob).unwrap();
        let text = info.memory_map_report().to_string();
        assert!(text.contains("  0x0000000000000000 | 0x000000000009f000 | Usable\n"));
        assert!(text.contains("  0x00000000000f0000 | 0x0000000000010000 | Reserved\n"));
    }
}
