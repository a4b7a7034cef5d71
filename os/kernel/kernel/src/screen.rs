//! # Boot and Panic Screens
//!
//! What the kernel shows on the framebuffer console. Each printer returns
//! the console's `fmt::Result`, which only fails if a `Display`
//! implementation does.

use crate::console::{Color, Console, Status};
use core::fmt::{self, Write};
use core::panic::PanicInfo;
use kernel_bootinfo::records::{MemoryMapEntry, MemoryType};
use kernel_bootinfo::{MEMORY_MAP_COLUMNS, ParsedBootInfo, REPORT_RULE};

const BANNER_RULE: &str =
    "================================================================================";

/// Banner, system information and memory map, as shown after a good boot.
///
/// # Errors
/// See the module documentation.
pub fn boot_report(console: &mut Console<'_>, info: &ParsedBootInfo<'_>) -> fmt::Result {
    banner(console)?;
    console.status(Status::Info, format_args!("{}", info.system_report()))?;
    console.newline();
    memory_map(console, info)?;
    console.newline();
    console.status(Status::Ok, format_args!("Kernel initialization complete!\n"))?;
    console.newline();
    console.write_str("Early initialization finished.\n")?;
    console.write_str("Further subsystems are not yet implemented.\n")?;
    console.write_str("System halted.\n")
}

fn banner(console: &mut Console<'_>) -> fmt::Result {
    let (fg, bg) = console.colors();
    console.set_color(Color::CYAN, bg);
    writeln!(console)?;
    writeln!(console, "{BANNER_RULE}")?;
    writeln!(console)?;
    writeln!(console, "{:^80}", "Kernel")?;
    writeln!(console)?;
    writeln!(console, "{BANNER_RULE}")?;
    console.set_color(fg, bg);
    writeln!(console)?;
    console.status(Status::Info, format_args!("Kernel starting...\n\n"))
}

/// Color a memory map row is drawn in.
const fn row_color(entry: &MemoryMapEntry) -> Color {
    match entry.memory_type {
        MemoryType::Usable => Color::GREEN,
        MemoryType::Reserved | MemoryType::Bad => Color::RED,
        MemoryType::Kernel | MemoryType::Bootloader => Color::YELLOW,
        _ => Color::WHITE,
    }
}

fn memory_map(console: &mut Console<'_>, info: &ParsedBootInfo<'_>) -> fmt::Result {
    let Some(mmap) = info.memory_map() else {
        return console.status(Status::Warn, format_args!("No memory map available!\n"));
    };

    console.status(Status::Info, format_args!("Memory Map:\n"))?;
    writeln!(console, "{REPORT_RULE}")?;
    writeln!(console, "{MEMORY_MAP_COLUMNS}")?;
    writeln!(console, "{REPORT_RULE}")?;

    let (fg, bg) = console.colors();
    for entry in mmap.entries() {
        console.set_color(row_color(&entry), bg);
        writeln!(console, "  {entry}")?;
    }
    console.set_color(fg, bg);
    writeln!(console, "{REPORT_RULE}")
}

/// Clears the screen to white on red and prints the panic message.
///
/// # Errors
/// See the module documentation.
pub fn panic_screen(console: &mut Console<'_>, info: &PanicInfo<'_>) -> fmt::Result {
    console.set_color(Color::WHITE, Color::RED);
    console.clear();

    writeln!(console, "\n\n{BANNER_RULE}")?;
    writeln!(console, "{:^80}", "KERNEL PANIC")?;
    writeln!(console, "{BANNER_RULE}\n")?;

    writeln!(console, "FATAL ERROR: {}", info.message())?;
    if let Some(location) = info.location() {
        writeln!(console, "  at {location}")?;
    }
    writeln!(console)?;

    writeln!(console, "The system has been halted to prevent damage.")?;
    writeln!(console, "Please restart your computer.\n")?;
    writeln!(console, "{BANNER_RULE}")
}
