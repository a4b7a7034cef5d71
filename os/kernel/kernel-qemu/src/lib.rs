//! # QEMU Debug Console Output
//!
//! Early-boot diagnostics through QEMU's `isa-debugcon` device, which
//! forwards every byte written to I/O port `0x402` to the host:
//!
//! ```bash
//! qemu-system-x86_64 ... -debugcon stdio
//! qemu-system-x86_64 ... -debugcon file:debug.log
//! ```
//!
//! Two entry points:
//! * [`QemuLogger`], a `log::Log` sink installed once during boot. Records
//!   are written as `[LEVEL] target: message`.
//! * [`qemu_trace!`], raw `format_args!`-style output that bypasses the
//!   logging framework, for use before the logger exists.
//!
//! Nothing allocates. With the `enabled` feature turned off, all output
//! compiles to no-ops and no port I/O is emitted.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::QemuLogger;

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt::{self, Write};
    use kernel_arch::ports::{inb, outb};

    /// Port of QEMU's debug console.
    const QEMU_DEBUG_PORT: u16 = 0x402;

    /// Value the debug console returns on reads (QEMU's default `readback`).
    const QEMU_DEBUG_READBACK: u8 = 0xE9;

    #[allow(clippy::inline_always)]
    #[inline(always)]
    pub fn dbg_putc(c: u8) {
        unsafe { outb(QEMU_DEBUG_PORT, c) }
    }

    /// Whether a debug console answers on the port. Real hardware usually
    /// floats the bus and reads `0xFF`.
    #[must_use]
    pub fn is_present() -> bool {
        unsafe { inb(QEMU_DEBUG_PORT) == QEMU_DEBUG_READBACK }
    }

    /// `core::fmt::Write` adapter over the debug port.
    pub struct QemuSink;

    impl Write for QemuSink {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            s.bytes().for_each(dbg_putc);
            Ok(())
        }
    }

    #[inline]
    pub fn qemu_write(args: fmt::Arguments) {
        // Best effort; the sink itself never fails.
        let _ = fmt::write(&mut QemuSink, args);
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    #[must_use]
    pub const fn is_present() -> bool {
        false
    }

    #[inline]
    pub fn qemu_write(_: fmt::Arguments) {}
}

pub use qemu_fmt::is_present;

/// Writes formatted text straight to the QEMU debug console.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
