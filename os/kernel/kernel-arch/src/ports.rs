//! # x86 I/O Port Access
//!
//! Thin wrappers around `in`/`out` for devices in the legacy 16-bit I/O port
//! space. Memory-mapped devices must not be driven through these.

/// Writes one byte to an I/O port (`out dx, al`).
///
/// # Safety
/// - **Privilege:** Execute at CPL0 or with I/O permission (IOPL or the TSS
///   I/O bitmap) for `port`; otherwise the CPU raises `#GP`.
/// - **Correct port:** `port` must belong to the intended device and accept
///   this write in its current state. A wrong port or value can wedge the
///   device or the machine.
/// - **Concurrency:** Multi-step register protocols must be serialized
///   against interrupt handlers and other CPUs touching the same device.
/// - **Ordering:** `out` is ordered against other port I/O but is not a
///   memory fence.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    unsafe {
        core::arch::asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
    }
}

/// Reads one byte from an I/O port (`in al, dx`).
///
/// # Safety
/// Same requirements as [`outb`]. In addition, reading a status or data
/// register may have side effects on the device (e.g. acknowledging data).
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    unsafe {
        core::arch::asm!("in al, dx", in("dx") port, out("al") value, options(nomem, nostack, preserves_flags));
    }
    value
}
