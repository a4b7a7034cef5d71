//! # Interrupt Control and Halting

use crate::Rflags;

/// Masks maskable hardware interrupts (`cli`).
///
/// # Safety
/// Requires CPL0 (or IOPL 3); otherwise the CPU raises `#GP`.
#[inline]
pub unsafe fn cli() {
    unsafe { core::arch::asm!("cli", options(nomem, nostack)) }
}

/// Unmasks maskable hardware interrupts (`sti`).
///
/// # Safety
/// Requires CPL0 (or IOPL 3). An IDT able to handle every interrupt source
/// that may fire must be loaded.
#[inline]
pub unsafe fn sti() {
    unsafe { core::arch::asm!("sti", options(nomem, nostack)) }
}

/// Stops the CPU until the next interrupt arrives (`hlt`).
///
/// # Safety
/// Requires CPL0. With interrupts masked this only returns on NMI or SMI.
#[inline]
pub unsafe fn hlt() {
    unsafe { core::arch::asm!("hlt", options(nomem, nostack, preserves_flags)) }
}

/// Whether the `IF` flag is currently set.
#[inline]
#[must_use]
pub fn are_enabled() -> bool {
    Rflags::read().interrupt_enable()
}

/// Masks interrupts and halts the CPU for good.
///
/// The loop re-enters `hlt` after NMIs, so control never comes back. Only
/// meaningful in kernel mode; user mode faults on the first instruction.
pub fn halt_forever() -> ! {
    unsafe { cli() };
    loop {
        unsafe { hlt() };
    }
}

/// Masks interrupts for its lifetime and restores the previous state on drop.
///
/// Only re-enables interrupts if they were enabled when the guard was made,
/// so guards nest.
pub struct InterruptGuard {
    were_enabled: bool,
}

impl InterruptGuard {
    /// Snapshots `IF` and masks interrupts if they were enabled.
    ///
    /// # Safety
    /// Same requirements as [`cli`] and [`sti`].
    #[inline]
    #[must_use]
    pub unsafe fn new() -> Self {
        let were_enabled = are_enabled();
        if were_enabled {
            unsafe { cli() };
        }
        Self { were_enabled }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if self.were_enabled {
            unsafe { sti() };
        }
    }
}
