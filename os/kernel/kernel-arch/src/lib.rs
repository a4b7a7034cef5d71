//! # x86-64 Architecture Primitives
//!
//! The handful of privileged instructions early boot code needs before any
//! other subsystem exists. Everything here is a thin, inlined wrapper around
//! a single instruction or a short fixed sequence, so the rest of the kernel
//! never has to write inline assembly itself.
//!
//! ## Overview
//!
//! At kernel entry there is no IDT and no allocator. The boot path still has
//! to talk to the QEMU debug console without interrupt handlers cutting into
//! a log line, and it has to stop the CPU for good once something has gone
//! wrong. This crate provides exactly that and nothing more.
//!
//! ## Key Features
//!
//! * **Minimal Surface**: One function per instruction, no hidden state
//! * **Explicit Safety Contracts**: Every privileged operation is `unsafe`
//!   with a documented `# Safety` section
//! * **Typed Flags**: RFLAGS is a bitfield, not a bag of magic masks
//! * **Scoped Masking**: Interrupts are restored when a guard drops
//! * **Host Testable**: Pure bit manipulation is covered by `cargo test`
//!
//! ## Architecture
//!
//! ### Call Sites
//! ```text
//! kernel-qemu logger ──► InterruptGuard ──► cli / sti
//!          │                   └──────────► Rflags::read (IF bit)
//!          └───────────► ports::outb / inb ──► port 0x402
//!
//! kernel entry / panic ──► halt_forever ──► cli, then hlt in a loop
//! ```
//!
//! ## Core Components
//!
//! ### Port I/O ([`ports`])
//! Legacy 16-bit I/O space access:
//! * **`outb`**: Writes one byte (`out dx, al`)
//! * **`inb`**: Reads one byte (`in al, dx`)
//! * **Ordering**: Ordered against other port I/O, not a memory fence
//!
//! ### Interrupt Control ([`interrupts`])
//! Masking interrupts and stopping the CPU:
//! * **`cli` / `sti` / `hlt`**: The raw instructions
//! * **`are_enabled`**: Reads `IF` through [`Rflags`]
//! * **[`InterruptGuard`]**: Masks interrupts for a scope and only
//!   re-enables them if they were enabled before, so guards nest
//! * **[`halt_forever`]**: Masks interrupts and parks the CPU; the terminal
//!   state of every unrecoverable boot path
//!
//! ### Flags Register ([`Rflags`])
//! A `bitfield-struct` view of RFLAGS:
//! * **Named Bits**: Carry, zero, sign, `IF`, IOPL and friends as accessors
//! * **Fixed Bits**: Reserved bits carry their architectural defaults, so
//!   `Rflags::new()` is a valid register image
//! * **Reading**: [`Rflags::read`] uses `pushfq` and is legal at any
//!   privilege level
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kernel_arch::{InterruptGuard, halt_forever};
//! use kernel_arch::ports::outb;
//!
//! // Write a byte to the QEMU debug console without being interrupted.
//! {
//!     let _guard = unsafe { InterruptGuard::new() };
//!     unsafe { outb(0x402, b'!') };
//! }
//!
//! halt_forever();
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod interrupts;
pub mod ports;
mod rflags;

pub use interrupts::{InterruptGuard, halt_forever};
pub use rflags::Rflags;
