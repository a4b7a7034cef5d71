//! # Panic Handling

use core::panic::PanicInfo;
use kernel_arch::halt_forever;
use kernel_arch::interrupts::cli;
use log::error;

/// Terminal path for every kernel panic: mask interrupts, log the message,
/// show it on a red panic screen if a console exists, halt.
pub fn on_panic(info: &PanicInfo<'_>) -> ! {
    unsafe { cli() };

    match info.location() {
        Some(location) => error!("KERNEL PANIC at {location}: {}", info.message()),
        None => error!("KERNEL PANIC: {}", info.message()),
    }
    error!("The system has been halted.");

    crate::show_panic(info);
    halt_forever()
}
