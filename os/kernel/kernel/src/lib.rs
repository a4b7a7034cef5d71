//! # Kernel
//!
//! Early kernel startup. The entry stub in `main.rs` sets up a stack and
//! calls [`kernel_main`] with the boot info pointer, which then
//!
//! 1. installs the QEMU debug console logger if the device answers
//!    (feature `qemu`),
//! 2. borrows and parses the boot info region ([`boot`]),
//! 3. brings up the framebuffer [`console`] and clears the screen,
//! 4. shows the banner, system information and memory map on the
//!    [`screen`] and in the log, and
//! 5. halts.
//!
//! Any failure along the way is logged and halts the machine; there is no
//! subsystem yet that could recover. Panics end in [`panic::on_panic`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod boot;
pub mod console;
mod once;
pub mod panic;
pub mod screen;

use crate::boot::BootError;
use crate::console::Surface;
use crate::once::BootCell;
use core::panic::PanicInfo;
use kernel_arch::halt_forever;
use log::{LevelFilter, debug, error, info};

/// Most verbose level the kernel logs at.
pub const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// The boot framebuffer, published once the console is up so the panic
/// handler can draw on it.
static SURFACE: BootCell<Surface> = BootCell::new();

/// Rust-side kernel entry.
///
/// # Safety
/// `boot_info` is null or points to a boot info region as described in
/// [`boot::region_from_ptr`], and the framebuffer it announces is
/// identity-mapped and writable.
pub unsafe fn kernel_main(boot_info: *const u8) -> ! {
    #[cfg(feature = "qemu")]
    if kernel_qemu::is_present() && kernel_qemu::QemuLogger::init(LOG_LEVEL).is_err() {
        kernel_qemu::qemu_trace!("logger already installed\n");
    }

    match unsafe { start(boot_info) } {
        Ok(()) => info!("System halted."),
        Err(e) => error!("boot failed: {e}"),
    }
    halt_forever()
}

unsafe fn start(boot_info: *const u8) -> Result<(), BootError> {
    let region = unsafe { boot::region_from_ptr(boot_info)? };
    let info = boot::load(region)?;
    let fb = info.framebuffer().ok_or(BootError::NoFramebuffer)?;

    let surface = Surface::new(fb)?;
    let geometry = surface.geometry();
    debug!(
        "console: {}x{} pixels, {} columns, {} rows",
        geometry.width(),
        geometry.height(),
        geometry.columns(),
        geometry.rows()
    );

    let mut console = unsafe { surface.console() };
    console.clear();
    if SURFACE.set(surface).is_err() {
        error!("framebuffer surface was already published");
    }

    info!("boot info: {} bytes", region.len());
    info!("{}", info.system_report());
    info!("{}", info.memory_map_report());

    if screen::boot_report(&mut console, &info).is_err() {
        error!("failed to draw the boot report");
    }
    info!("[ OK ] Kernel initialization complete!");
    Ok(())
}

/// Draws the panic screen, if a console has been brought up.
fn show_panic(info: &PanicInfo<'_>) {
    if let Some(surface) = SURFACE.get() {
        // SAFETY: the surface was published only after its memory was
        // validated and cleared; nothing else draws once this runs.
        let mut console = unsafe { surface.console() };
        let _ = screen::panic_screen(&mut console, info);
    }
}
