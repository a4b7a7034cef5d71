//! # Kernel Entry Point

#![cfg_attr(target_os = "none", no_std, no_main)]
#![allow(unsafe_code)]

#[cfg(target_os = "none")]
mod entry {
    /// Stack size.
    const BOOT_STACK_SIZE: usize = 64 * 1024;

    /// 16-byte aligned stack
    #[repr(align(16))]
    struct Aligned<const N: usize>([u8; N]);

    #[unsafe(no_mangle)]
    static mut BOOT_STACK: Aligned<BOOT_STACK_SIZE> = Aligned([0; BOOT_STACK_SIZE]);

    /// The kernel entry point.
    ///
    /// # ABI
    /// The bootloader jumps here with interrupts in an unknown state and the
    /// boot info pointer in `RDI` (System V).
    ///
    /// # Naked function & Stack
    /// Naked so that no prologue touches the bootloader's stack. The stub
    /// switches to [`BOOT_STACK`], fakes a call frame and jumps to
    /// [`kernel_entry`], which never returns.
    #[unsafe(no_mangle)]
    #[unsafe(naked)]
    pub extern "sysv64" fn _start(_boot_info: *const u8) -> ! {
        core::arch::naked_asm!(
            "cli",

            // Keep the boot info pointer across the stack switch.
            "mov r12, rdi",

            "lea rax, [rip + {stack_sym}]",
            "add rax, {stack_size}",
            "and rax, -16",
            "mov rsp, rax",
            // Emulate a CALL so that RSP % 16 == 8 at entry.
            "push 0",
            "xor rbp, rbp",

            "mov rdi, r12",
            "jmp {rust_entry}",
            stack_sym = sym BOOT_STACK,
            stack_size = const BOOT_STACK_SIZE,
            rust_entry = sym kernel_entry,
        );
    }

    /// Kernel entry running on the boot stack.
    extern "C" fn kernel_entry(boot_info: *const u8) -> ! {
        // SAFETY: the bootloader contract; see `kernel::kernel_main`.
        unsafe { kernel::kernel_main(boot_info) }
    }

    #[panic_handler]
    fn panic(info: &core::panic::PanicInfo<'_>) -> ! {
        kernel::panic::on_panic(info)
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("the kernel runs on bare metal only; build it for x86_64-unknown-none");
    std::process::exit(1);
}
