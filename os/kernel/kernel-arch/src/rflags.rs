use bitfield_struct::bitfield;

/// The x86-64 RFLAGS register.
///
/// Bits that are fixed in 64-bit mode are private and carry their
/// architectural default, so [`Rflags::new`] yields a valid image.
#[bitfield(u64, order = Lsb)]
#[derive(PartialEq, Eq)]
pub struct Rflags {
    pub carry: bool, // 0
    #[bits(default = true)]
    _always_one: bool, // 1
    pub parity: bool, // 2
    #[bits(default = false)]
    _reserved3: bool, // 3
    pub adjust: bool, // 4
    #[bits(default = false)]
    _reserved5: bool, // 5
    pub zero: bool, // 6
    pub sign: bool, // 7
    pub trap: bool, // 8
    /// `IF`: maskable hardware interrupts are delivered.
    pub interrupt_enable: bool, // 9
    pub direction: bool, // 10
    pub overflow: bool, // 11
    /// I/O privilege level.
    #[bits(2)]
    pub iopl: u8, // 12-13
    pub nested_task: bool, // 14
    #[bits(default = false)]
    _reserved15: bool, // 15
    pub resume: bool, // 16
    #[bits(default = false)]
    _virtual_8086: bool, // 17
    pub alignment_check: bool, // 18
    pub virtual_interrupt: bool, // 19
    pub virtual_interrupt_pending: bool, // 20
    /// Software can toggle this bit iff `CPUID` is supported.
    pub id: bool, // 21
    #[bits(42, default = 0)]
    _reserved_high: u64,
}

impl Rflags {
    /// Reads the current flags via `pushfq`. Legal at any privilege level.
    #[inline]
    #[must_use]
    pub fn read() -> Self {
        let bits: u64;
        unsafe {
            core::arch::asm!("pushfq; pop {}", out(reg) bits, options(preserves_flags));
        }
        Self::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bit_is_set_by_default() {
        assert_eq!(Rflags::new().into_bits(), 0b10);
        assert_eq!(Rflags::new().with_interrupt_enable(true).into_bits(), 0x202);
    }

    #[test]
    fn iopl_occupies_bits_12_and_13() {
        let flags = Rflags::from_bits(0x3000);
        assert_eq!(flags.iopl(), 3);
        assert!(!flags.interrupt_enable());
    }

    #[test]
    fn user_mode_runs_with_interrupts_enabled() {
        let flags = Rflags::read();
        assert!(flags.interrupt_enable());
        assert_eq!(flags.into_bits() & 0b10, 0b10);
    }
}
