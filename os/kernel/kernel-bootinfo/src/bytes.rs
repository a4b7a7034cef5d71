//! Little-endian field accessors and overflow-checked arithmetic over
//! untrusted byte slices.
//!
//! Every read is range-checked against the slice before any byte is touched;
//! an out-of-range read yields `None` instead of panicking. Nothing here
//! reinterprets memory as a typed record, so neither alignment nor the host's
//! endianness matters.

#[inline]
fn read_array<const N: usize>(buf: &[u8], off: usize) -> Option<[u8; N]> {
    let end = off.checked_add(N)?;
    buf.get(off..end)?.try_into().ok()
}

#[inline]
pub(crate) fn read_u8(buf: &[u8], off: usize) -> Option<u8> {
    buf.get(off).copied()
}

#[inline]
pub(crate) fn read_u16_le(buf: &[u8], off: usize) -> Option<u16> {
    read_array(buf, off).map(u16::from_le_bytes)
}

#[inline]
pub(crate) fn read_u32_le(buf: &[u8], off: usize) -> Option<u32> {
    read_array(buf, off).map(u32::from_le_bytes)
}

#[inline]
pub(crate) fn read_u64_le(buf: &[u8], off: usize) -> Option<u64> {
    read_array(buf, off).map(u64::from_le_bytes)
}

/// Rounds `value` up to the next multiple of `align` (a power of two).
///
/// Returns `None` if the rounded value does not fit into a `u32`.
#[inline]
pub(crate) const fn align_up(value: u32, align: u32) -> Option<u32> {
    debug_assert!(align.is_power_of_two());
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Adds `value` to `total`, keeping `total` unchanged if the sum would overflow.
#[inline]
pub(crate) const fn add_or_keep(total: u64, value: u64) -> u64 {
    match total.checked_add(value) {
        Some(sum) => sum,
        None => total,
    }
}

/// Converts a `u32` length taken from the input into a slice index.
#[inline]
pub(crate) fn to_usize(value: u32) -> Option<usize> {
    usize::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(read_u8(&buf, 7), Some(0x08));
        assert_eq!(read_u16_le(&buf, 0), Some(0x0201));
        assert_eq!(read_u32_le(&buf, 4), Some(0x0807_0605));
        assert_eq!(read_u64_le(&buf, 0), Some(0x0807_0605_0403_0201));
    }

    #[test]
    fn reads_past_the_end_fail() {
        let buf = [0u8; 8];
        assert_eq!(read_u8(&buf, 8), None);
        assert_eq!(read_u32_le(&buf, 5), None);
        assert_eq!(read_u64_le(&buf, 1), None);
        assert_eq!(read_u16_le(&buf, usize::MAX), None);
    }

    #[test]
    fn align_up_rounds_and_detects_overflow() {
        assert_eq!(align_up(0, 8), Some(0));
        assert_eq!(align_up(1, 8), Some(8));
        assert_eq!(align_up(8, 8), Some(8));
        assert_eq!(align_up(41, 8), Some(48));
        assert_eq!(align_up(u32::MAX - 7, 8), Some(u32::MAX - 7));
        assert_eq!(align_up(u32::MAX - 6, 8), None);
        assert_eq!(align_up(u32::MAX, 8), None);
    }

    #[test]
    fn add_or_keep_saturates_by_keeping() {
        assert_eq!(add_or_keep(1, 2), 3);
        assert_eq!(add_or_keep(u64::MAX - 1, 1), u64::MAX);
        assert_eq!(add_or_keep(u64::MAX - 1, 2), u64::MAX - 1);
    }
}
