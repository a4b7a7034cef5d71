//! # Boot Info Handoff
//!
//! Turns the pointer the bootloader passes at entry into a bounded byte
//! slice and runs it through validation and parsing.

use crate::console::ConsoleError;
use kernel_bootinfo::{
    HEADER_SIZE, MAX_TOTAL_SIZE, MIN_TOTAL_SIZE, ParseError, ParsedBootInfo, try_parse,
};
use log::debug;

/// Reason the kernel cannot continue booting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    #[error("bootloader passed a null boot info pointer")]
    NullPointer,
    #[error("boot info rejected: {0}")]
    Parse(#[from] ParseError),
    #[error("boot info has no usable framebuffer")]
    NoFramebuffer,
    #[error("cannot drive the framebuffer: {0}")]
    Console(#[from] ConsoleError),
}

/// How many bytes to borrow for a region starting with `header`.
///
/// The declared total size when it is in range; otherwise only the header,
/// which then fails validation with the precise reason.
#[must_use]
pub fn claimed_len(header: &[u8]) -> usize {
    let declared = header
        .get(4..8)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes);
    match declared {
        Some(size) if (MIN_TOTAL_SIZE..=MAX_TOTAL_SIZE).contains(&size) => {
            usize::try_from(size).unwrap_or(HEADER_SIZE)
        }
        _ => HEADER_SIZE,
    }
}

/// Borrows the boot info region at `ptr`, sized by its own header.
///
/// # Safety
/// A non-null `ptr` must be readable for [`HEADER_SIZE`] bytes and, if the
/// header declares an in-range total size, for that many bytes, for the
/// whole of `'a`. The memory must not be written during `'a`.
///
/// # Errors
/// [`BootError::NullPointer`] for a null `ptr`.
pub unsafe fn region_from_ptr<'a>(ptr: *const u8) -> Result<&'a [u8], BootError> {
    if ptr.is_null() {
        return Err(BootError::NullPointer);
    }
    let header = unsafe { core::slice::from_raw_parts(ptr, HEADER_SIZE) };
    let len = claimed_len(header);
    Ok(unsafe { core::slice::from_raw_parts(ptr, len) })
}

/// Validates and parses `region`, then requires a framebuffer: without a
/// display the kernel has nowhere to report to.
///
/// # Errors
/// The first fatal problem found.
pub fn load(region: &[u8]) -> Result<ParsedBootInfo<'_>, BootError> {
    let info = try_parse(region)?;
    debug!(
        "boot info: {} bytes, {} MiB usable, {} CPUs",
        region.len(),
        info.total_usable_memory_mb(),
        info.cpu_count()
    );
    if !info.has_framebuffer() {
        return Err(BootError::NoFramebuffer);
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_bootinfo::records::{MemoryMapEntry, MemoryType};
    use kernel_bootinfo::{BootInfoBuilder, HeaderError};

    fn with_memory() -> BootInfoBuilder {
        BootInfoBuilder::new().memory_map(&[MemoryMapEntry::new(0, 256 << 20, MemoryType::Usable)])
    }

    #[test]
    fn null_pointer_is_rejected() {
        assert_eq!(
            unsafe { region_from_ptr(core::ptr::null()) },
            Err(BootError::NullPointer)
        );
    }

    #[test]
    fn region_is_sized_by_its_header() {
        let mut blob = with_memory().build();
        let len = blob.len();
        blob.extend_from_slice(&[0xee; 32]);
        let region = unsafe { region_from_ptr(blob.as_ptr()) }.unwrap();
        assert_eq!(region.len(), len);
    }

    #[test]
    fn out_of_range_size_borrows_only_the_header() {
        let blob = BootInfoBuilder::new().total_size(MAX_TOTAL_SIZE + 1).build();
        assert_eq!(claimed_len(&blob), HEADER_SIZE);
        let region = unsafe { region_from_ptr(blob.as_ptr()) }.unwrap();
        assert_eq!(
            load(region).unwrap_err(),
            BootError::Parse(ParseError::Header(HeaderError::BadTotalSize(MAX_TOTAL_SIZE + 1)))
        );
    }

    #[test]
    fn framebuffer_is_required() {
        let blob = with_memory().build();
        assert_eq!(load(&blob).unwrap_err(), BootError::NoFramebuffer);

        let blob = with_memory().framebuffer(0xfd00_0000, 640, 480, 2560, 32).build();
        let info = load(&blob).unwrap();
        assert_eq!(info.total_usable_memory_mb(), 256);
    }

    #[test]
    fn parse_failures_are_fatal() {
        let blob = BootInfoBuilder::new()
            .framebuffer(0xfd00_0000, 640, 480, 2560, 32)
            .build();
        assert_eq!(
            load(&blob).unwrap_err(),
            BootError::Parse(ParseError::MissingMemoryMap)
        );
    }
}
