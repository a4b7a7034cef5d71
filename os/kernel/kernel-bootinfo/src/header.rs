//! # Boot Info Header
//!
//! The fixed 16-byte record at offset zero of every region:
//!
//! ```text
//! 0x00  u32  magic        BOOT_MAGIC
//! 0x04  u32  total_size   bytes in the region, header and tags included
//! 0x08  u32  version      protocol version, >= MIN_VERSION
//! 0x0C  u32  reserved     must be zero
//! ```

use crate::bytes::{read_u32_le, to_usize};
use crate::limits::{BOOT_MAGIC, Limits};
use crate::tag::TAG_HEADER_SIZE;

/// Size of the encoded header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Smallest meaningful region: the header followed by an End tag.
#[allow(clippy::cast_possible_truncation)]
pub const MIN_TOTAL_SIZE: u32 = (HEADER_SIZE + TAG_HEADER_SIZE) as u32;

/// Decoded copy of the region header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BootInfoHeader {
    pub magic: u32,
    pub total_size: u32,
    pub version: u32,
    pub reserved: u32,
}

/// Reason a region header was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("region is shorter than the 16-byte header")]
    TooShort,
    #[error("bad magic {0:#010x}")]
    BadMagic(u32),
    #[error("declared total size {0} is out of range")]
    BadTotalSize(u32),
    #[error("protocol version {0} is older than supported")]
    UnsupportedVersion(u32),
    #[error("reserved header field is {0:#x}, expected zero")]
    ReservedNotZero(u32),
    #[error("header declares {total_size} bytes but only {available} are readable")]
    Truncated { total_size: u32, available: usize },
}

impl BootInfoHeader {
    /// Reads and validates the header at the start of `bytes` using [`Limits::DEFAULT`].
    ///
    /// # Errors
    /// See [`BootInfoHeader::read_with_limits`].
    pub fn read(bytes: &[u8]) -> Result<Self, HeaderError> {
        Self::read_with_limits(bytes, &Limits::DEFAULT)
    }

    /// Reads and validates the header at the start of `bytes`.
    ///
    /// Checks run in order and stop at the first failure: the header is
    /// readable, the magic matches, the total size lies within
    /// `[MIN_TOTAL_SIZE, limits.max_total_size]`, the version is not older
    /// than `limits.min_version` and the reserved field is zero. Finally the
    /// slice must actually hold `total_size` bytes.
    ///
    /// # Errors
    /// The first [`HeaderError`] encountered.
    pub fn read_with_limits(bytes: &[u8], limits: &Limits) -> Result<Self, HeaderError> {
        let field = |off| read_u32_le(bytes, off).ok_or(HeaderError::TooShort);

        let magic = field(0)?;
        let total_size = field(4)?;
        let version = field(8)?;
        let reserved = field(12)?;

        if magic != BOOT_MAGIC {
            return Err(HeaderError::BadMagic(magic));
        }

        if total_size < MIN_TOTAL_SIZE || total_size > limits.max_total_size {
            return Err(HeaderError::BadTotalSize(total_size));
        }

        if version < limits.min_version {
            return Err(HeaderError::UnsupportedVersion(version));
        }

        if reserved != 0 {
            return Err(HeaderError::ReservedNotZero(reserved));
        }

        let declared = to_usize(total_size).ok_or(HeaderError::BadTotalSize(total_size))?;
        if declared > bytes.len() {
            return Err(HeaderError::Truncated {
                total_size,
                available: bytes.len(),
            });
        }

        Ok(Self {
            magic,
            total_size,
            version,
            reserved,
        })
    }

    /// Total region size as a slice length.
    #[must_use]
    pub fn total_len(&self) -> usize {
        // `read_with_limits` already proved the conversion.
        to_usize(self.total_size).unwrap_or(HEADER_SIZE)
    }
}

/// Returns `true` if `bytes` starts with a valid header.
///
/// Has no side effects and logs nothing; a `false` result is meant to be
/// treated as an unrecoverable boot condition by the caller.
#[must_use]
pub fn validate(bytes: &[u8]) -> bool {
    BootInfoHeader::read(bytes).is_ok()
}
