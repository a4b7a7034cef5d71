//! # Protocol constants and parser safety ceilings

/// Magic value in the first four bytes of every boot info region.
pub const BOOT_MAGIC: u32 = 0x4442_4F4B;

/// Oldest protocol version the parser understands.
///
/// Newer versions are accepted; tags they introduce are skipped as unknown.
pub const MIN_VERSION: u32 = 0x0001;

/// Upper bound on the declared region size (16 MiB).
pub const MAX_TOTAL_SIZE: u32 = 16 * 1024 * 1024;

/// Upper bound on the number of tags visited in a single parse.
pub const MAX_TAGS: u32 = 1000;

/// Tunable safety ceilings applied while validating and parsing a region.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Oldest accepted protocol version.
    pub min_version: u32,
    /// Largest accepted `total_size`, in bytes.
    pub max_total_size: u32,
    /// Number of tags after which the parse is abandoned.
    pub max_tags: u32,
}

impl Limits {
    /// The limits used by [`parse`](crate::parse()) and [`validate`](crate::validate).
    pub const DEFAULT: Self = Self {
        min_version: MIN_VERSION,
        max_total_size: MAX_TOTAL_SIZE,
        max_tags: MAX_TAGS,
    };
}

impl Default for Limits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const _: () = {
    assert!(MAX_TAGS > 0);
    assert!(MAX_TOTAL_SIZE.is_multiple_of(8));
};
