use crate::header::HeaderError;

/// Fatal reason a region could not be parsed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid boot info header: {0}")]
    Header(#[from] HeaderError),
    #[error("more than {0} tags in boot info region")]
    TooManyTags(u32),
    #[error("tag list ended without an end tag")]
    MissingEndTag,
    #[error("no valid memory map tag")]
    MissingMemoryMap,
}

/// Reason a single tag was skipped. Never fatal on its own.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagRejection {
    #[error("tag of {size} bytes is smaller than the {min} bytes required")]
    TooSmall { size: u32, min: usize },
    #[error("memory map entry size {0} is smaller than an entry")]
    EntrySizeTooSmall(u32),
    #[error("{count} memory map entries of {entry_size} bytes do not fit the tag")]
    EntriesOutOfBounds { entry_size: u32, count: u32 },
    #[error("{0} must not be zero")]
    Zero(&'static str),
    #[error("text is not NUL-terminated within the tag")]
    Unterminated,
}
