//! # Boot Info Region
//!
//! Validator and parser for the tagged binary region a bootloader hands to
//! the kernel at entry. The kernel reads its memory map, framebuffer, command
//! line, ACPI root pointer, processor list and initial ramdisk location from
//! this region before anything else is set up.
//!
//! ## Overview
//!
//! The region is produced by code the kernel does not control and sits in
//! memory the kernel has not yet vetted. This crate therefore treats every
//! byte as hostile. A declared size is only trusted after it has been
//! checked against both the slice and the header's `total_size`, and
//! arithmetic on producer controlled values is overflow-checked. A broken
//! region fails cleanly instead of sending the kernel off into the weeds.
//!
//! ## Key Features
//!
//! * **No Allocation**: Parsed records are views that borrow the region
//! * **No Unsafe Code**: All reads go through bounds-checked little-endian
//!   helpers
//! * **Bounded Walks**: A tag walk always terminates, even on adversarial input
//! * **Forward Compatible**: Unknown and vendor tags are skipped, newer
//!   protocol versions are accepted
//! * **Lenient Records**: A malformed record is dropped on its own without
//!   failing the whole parse
//! * **Host Testable**: Builds as a regular `std` crate under `cargo test`
//!
//! ## Architecture
//!
//! ### Region Layout
//! ```text
//! offset 0   ┌──────────────────────────────┐
//!            │ header (16 bytes)            │ magic, total_size, version, reserved
//! offset 16  ├──────────────────────────────┤
//!            │ tag: type u16, flags u16,    │
//!            │      size u32, payload       │ size counts header + payload
//!            ├──────────────────────────────┤ ◄─ align_up(offset + size, 8)
//!            │ tag ...                      │
//!            ├──────────────────────────────┤
//!            │ End tag (type 0)             │
//! total_size └──────────────────────────────┘
//! ```
//!
//! ### Processing Pipeline
//! ```text
//! raw bytes
//!     ↓
//! validate / BootInfoHeader::read   (magic, version, total_size bounds)
//!     ↓
//! BootRegion                        (slice clipped to total_size)
//!     ↓
//! next_tag / Tags                   (aligned, in-bounds tag positions)
//!     ↓
//! records::*Tag::try_from           (per-kind payload checks)
//!     ↓
//! ParsedBootInfo                    (presence flags, derived totals)
//! ```
//!
//! ## Core Components
//!
//! ### Header Validator ([`validate`], [`BootInfoHeader`])
//! Checks the fixed 16-byte header and nothing else:
//! * **Magic**: Must equal [`BOOT_MAGIC`]
//! * **Version**: At least [`MIN_VERSION`]; newer versions are accepted
//! * **Size**: `total_size` between [`MIN_TOTAL_SIZE`] and [`MAX_TOTAL_SIZE`]
//!   and no larger than the slice
//!
//! ### Tag Cursor ([`BootRegion`], [`next_tag`], [`Tags`])
//! Walks tag positions without interpreting payloads:
//! * **Alignment**: Every position is a multiple of [`TAG_ALIGN`]
//! * **Containment**: Every tag ends inside the declared region
//! * **Progress**: Positions strictly increase, so the walk cannot loop
//! * **Termination**: The walk stops at the End tag or the first bad tag
//!
//! ### Record Views ([`records`])
//! Typed views over individual tag kinds:
//! * **Memory Map**: Entries with base, length and [`records::MemoryType`]
//! * **Framebuffer**: Geometry and [`records::PixelLayout`] of the boot display
//! * **Text**: Command line and bootloader name, NUL terminated
//! * **ACPI, SMP, InitRD**: Root pointer, processor list and ramdisk range
//!
//! Each view rejects undersized or inconsistent payloads with a
//! [`TagRejection`].
//!
//! ### Record Parser ([`parse`], [`try_parse`], [`ParsedBootInfo`])
//! Collects the first valid tag of every kind the kernel consumes:
//! * **Presence Flags**: Set only for tags that passed their checks
//! * **Usable Memory**: Sum of usable entries in mebibytes, saturating
//! * **CPU Count**: Processors from the SMP tag, one when absent
//! * **Fatal Errors**: Missing End tag, missing memory map or too many tags,
//!   reported as [`ParseError`]
//!
//! ### Reports ([`SystemReport`], [`MemoryMapReport`])
//! `Display` adapters that render the parsed record for logs and consoles.
//!
//! ## Feature System
//!
//! ### `builder` Feature (default)
//! When enabled:
//! * [`BootInfoBuilder`] produces well-formed regions tag by tag
//! * Raw and malformed tags can be appended for negative tests
//! * Requires `alloc`
//!
//! When disabled:
//! * The crate is parsing only and allocation free
//! * This is how the kernel depends on it
//!
//! ## Usage
//!
//! ```rust
//! use kernel_bootinfo::{BootRegion, ParseError, TagType, try_parse, validate};
//!
//! // Header followed by nothing but an End tag.
//! let mut region = Vec::new();
//! region.extend_from_slice(&0x4442_4F4Bu32.to_le_bytes()); // magic
//! region.extend_from_slice(&24u32.to_le_bytes()); // total_size
//! region.extend_from_slice(&1u32.to_le_bytes()); // version
//! region.extend_from_slice(&0u32.to_le_bytes()); // reserved
//! region.extend_from_slice(&[0, 0, 0, 0, 8, 0, 0, 0]); // End tag
//!
//! assert!(validate(&region));
//!
//! let walk = BootRegion::new(&region).unwrap();
//! let types: Vec<_> = walk.tags().map(|tag| tag.tag_type()).collect();
//! assert_eq!(types, [TagType::End]);
//!
//! // Well-formed, but the kernel cannot run without a memory map.
//! assert_eq!(try_parse(&region).unwrap_err(), ParseError::MissingMemoryMap);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "builder"))]
extern crate alloc;

// Unit tests build regions with the builder even when it is not exported.
#[cfg(any(test, feature = "builder"))]
#[cfg_attr(not(feature = "builder"), allow(dead_code))]
mod builder;
mod bytes;
mod error;
mod header;
mod limits;
mod parse;
pub mod records;
mod region;
mod report;
mod tag;

#[cfg(feature = "builder")]
pub use builder::BootInfoBuilder;
pub use error::{ParseError, TagRejection};
pub use header::{BootInfoHeader, HEADER_SIZE, HeaderError, MIN_TOTAL_SIZE, validate};
pub use limits::{BOOT_MAGIC, Limits, MAX_TAGS, MAX_TOTAL_SIZE, MIN_VERSION};
pub use parse::{ParsedBootInfo, parse, parse_region, parse_with_limits, try_parse};
pub use region::BootRegion;
pub use report::{MEMORY_MAP_COLUMNS, MemoryMapReport, REPORT_RULE, SystemReport};
pub use tag::{
    RawTag, TAG_ALIGN, TAG_HEADER_SIZE, TagHeader, TagPosition, TagType, Tags, VENDOR_TAG_BASE,
    next_tag,
};
