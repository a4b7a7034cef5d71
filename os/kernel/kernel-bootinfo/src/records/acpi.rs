//! # ACPI RSDP Tag
//!
//! ```text
//! 0x00  tag header (type = 5)
//! 0x08  u64  rsdp_address
//! ```

use super::Fields;
use crate::error::TagRejection;
use crate::tag::RawTag;

/// Encoded size of an ACPI RSDP tag, header included.
pub const ACPI_RSDP_TAG_SIZE: usize = 16;

/// Validated view of an ACPI RSDP tag; the address is non-zero.
#[derive(Debug, Copy, Clone)]
pub struct AcpiRsdpTag<'a> {
    raw: RawTag<'a>,
    rsdp_address: u64,
}

impl<'a> TryFrom<RawTag<'a>> for AcpiRsdpTag<'a> {
    type Error = TagRejection;

    fn try_from(raw: RawTag<'a>) -> Result<Self, Self::Error> {
        let rsdp_address = Fields::new(&raw, ACPI_RSDP_TAG_SIZE)?.u64(8)?;
        if rsdp_address == 0 {
            return Err(TagRejection::Zero("RSDP address"));
        }
        Ok(Self { raw, rsdp_address })
    }
}

impl<'a> AcpiRsdpTag<'a> {
    #[must_use]
    pub const fn raw(&self) -> &RawTag<'a> {
        &self.raw
    }

    /// Physical address of the RSDP/XSDP structure.
    #[must_use]
    pub const fn rsdp_address(&self) -> u64 {
        self.rsdp_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BootInfoBuilder;
    use crate::region::BootRegion;
    use crate::tag::TagType;

    fn decode(blob: &[u8]) -> Result<AcpiRsdpTag<'_>, TagRejection> {
        let region = BootRegion::new(blob).unwrap();
        AcpiRsdpTag::try_from(region.tags().next().unwrap())
    }

    #[test]
    fn decodes_the_rsdp_address() {
        let blob = BootInfoBuilder::new().acpi_rsdp(0xe_0000).build();
        let acpi = decode(&blob).unwrap();
        assert_eq!(acpi.rsdp_address(), 0xe_0000);
        assert_eq!(acpi.raw().size(), 16);
    }

    #[test]
    fn undersized_tag_is_rejected() {
        let blob = BootInfoBuilder::new()
            .raw_tag(TagType::AcpiRsdp.into(), 0, &[0x14, 0xe0, 0x0e, 0, 0, 0, 0])
            .build();
        assert_eq!(
            decode(&blob).unwrap_err(),
            TagRejection::TooSmall { size: 15, min: 16 }
        );
    }

    #[test]
    fn null_address_is_rejected() {
        let blob = BootInfoBuilder::new().acpi_rsdp(0).build();
        assert_eq!(decode(&blob).unwrap_err(), TagRejection::Zero("RSDP address"));
    }
}
