//! # Framebuffer Tag
//!
//! ```text
//! 0x00  tag header (type = 3)
//! 0x08  u64  address         physical base of the linear framebuffer
//! 0x10  u32  width           pixels
//! 0x14  u32  height          pixels
//! 0x18  u32  pitch           bytes per scanline
//! 0x1C  u8   bpp             bits per pixel
//! 0x1D  u8   red_shift,      u8 red_size
//! 0x1F  u8   green_shift,    u8 green_size
//! 0x21  u8   blue_shift,     u8 blue_size
//! 0x23  u8   reserved_shift, u8 reserved_size
//! 0x25  u8[3] padding
//! ```

use super::Fields;
use crate::error::TagRejection;
use crate::tag::RawTag;

/// Encoded size of a framebuffer tag, header included.
pub const FRAMEBUFFER_TAG_SIZE: usize = 40;

/// Position and width of one color channel within a pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ColorChannel {
    /// Bit offset of the channel's least significant bit.
    pub shift: u8,
    /// Width of the channel in bits.
    pub size: u8,
}

impl ColorChannel {
    #[must_use]
    pub const fn new(shift: u8, size: u8) -> Self {
        Self { shift, size }
    }

    /// Scales an 8-bit intensity to this channel and moves it into place.
    #[must_use]
    pub fn encode(self, value: u8) -> u32 {
        if self.size == 0 || self.size > 32 || self.shift >= 32 {
            return 0;
        }
        let value = u32::from(value);
        let scaled = if self.size >= 8 {
            value << (self.size - 8)
        } else {
            value >> (8 - self.size)
        };
        scaled << self.shift
    }
}

/// Bit layout of a pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PixelLayout {
    pub red: ColorChannel,
    pub green: ColorChannel,
    pub blue: ColorChannel,
    pub reserved: ColorChannel,
}

impl PixelLayout {
    /// 32-bit pixels stored as B, G, R, X in memory (the common GOP format).
    pub const BGRX_8888: Self = Self {
        red: ColorChannel::new(16, 8),
        green: ColorChannel::new(8, 8),
        blue: ColorChannel::new(0, 8),
        reserved: ColorChannel::new(24, 8),
    };

    /// 32-bit pixels stored as R, G, B, X in memory.
    pub const RGBX_8888: Self = Self {
        red: ColorChannel::new(0, 8),
        green: ColorChannel::new(8, 8),
        blue: ColorChannel::new(16, 8),
        reserved: ColorChannel::new(24, 8),
    };

    /// Packs an RGB triple into a pixel value.
    #[must_use]
    pub fn encode(&self, r: u8, g: u8, b: u8) -> u32 {
        self.red.encode(r) | self.green.encode(g) | self.blue.encode(b)
    }
}

/// Validated view of a framebuffer tag.
///
/// `address`, `width`, `height` and `bpp` are non-zero.
#[derive(Debug, Copy, Clone)]
pub struct FramebufferTag<'a> {
    raw: RawTag<'a>,
    address: u64,
    width: u32,
    height: u32,
    pitch: u32,
    bpp: u8,
    layout: PixelLayout,
}

impl<'a> TryFrom<RawTag<'a>> for FramebufferTag<'a> {
    type Error = TagRejection;

    fn try_from(raw: RawTag<'a>) -> Result<Self, Self::Error> {
        let fields = Fields::new(&raw, FRAMEBUFFER_TAG_SIZE)?;
        let channel = |off: usize| -> Result<ColorChannel, TagRejection> {
            Ok(ColorChannel::new(fields.u8(off)?, fields.u8(off + 1)?))
        };

        let address = fields.u64(8)?;
        let width = fields.u32(16)?;
        let height = fields.u32(20)?;
        let pitch = fields.u32(24)?;
        let bpp = fields.u8(28)?;
        let layout = PixelLayout {
            red: channel(29)?,
            green: channel(31)?,
            blue: channel(33)?,
            reserved: channel(35)?,
        };

        if width == 0 {
            return Err(TagRejection::Zero("framebuffer width"));
        }
        if height == 0 {
            return Err(TagRejection::Zero("framebuffer height"));
        }
        if bpp == 0 {
            return Err(TagRejection::Zero("framebuffer bpp"));
        }
        if address == 0 {
            return Err(TagRejection::Zero("framebuffer address"));
        }

        Ok(Self {
            raw,
            address,
            width,
            height,
            pitch,
            bpp,
            layout,
        })
    }
}

impl<'a> FramebufferTag<'a> {
    #[must_use]
    pub const fn raw(&self) -> &RawTag<'a> {
        &self.raw
    }

    /// Physical base address of the linear framebuffer.
    #[must_use]
    pub const fn address(&self) -> u64 {
        self.address
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per scanline; may exceed `width * bytes_per_pixel`.
    #[must_use]
    pub const fn pitch(&self) -> u32 {
        self.pitch
    }

    #[must_use]
    pub const fn bpp(&self) -> u8 {
        self.bpp
    }

    #[must_use]
    pub fn bytes_per_pixel(&self) -> u32 {
        u32::from(self.bpp).div_ceil(8)
    }

    #[must_use]
    pub const fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Size of the visible framebuffer in bytes (`pitch * height`).
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        u64::from(self.pitch) * u64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BootInfoBuilder;
    use crate::region::BootRegion;
    use crate::tag::TagType;

    fn decode(blob: &[u8]) -> Result<FramebufferTag<'_>, TagRejection> {
        let region = BootRegion::new(blob).unwrap();
        FramebufferTag::try_from(region.tags().next().unwrap())
    }

    #[test]
    fn decodes_all_fields() {
        let blob = BootInfoBuilder::new()
            .framebuffer_with_layout(0xfd00_0000, 1024, 768, 4096, 32, PixelLayout::RGBX_8888)
            .build();
        let fb = decode(&blob).unwrap();
        assert_eq!(fb.address(), 0xfd00_0000);
        assert_eq!((fb.width(), fb.height(), fb.pitch(), fb.bpp()), (1024, 768, 4096, 32));
        assert_eq!(fb.layout(), PixelLayout::RGBX_8888);
        assert_eq!(fb.bytes_per_pixel(), 4);
        assert_eq!(fb.size_bytes(), 4096 * 768);
    }

    #[test]
    fn zero_fields_are_rejected() {
        let cases = [
            (0xfd00_0000, 0, 768, 32, "framebuffer width"),
            (0xfd00_0000, 1024, 0, 32, "framebuffer height"),
            (0xfd00_0000, 1024, 768, 0, "framebuffer bpp"),
            (0, 1024, 768, 32, "framebuffer address"),
        ];
        for (address, width, height, bpp, field) in cases {
            let blob = BootInfoBuilder::new()
                .framebuffer(address, width, height, 4096, bpp)
                .build();
            assert_eq!(decode(&blob).unwrap_err(), TagRejection::Zero(field));
        }
    }

    #[test]
    fn short_tag_is_rejected() {
        let blob = BootInfoBuilder::new()
            .raw_tag(TagType::Framebuffer.into(), 0, &[0xff; 24])
            .build();
        assert_eq!(
            decode(&blob).unwrap_err(),
            TagRejection::TooSmall { size: 32, min: 40 }
        );
    }

    #[test]
    fn pixel_encoding_follows_layout() {
        assert_eq!(PixelLayout::BGRX_8888.encode(0x11, 0x22, 0x33), 0x0011_2233);
        assert_eq!(PixelLayout::RGBX_8888.encode(0x11, 0x22, 0x33), 0x0033_2211);

        let rgb565 = PixelLayout {
            red: ColorChannel::new(11, 5),
            green: ColorChannel::new(5, 6),
            blue: ColorChannel::new(0, 5),
            reserved: ColorChannel::default(),
        };
        assert_eq!(rgb565.encode(0xff, 0xff, 0xff), 0xffff);
        assert_eq!(rgb565.encode(0xff, 0, 0), 0xf800);
    }
}
