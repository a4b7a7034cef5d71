//! # Framebuffer Console
//!
//! A text console on the linear framebuffer described by the boot info.
//! Pixel values are packed with the channel layout the bootloader reported,
//! so the same code serves RGB, BGR and 16-bit modes.
//!
//! [`Surface`] is a plain description of the framebuffer that can be stored
//! globally; [`Console`] borrows the pixel memory and draws into it.
//!
//! ## Text output
//! The screen is a grid of 8x16 character cells (see [`font`]). [`Console`]
//! keeps a cursor and a foreground/background color pair and implements
//! [`core::fmt::Write`], so `write!` and `writeln!` work directly:
//!
//! * `\n` moves to the start of the next line, `\r` to the start of the
//!   current one, `\t` to the next multiple of [`TAB_WIDTH`] columns.
//! * Text wraps at the right edge; writing past the last line scrolls the
//!   screen up by one line.
//! * Characters outside printable ASCII are drawn as `?`.
//!
//! [`Console::status`] prints lines prefixed with a colored `[INFO]`,
//! `[ OK ]` or `[WARN]` label.

pub mod font;

use self::font::{GLYPH_HEIGHT, GLYPH_WIDTH};
use core::fmt;
use kernel_bootinfo::records::{FramebufferTag, PixelLayout};

/// Columns a tab advances to a multiple of.
pub const TAB_WIDTH: usize = 4;

/// An RGB color with 8 bits per channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    pub const RED: Self = Self::new(0xff, 0x00, 0x00);
    pub const GREEN: Self = Self::new(0x00, 0xff, 0x00);
    pub const YELLOW: Self = Self::new(0xff, 0xff, 0x00);
    pub const CYAN: Self = Self::new(0x00, 0xff, 0xff);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Severity prefix of a console status line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Info,
    Ok,
    Warn,
}

impl Status {
    const fn label(self) -> &'static str {
        match self {
            Self::Info => "[INFO] ",
            Self::Ok => "[ OK ] ",
            Self::Warn => "[WARN] ",
        }
    }

    const fn color(self) -> Color {
        match self {
            Self::Info => Color::WHITE,
            Self::Ok => Color::GREEN,
            Self::Warn => Color::YELLOW,
        }
    }
}

/// Reason a framebuffer cannot back a console.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("unsupported color depth of {0} bits per pixel")]
    UnsupportedDepth(u8),
    #[error("framebuffer of {width}x{height} pixels has no visible area")]
    NoPixels { width: u32, height: u32 },
    #[error("pitch of {pitch} bytes is shorter than a {row_bytes}-byte row")]
    PitchTooSmall { pitch: u32, row_bytes: usize },
    #[error("framebuffer dimensions overflow the address space")]
    TooLarge,
    #[error("framebuffer address {0:#x} is not addressable")]
    AddressOutOfRange(u64),
    #[error("pixel buffer of {len} bytes is smaller than the {needed} bytes required")]
    BufferTooSmall { len: usize, needed: usize },
}

/// Validated framebuffer dimensions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Geometry {
    width: usize,
    height: usize,
    pitch: usize,
    bytes_per_pixel: usize,
    layout: PixelLayout,
}

impl Geometry {
    /// Checks the mode for something the console can draw on: 16, 24 or 32
    /// bits per pixel, at least one pixel, and rows that fit into the pitch.
    ///
    /// # Errors
    /// The first check that failed.
    pub fn new(
        width: u32,
        height: u32,
        pitch: u32,
        bpp: u8,
        layout: PixelLayout,
    ) -> Result<Self, ConsoleError> {
        let bytes_per_pixel = match bpp {
            16 => 2,
            24 => 3,
            32 => 4,
            _ => return Err(ConsoleError::UnsupportedDepth(bpp)),
        };
        if width == 0 || height == 0 {
            return Err(ConsoleError::NoPixels { width, height });
        }

        let width_px = usize::try_from(width).map_err(|_| ConsoleError::TooLarge)?;
        let height_px = usize::try_from(height).map_err(|_| ConsoleError::TooLarge)?;
        let pitch_len = usize::try_from(pitch).map_err(|_| ConsoleError::TooLarge)?;

        let row_bytes = width_px
            .checked_mul(bytes_per_pixel)
            .ok_or(ConsoleError::TooLarge)?;
        if pitch_len < row_bytes {
            return Err(ConsoleError::PitchTooSmall { pitch, row_bytes });
        }
        pitch_len
            .checked_mul(height_px)
            .ok_or(ConsoleError::TooLarge)?;

        Ok(Self {
            width: width_px,
            height: height_px,
            pitch: pitch_len,
            bytes_per_pixel,
            layout,
        })
    }

    /// # Errors
    /// See [`Geometry::new`].
    pub fn from_tag(fb: &FramebufferTag<'_>) -> Result<Self, ConsoleError> {
        Self::new(fb.width(), fb.height(), fb.pitch(), fb.bpp(), fb.layout())
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Bytes of pixel memory covered, `pitch * height`.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pitch * self.height
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Character cells per line.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.width / GLYPH_WIDTH
    }

    /// Text lines on the screen.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.height / GLYPH_HEIGHT
    }

    /// The encoded bytes of one pixel, in memory order.
    fn pixel(&self, color: Color) -> ([u8; 4], usize) {
        let value = self.layout.encode(color.r, color.g, color.b);
        (value.to_le_bytes(), self.bytes_per_pixel)
    }
}

/// Location and geometry of the boot framebuffer.
///
/// Holds the address as an integer so it can live in a `static`; only
/// [`Surface::console`] turns it back into memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Surface {
    address: usize,
    geometry: Geometry,
}

impl Surface {
    /// # Errors
    /// The framebuffer mode is unsupported or its address does not fit a
    /// pointer.
    pub fn new(fb: &FramebufferTag<'_>) -> Result<Self, ConsoleError> {
        let geometry = Geometry::from_tag(fb)?;
        let address = usize::try_from(fb.address())
            .map_err(|_| ConsoleError::AddressOutOfRange(fb.address()))?;
        address
            .checked_add(geometry.len())
            .ok_or(ConsoleError::AddressOutOfRange(fb.address()))?;
        Ok(Self { address, geometry })
    }

    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Borrows the pixel memory as a console with the cursor at the top
    /// left, white on black.
    ///
    /// # Safety
    /// The framebuffer must be identity-mapped and writable for
    /// `geometry().len()` bytes, and no other live console may alias it.
    #[must_use]
    pub unsafe fn console(&self) -> Console<'static> {
        let pixels = unsafe {
            core::slice::from_raw_parts_mut(
                core::ptr::with_exposed_provenance_mut::<u8>(self.address),
                self.geometry.len(),
            )
        };
        Console::with_pixels(pixels, self.geometry)
    }
}

/// Draws into a borrowed pixel buffer.
#[derive(Debug)]
pub struct Console<'fb> {
    pixels: &'fb mut [u8],
    geometry: Geometry,
    column: usize,
    line: usize,
    fg: Color,
    bg: Color,
}

impl<'fb> Console<'fb> {
    /// # Errors
    /// [`ConsoleError::BufferTooSmall`] if `pixels` does not cover the
    /// geometry.
    pub const fn new(pixels: &'fb mut [u8], geometry: Geometry) -> Result<Self, ConsoleError> {
        if pixels.len() < geometry.len() {
            return Err(ConsoleError::BufferTooSmall {
                len: pixels.len(),
                needed: geometry.len(),
            });
        }
        Ok(Self::with_pixels(pixels, geometry))
    }

    const fn with_pixels(pixels: &'fb mut [u8], geometry: Geometry) -> Self {
        Self {
            pixels,
            geometry,
            column: 0,
            line: 0,
            fg: Color::WHITE,
            bg: Color::BLACK,
        }
    }

    /// Colors used for the text drawn from now on.
    pub const fn set_color(&mut self, fg: Color, bg: Color) {
        self.fg = fg;
        self.bg = bg;
    }

    /// The current `(foreground, background)` pair.
    #[must_use]
    pub const fn colors(&self) -> (Color, Color) {
        (self.fg, self.bg)
    }

    /// The cursor as `(column, line)`.
    #[must_use]
    pub const fn cursor(&self) -> (usize, usize) {
        (self.column, self.line)
    }

    /// Paints every visible pixel. Bytes between the end of a row and the
    /// pitch are left alone; the cursor does not move.
    pub fn fill(&mut self, color: Color) {
        self.fill_scanlines(0, self.geometry.height, color);
    }

    /// Paints the screen in the background color and homes the cursor.
    pub fn clear(&mut self) {
        self.fill(self.bg);
        self.column = 0;
        self.line = 0;
    }

    /// Sets one pixel; coordinates outside the screen are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.geometry.width || y >= self.geometry.height {
            return;
        }
        let (pixel, bpp) = self.geometry.pixel(color);
        let at = y * self.geometry.pitch + x * bpp;
        if let Some(dst) = self.pixels.get_mut(at..at + bpp) {
            dst.copy_from_slice(&pixel[..bpp]);
        }
    }

    /// Draws one character at the cursor and advances it. Does nothing on a
    /// screen smaller than one character cell.
    pub fn put_char(&mut self, c: char) {
        let columns = self.geometry.columns();
        if columns == 0 || self.geometry.rows() == 0 {
            return;
        }

        match c {
            '\n' => self.newline(),
            '\r' => self.column = 0,
            '\t' => {
                let next = (self.column / TAB_WIDTH + 1) * TAB_WIDTH;
                if next >= columns {
                    self.newline();
                } else {
                    self.column = next;
                }
            }
            _ => {
                if self.column >= columns {
                    self.newline();
                }
                self.draw_glyph(c);
                self.column += 1;
            }
        }
    }

    /// Moves the cursor to the start of the next line, scrolling at the
    /// bottom of the screen.
    pub fn newline(&mut self) {
        let rows = self.geometry.rows();
        if rows == 0 {
            return;
        }
        self.column = 0;
        if self.line + 1 < rows {
            self.line += 1;
        } else {
            self.scroll();
        }
    }

    /// Writes `args` behind the colored label of `status`, then restores the
    /// previous colors.
    ///
    /// # Errors
    /// Only if formatting `args` fails.
    pub fn status(&mut self, status: Status, args: fmt::Arguments<'_>) -> fmt::Result {
        let (fg, bg) = self.colors();
        self.set_color(status.color(), bg);
        let result = fmt::Write::write_str(self, status.label())
            .and_then(|()| fmt::Write::write_fmt(self, args));
        self.set_color(fg, bg);
        result
    }

    fn draw_glyph(&mut self, c: char) {
        let x0 = self.column * GLYPH_WIDTH;
        let y0 = self.line * GLYPH_HEIGHT;
        for y in 0..GLYPH_HEIGHT {
            for x in 0..GLYPH_WIDTH {
                let color = if font::is_set(c, x, y) { self.fg } else { self.bg };
                self.put_pixel(x0 + x, y0 + y, color);
            }
        }
    }

    /// Moves every text line up by one and blanks the last one.
    fn scroll(&mut self) {
        let rows = self.geometry.rows();
        let line_bytes = self.geometry.pitch * GLYPH_HEIGHT;
        self.pixels.copy_within(line_bytes..rows * line_bytes, 0);
        let last = (rows - 1) * GLYPH_HEIGHT;
        self.fill_scanlines(last, last + GLYPH_HEIGHT, self.bg);
    }

    fn fill_scanlines(&mut self, from: usize, to: usize, color: Color) {
        let (pixel, bpp) = self.geometry.pixel(color);
        let pixel = &pixel[..bpp];
        let row_bytes = self.geometry.width * bpp;
        let pitch = self.geometry.pitch;
        for row in self
            .pixels
            .chunks_mut(pitch)
            .take(to.min(self.geometry.height))
            .skip(from)
        {
            for dst in row[..row_bytes].chunks_exact_mut(bpp) {
                dst.copy_from_slice(pixel);
            }
        }
    }
}

impl fmt::Write for Console<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.chars().for_each(|c| self.put_char(c));
        Ok(())
    }
}
