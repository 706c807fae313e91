//! Character glyph libraries
//!
//! A glyph library maps a character to an 8-byte bitmap. Displays take the
//! library as a type parameter, so custom fonts plug in without touching the
//! driver.

use crate::bitmap::Bitmap;
use crate::error::Error;

/// Character to bitmap lookup
pub trait GlyphSource {
    /// Bitmap for `ch`, or [`Error::UnsupportedCharacter`]
    fn glyph(&self, ch: char) -> Result<Bitmap, Error>;
}

impl<T: GlyphSource + ?Sized> GlyphSource for &T {
    fn glyph(&self, ch: char) -> Result<Bitmap, Error> {
        (**self).glyph(ch)
    }
}

/// Built-in 5x7 font in an 8x8 cell
///
/// Covers space, digits, upper-case letters and `! + - . / : = ? _`.
/// Lower-case letters render as their upper-case glyph.
#[derive(Debug, Clone, Copy, Default)]
pub struct Font8x8;

impl GlyphSource for Font8x8 {
    fn glyph(&self, ch: char) -> Result<Bitmap, Error> {
        lookup(ch.to_ascii_uppercase()).ok_or(Error::UnsupportedCharacter(ch))
    }
}

#[rustfmt::skip]
fn lookup(ch: char) -> Option<Bitmap> {
    let glyph = match ch {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '!' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x00, 0x10, 0x00],
        '+' => [0x00, 0x10, 0x10, 0x7C, 0x10, 0x10, 0x00, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x7C, 0x00, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x30, 0x30, 0x00],
        '/' => [0x00, 0x04, 0x08, 0x10, 0x20, 0x40, 0x00, 0x00],
        '0' => [0x38, 0x44, 0x4C, 0x54, 0x64, 0x44, 0x38, 0x00],
        '1' => [0x10, 0x30, 0x10, 0x10, 0x10, 0x10, 0x38, 0x00],
        '2' => [0x38, 0x44, 0x04, 0x08, 0x10, 0x20, 0x7C, 0x00],
        '3' => [0x7C, 0x08, 0x10, 0x08, 0x04, 0x44, 0x38, 0x00],
        '4' => [0x08, 0x18, 0x28, 0x48, 0x7C, 0x08, 0x08, 0x00],
        '5' => [0x7C, 0x40, 0x78, 0x04, 0x04, 0x44, 0x38, 0x00],
        '6' => [0x18, 0x20, 0x40, 0x78, 0x44, 0x44, 0x38, 0x00],
        '7' => [0x7C, 0x04, 0x08, 0x10, 0x20, 0x20, 0x20, 0x00],
        '8' => [0x38, 0x44, 0x44, 0x38, 0x44, 0x44, 0x38, 0x00],
        '9' => [0x38, 0x44, 0x44, 0x3C, 0x04, 0x08, 0x30, 0x00],
        ':' => [0x00, 0x30, 0x30, 0x00, 0x30, 0x30, 0x00, 0x00],
        '=' => [0x00, 0x00, 0x7C, 0x00, 0x7C, 0x00, 0x00, 0x00],
        '?' => [0x38, 0x44, 0x04, 0x08, 0x10, 0x00, 0x10, 0x00],
        'A' => [0x38, 0x44, 0x44, 0x44, 0x7C, 0x44, 0x44, 0x00],
        'B' => [0x78, 0x44, 0x44, 0x78, 0x44, 0x44, 0x78, 0x00],
        'C' => [0x38, 0x44, 0x40, 0x40, 0x40, 0x44, 0x38, 0x00],
        'D' => [0x70, 0x48, 0x44, 0x44, 0x44, 0x48, 0x70, 0x00],
        'E' => [0x7C, 0x40, 0x40, 0x78, 0x40, 0x40, 0x7C, 0x00],
        'F' => [0x7C, 0x40, 0x40, 0x78, 0x40, 0x40, 0x40, 0x00],
        'G' => [0x38, 0x44, 0x40, 0x5C, 0x44, 0x44, 0x3C, 0x00],
        'H' => [0x44, 0x44, 0x44, 0x7C, 0x44, 0x44, 0x44, 0x00],
        'I' => [0x38, 0x10, 0x10, 0x10, 0x10, 0x10, 0x38, 0x00],
        'J' => [0x1C, 0x08, 0x08, 0x08, 0x08, 0x48, 0x30, 0x00],
        'K' => [0x44, 0x48, 0x50, 0x60, 0x50, 0x48, 0x44, 0x00],
        'L' => [0x40, 0x40, 0x40, 0x40, 0x40, 0x40, 0x7C, 0x00],
        'M' => [0x44, 0x6C, 0x54, 0x54, 0x44, 0x44, 0x44, 0x00],
        'N' => [0x44, 0x44, 0x64, 0x54, 0x4C, 0x44, 0x44, 0x00],
        'O' => [0x38, 0x44, 0x44, 0x44, 0x44, 0x44, 0x38, 0x00],
        'P' => [0x78, 0x44, 0x44, 0x78, 0x40, 0x40, 0x40, 0x00],
        'Q' => [0x38, 0x44, 0x44, 0x44, 0x54, 0x48, 0x34, 0x00],
        'R' => [0x78, 0x44, 0x44, 0x78, 0x50, 0x48, 0x44, 0x00],
        'S' => [0x3C, 0x40, 0x40, 0x38, 0x04, 0x04, 0x78, 0x00],
        'T' => [0x7C, 0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x00],
        'U' => [0x44, 0x44, 0x44, 0x44, 0x44, 0x44, 0x38, 0x00],
        'V' => [0x44, 0x44, 0x44, 0x44, 0x44, 0x28, 0x10, 0x00],
        'W' => [0x44, 0x44, 0x44, 0x54, 0x54, 0x54, 0x28, 0x00],
        'X' => [0x44, 0x44, 0x28, 0x10, 0x28, 0x44, 0x44, 0x00],
        'Y' => [0x44, 0x44, 0x44, 0x28, 0x10, 0x10, 0x10, 0x00],
        'Z' => [0x7C, 0x04, 0x08, 0x10, 0x20, 0x40, 0x7C, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7C, 0x00],
        _ => return None,
    };
    Some(glyph)
}
