//! Single 8x8 matrix module
//!
//! A module pairs the id that fixes its position in the physical chain with
//! a [`Canvas`] holding its pixels. All transforms mutate the canvas in
//! place; the optional preprocessing hook is only applied when the bitmap is
//! rendered for the wire.

use core::ops::{Deref, DerefMut};

use crate::bitmap::{self, Bitmap, BLANK, COLUMNS, FULL, ROWS};
use crate::error::Error;
use crate::glyph::GlyphSource;

/// Transform applied to a module's bitmap right before it is serialized
///
/// Compensates for modules mounted in a different orientation from the rest
/// of the chain.
#[derive(Debug, Clone, Copy, Default)]
pub enum Preprocess {
    /// Send the bitmap as stored
    #[default]
    None,
    /// Reverse row order
    FlipRows,
    /// Reverse bit order within each row
    FlipBits,
    /// Module mounted upside down
    Rotate180,
    /// Caller-supplied transform
    Custom(fn(Bitmap) -> Bitmap),
}

impl Preprocess {
    /// Apply the transform to a copy of `data`
    pub fn apply(&self, data: Bitmap) -> Bitmap {
        match self {
            Preprocess::None => data,
            Preprocess::FlipRows => bitmap::flip_rows(&data),
            Preprocess::FlipBits => bitmap::flip_bits(&data),
            Preprocess::Rotate180 => bitmap::rotate_180(&data),
            Preprocess::Custom(f) => f(data),
        }
    }
}

/// Pixel state of one module: the stored bitmap and its preprocessing hook
///
/// This is what layouts hand out for mutation. Replacing or swapping a
/// canvas never touches the module id or the chain order.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    data: Bitmap,
    preprocess: Preprocess,
}

/// One 8x8 LED matrix with its driver chip
///
/// Bitmap operations come from the module's [`Canvas`].
#[derive(Debug, Clone)]
pub struct Module {
    id: u16,
    canvas: Canvas,
}

impl Module {
    /// Create a blank module
    ///
    /// `id` is the module's position in the physical chain. Ids must be
    /// unique within a layout.
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            canvas: Canvas::new(),
        }
    }

    /// Create a blank module with a preprocessing hook
    pub const fn with_preprocess(id: u16, preprocess: Preprocess) -> Self {
        Self {
            id,
            canvas: Canvas::with_preprocess(preprocess),
        }
    }

    /// Chain id
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Pixel state
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

impl Deref for Module {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        &self.canvas
    }
}

impl DerefMut for Module {
    fn deref_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }
}

impl Canvas {
    /// Blank canvas without preprocessing
    pub const fn new() -> Self {
        Self {
            data: BLANK,
            preprocess: Preprocess::None,
        }
    }

    /// Blank canvas with a preprocessing hook
    pub const fn with_preprocess(preprocess: Preprocess) -> Self {
        Self {
            data: BLANK,
            preprocess,
        }
    }

    /// Preprocessing hook
    pub fn preprocess(&self) -> Preprocess {
        self.preprocess
    }

    /// Replace the preprocessing hook
    pub fn set_preprocess(&mut self, preprocess: Preprocess) {
        self.preprocess = preprocess;
    }

    /// Number of bitmap rows
    pub const fn row_count(&self) -> usize {
        ROWS
    }

    /// Number of bitmap columns
    pub const fn column_count(&self) -> usize {
        COLUMNS
    }

    /// Read one row byte
    pub fn row(&self, index: usize) -> Result<u8, Error> {
        self.data.get(index).copied().ok_or(Error::RowOutOfRange)
    }

    /// Write one row byte
    pub fn set_row(&mut self, index: usize, value: u8) -> Result<(), Error> {
        let row = self.data.get_mut(index).ok_or(Error::RowOutOfRange)?;
        *row = value;
        Ok(())
    }

    /// Read one column as a byte
    ///
    /// Bit `i` of the result is the pixel in row `i`.
    pub fn column(&self, index: usize) -> Result<u8, Error> {
        check_column(index)?;
        Ok(self.read_column(index))
    }

    /// Write one column, leaving the other columns untouched
    pub fn set_column(&mut self, index: usize, value: u8) -> Result<(), Error> {
        check_column(index)?;
        self.write_column(index, value);
        Ok(())
    }

    /// Column read for an index already known to be in range
    pub(crate) fn read_column(&self, index: usize) -> u8 {
        bitmap::rotate_cw(&self.data)[index]
    }

    /// Column write for an index already known to be in range
    pub(crate) fn write_column(&mut self, index: usize, value: u8) {
        let mut rotated = bitmap::rotate_cw(&self.data);
        rotated[index] = value;
        self.data = bitmap::rotate_ccw(&rotated);
    }

    /// Direct access to the stored bitmap
    pub(crate) fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.data
    }

    /// Shift every row byte left by `n` bits, discarding overflow
    pub fn shift_left(&mut self, n: u32) {
        for row in &mut self.data {
            *row = row.checked_shl(n).unwrap_or(0);
        }
    }

    /// Shift every row byte right by `n` bits, discarding overflow
    pub fn shift_right(&mut self, n: u32) {
        for row in &mut self.data {
            *row = row.checked_shr(n).unwrap_or(0);
        }
    }

    /// Move rows towards row 0, filling the bottom with blank rows
    pub fn shift_up(&mut self, n: usize) {
        let n = n.min(ROWS);
        self.data.copy_within(n.., 0);
        self.data[ROWS - n..].fill(0);
    }

    /// Move rows towards row 7, filling the top with blank rows
    pub fn shift_down(&mut self, n: usize) {
        let n = n.min(ROWS);
        self.data.copy_within(..ROWS - n, n);
        self.data[..n].fill(0);
    }

    /// Reverse the order of the rows
    pub fn flip_horizontal(&mut self) {
        self.data = bitmap::flip_rows(&self.data);
    }

    /// Reverse the bit order of every row
    pub fn flip_vertical(&mut self) {
        self.data = bitmap::flip_bits(&self.data);
    }

    /// Complement every pixel
    pub fn invert(&mut self) {
        self.data = bitmap::invert(&self.data);
    }

    /// Light every pixel
    pub fn fill(&mut self) {
        self.data = FULL;
    }

    /// Blank every pixel
    pub fn clear(&mut self) {
        self.data = BLANK;
    }

    /// Replace the bitmap from a byte slice
    pub fn set(&mut self, data: &[u8]) -> Result<(), Error> {
        self.data = data.try_into().map_err(|_| Error::InvalidBitmapLength)?;
        Ok(())
    }

    /// Replace the bitmap
    pub fn set_bitmap(&mut self, data: Bitmap) {
        self.data = data;
    }

    /// Copy of the stored bitmap
    pub fn get(&self) -> Bitmap {
        self.data
    }

    /// Bitmap as it goes on the wire, after preprocessing
    pub fn rendered(&self) -> Bitmap {
        self.preprocess.apply(self.data)
    }

    /// Show a character from the glyph library
    pub fn set_character<G: GlyphSource + ?Sized>(
        &mut self,
        ch: char,
        glyphs: &G,
    ) -> Result<(), Error> {
        self.data = glyphs.glyph(ch)?;
        Ok(())
    }

    /// Show a single decimal digit
    pub fn set_number<G: GlyphSource + ?Sized>(
        &mut self,
        number: u32,
        glyphs: &G,
    ) -> Result<(), Error> {
        let ch = char::from_digit(number, 10).ok_or(Error::NumberOutOfDigitRange)?;
        self.set_character(ch, glyphs)
    }

    /// Copy another canvas's bitmap onto this one, keeping the hook
    pub fn copy_from(&mut self, source: &Canvas) {
        self.data = source.data;
    }
}

fn check_column(index: usize) -> Result<(), Error> {
    if index >= COLUMNS {
        return Err(Error::ColumnOutOfRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Font8x8;

    const SAMPLE: Bitmap = [0x81, 0x42, 0x24, 0x18, 0xF0, 0x0F, 0xAA, 0x55];

    fn sample(id: u16) -> Module {
        let mut module = Module::new(id);
        module.set_bitmap(SAMPLE);
        module
    }

    #[test]
    fn test_row_access() {
        let mut module = sample(0);
        assert_eq!(module.row(4), Ok(0xF0));
        module.set_row(4, 0x11).unwrap();
        assert_eq!(module.row(4), Ok(0x11));
        assert_eq!(module.row(8), Err(Error::RowOutOfRange));
        assert_eq!(module.set_row(8, 0), Err(Error::RowOutOfRange));
    }

    #[test]
    fn test_column_read() {
        let mut module = Module::new(0);
        module.set_bitmap([0x80, 0x80, 0x00, 0x80, 0x00, 0x00, 0x00, 0x81]);
        // Column 0 is bit 7 of each row, bit i from row i
        assert_eq!(module.column(0), Ok(0b1000_1011));
        assert_eq!(module.column(7), Ok(0b1000_0000));
        assert_eq!(module.column(8), Err(Error::ColumnOutOfRange));
    }

    #[test]
    fn test_set_column_preserves_others() {
        for c in 0..COLUMNS {
            let mut module = sample(0);
            let before = module.clone();
            module.set_column(c, 0x5A).unwrap();
            assert_eq!(module.column(c), Ok(0x5A));
            for other in (0..COLUMNS).filter(|&o| o != c) {
                assert_eq!(module.column(other), before.column(other));
            }
        }
        assert_eq!(
            Module::new(0).set_column(8, 0xFF),
            Err(Error::ColumnOutOfRange)
        );
    }

    #[test]
    fn test_horizontal_shifts() {
        let mut module = sample(0);
        module.shift_left(1);
        assert_eq!(module.row(0), Ok(0x02));
        assert_eq!(module.row(4), Ok(0xE0));

        let mut module = sample(0);
        module.shift_right(4);
        assert_eq!(module.row(4), Ok(0x0F));
        assert_eq!(module.row(5), Ok(0x00));
    }

    #[test]
    fn test_shift_past_width_clears() {
        let mut module = sample(0);
        module.shift_left(8);
        assert_eq!(module.get(), BLANK);

        let mut module = sample(0);
        module.shift_right(200);
        assert_eq!(module.get(), BLANK);
    }

    #[test]
    fn test_vertical_shifts() {
        let mut module = sample(0);
        module.shift_up(2);
        assert_eq!(
            module.get(),
            [0x24, 0x18, 0xF0, 0x0F, 0xAA, 0x55, 0x00, 0x00]
        );

        let mut module = sample(0);
        module.shift_down(3);
        assert_eq!(
            module.get(),
            [0x00, 0x00, 0x00, 0x81, 0x42, 0x24, 0x18, 0xF0]
        );

        let mut module = sample(0);
        module.shift_down(9);
        assert_eq!(module.get(), BLANK);
    }

    #[test]
    fn test_flip_naming() {
        // Horizontal reverses row order, vertical reverses bits in a row
        let mut module = sample(0);
        module.flip_horizontal();
        assert_eq!(module.row(0), Ok(0x55));

        let mut module = sample(0);
        module.flip_vertical();
        assert_eq!(module.row(4), Ok(0x0F));
        assert_eq!(module.row(6), Ok(0x55));
    }

    #[test]
    fn test_fill_clear_invert() {
        let mut module = Module::new(0);
        module.fill();
        assert_eq!(module.get(), [0xFF; 8]);
        module.invert();
        assert_eq!(module.get(), [0x00; 8]);
        module.set_bitmap(SAMPLE);
        module.clear();
        assert_eq!(module.get(), [0x00; 8]);
    }

    #[test]
    fn test_bulk_set() {
        let mut module = Module::new(0);
        module.set(&SAMPLE).unwrap();
        assert_eq!(module.get(), SAMPLE);
        assert_eq!(module.set(&[0u8; 7]), Err(Error::InvalidBitmapLength));
        assert_eq!(module.set(&[0u8; 9]), Err(Error::InvalidBitmapLength));
        // Rejected write leaves the bitmap alone
        assert_eq!(module.get(), SAMPLE);
    }

    #[test]
    fn test_preprocess_only_on_render() {
        let mut module = Module::with_preprocess(3, Preprocess::FlipRows);
        module.set_bitmap(SAMPLE);
        assert_eq!(module.get(), SAMPLE);
        assert_eq!(module.rendered()[0], 0x55);
        assert_eq!(module.row(0), Ok(0x81));

        module.set_preprocess(Preprocess::Custom(|b| bitmap::invert(&b)));
        assert_eq!(module.rendered()[0], 0x7E);
    }

    #[test]
    fn test_characters_and_digits() {
        let font = Font8x8;
        let mut module = Module::new(0);
        module.set_character('A', &font).unwrap();
        assert_eq!(module.get(), font.glyph('A').unwrap());

        module.set_number(7, &font).unwrap();
        assert_eq!(module.get(), font.glyph('7').unwrap());
        assert_eq!(
            module.set_number(10, &font),
            Err(Error::NumberOutOfDigitRange)
        );
        assert_eq!(
            module.set_character('\u{263A}', &font),
            Err(Error::UnsupportedCharacter('\u{263A}'))
        );
    }

    #[test]
    fn test_copy_from() {
        let source = sample(1);
        let mut target = Module::with_preprocess(2, Preprocess::Rotate180);
        target.copy_from(&source);
        assert_eq!(target.get(), SAMPLE);
        assert_eq!(target.id(), 2);
        assert!(matches!(target.preprocess(), Preprocess::Rotate180));
    }

    #[test]
    fn test_canvas_replacement_keeps_id() {
        let mut module = sample(4);
        *module = Canvas::with_preprocess(Preprocess::FlipBits);
        assert_eq!(module.id(), 4);
        assert_eq!(module.get(), [0; 8]);
        assert!(matches!(module.canvas().preprocess(), Preprocess::FlipBits));
        assert_eq!(Canvas::default().get(), Canvas::new().get());
    }
}
