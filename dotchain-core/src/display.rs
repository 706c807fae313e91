//! Display driver for a chain of matrix modules
//!
//! [`MatrixDisplay`] owns the bus, the glyph library and the module layout.
//! Drawing calls only change the in-memory framebuffer; nothing reaches the
//! chips until [`update_screen`](MatrixDisplay::update_screen) sends the
//! eight row frames.
//!
//! # Wire order
//!
//! Chain order is the layout's modules sorted by id in the configured
//! [`ChainDirection`]. Row frames walk chain order backwards, so with the
//! default `Descending` direction module 0's pair is clocked out first and
//! ends up on the chip furthest from the controller.

use core::fmt::Write as _;

use heapless::{String, Vec};

use dotchain_hal::ChainBus;
use dotchain_protocol::{
    shutdown, ChainConfig, ChainDirection, Register, RegisterWrite, RowFrame, DECODE_NONE,
    ROW_COUNT,
};

use crate::bitmap::Bitmap;
use crate::config::MatrixConfig;
use crate::error::{DisplayError, Error};
use crate::glyph::{Font8x8, GlyphSource};
use crate::layout::{Layout, MAX_MODULES};
use crate::module::{Canvas, Module};

/// Driver for one chain of MAX7219 matrix modules
pub struct MatrixDisplay<B, G = Font8x8> {
    bus: B,
    glyphs: G,
    layout: Layout,
    chain: ChainConfig,
}

impl<B: ChainBus> MatrixDisplay<B, Font8x8> {
    /// Single row of `modules` modules with ids `0..modules`, built-in font
    pub fn single_row(bus: B, modules: usize, chain: ChainConfig) -> Result<Self, Error> {
        Ok(Self::new(bus, Layout::single_row(modules)?, Font8x8, chain))
    }
}

impl<B: ChainBus, G: GlyphSource> MatrixDisplay<B, G> {
    /// Create a driver over an existing layout
    pub fn new(bus: B, layout: Layout, glyphs: G, chain: ChainConfig) -> Self {
        Self {
            bus,
            glyphs,
            layout,
            chain,
        }
    }

    /// Create a driver from a validated configuration
    pub fn from_config(bus: B, config: &MatrixConfig, glyphs: G) -> Result<Self, Error> {
        config.validate()?;
        let layout = config.build_layout()?;
        Ok(Self::new(bus, layout, glyphs, config.chain))
    }

    /// Put every chip into raw bitmap mode and show a blank screen
    pub fn init(&mut self) -> Result<(), DisplayError<B::Error>> {
        debug!(
            "display init: {=usize} modules, scan limit {=u8}",
            self.layout.module_count(),
            self.chain.scan_limit
        );
        self.broadcast(RegisterWrite::new(Register::DecodeMode, DECODE_NONE))?;
        self.broadcast(RegisterWrite::new(Register::ScanLimit, self.chain.scan_limit))?;
        self.turn_on()?;
        self.test_mode(false)?;
        self.clear_display();
        self.update_screen()
    }

    /// Send the framebuffer to the chain, one transfer per bitmap row
    pub fn update_screen(&mut self) -> Result<(), DisplayError<B::Error>> {
        let wire = self.wire_order();
        trace!("update screen: {=usize} modules", wire.len());

        for row in 0..ROW_COUNT {
            let frame = RowFrame::compose(row, wire.iter().map(|bitmap| bitmap[row]))?;
            self.send(frame.as_bytes())?;
        }
        Ok(())
    }

    /// Pass one transfer straight through to the bus
    pub fn send_raw(&mut self, data: &[u8]) -> Result<(), DisplayError<B::Error>> {
        self.send(data)
    }

    /// Write one intensity value per entry, `0x00..=0x0F`
    ///
    /// Each value is its own two-byte transfer. The whole slice is validated
    /// before anything is written.
    pub fn set_brightness(&mut self, values: &[u8]) -> Result<(), DisplayError<B::Error>> {
        if values.len() > self.layout.module_count() {
            return Err(Error::TooManyBrightnessValues.into());
        }

        let mut writes: Vec<RegisterWrite, MAX_MODULES> = Vec::new();
        for &value in values {
            // Length checked against the module count above
            let _ = writes.push(RegisterWrite::intensity(value)?);
        }

        debug!("set brightness on {=usize} modules", writes.len());
        for write in writes {
            self.send(&write.to_bytes())?;
        }
        Ok(())
    }

    /// Write the same intensity to every module in one transfer
    pub fn set_brightness_all(&mut self, value: u8) -> Result<(), DisplayError<B::Error>> {
        let write = RegisterWrite::intensity(value)?;
        debug!("set brightness {=u8} on all modules", value);
        self.broadcast(write)
    }

    /// Leave shutdown mode on every module
    pub fn turn_on(&mut self) -> Result<(), DisplayError<B::Error>> {
        debug!("display on");
        self.broadcast(RegisterWrite::new(Register::Shutdown, shutdown::ON))
    }

    /// Enter shutdown mode on every module; the framebuffer is kept
    pub fn turn_off(&mut self) -> Result<(), DisplayError<B::Error>> {
        debug!("display off");
        self.broadcast(RegisterWrite::new(Register::Shutdown, shutdown::OFF))
    }

    /// Light every LED regardless of the framebuffer, or return to normal
    pub fn test_mode(&mut self, enabled: bool) -> Result<(), DisplayError<B::Error>> {
        let value = self.chain.test_mode_value(enabled);
        debug!("test mode {=bool} (data {=u8})", enabled, value);
        self.broadcast(RegisterWrite::new(Register::DisplayTest, value))
    }

    /// Invert every module
    pub fn invert_screen(&mut self) {
        self.layout.invert();
    }

    /// Shift the whole framebuffer up one pixel
    pub fn shift_screen_up(&mut self) {
        self.layout.shift_up();
    }

    /// Shift the whole framebuffer down one pixel
    pub fn shift_screen_down(&mut self) {
        self.layout.shift_down();
    }

    /// Shift every declared row one column left
    pub fn shift_screen_left(&mut self) {
        self.layout.shift_left();
    }

    /// Shift every declared row one column right
    pub fn shift_screen_right(&mut self) {
        self.layout.shift_right();
    }

    /// Blank every module
    pub fn clear_display(&mut self) {
        self.layout.clear();
    }

    /// Light every module
    pub fn fill_display(&mut self) {
        self.layout.fill();
    }

    /// Copy `source`'s bitmap onto the module with id `target`
    ///
    /// `source` may belong to another display. For a module of this
    /// display use [`copy_module_within`](Self::copy_module_within).
    pub fn copy_module(&mut self, source: &Canvas, target: u16) -> Result<(), Error> {
        self.layout.module_mut(target)?.copy_from(source);
        Ok(())
    }

    /// Copy the bitmap of module `source` onto module `target`
    ///
    /// Both ids are checked before anything changes. The target keeps its
    /// own preprocessing hook.
    pub fn copy_module_within(&mut self, source: u16, target: u16) -> Result<(), Error> {
        let data = self.layout.module(source)?.get();
        self.layout.module_mut(target)?.set_bitmap(data);
        Ok(())
    }

    /// Show each module's own id on itself
    ///
    /// Fails without changing anything if any id is above 9.
    pub fn identify(&mut self) -> Result<(), Error> {
        let mut glyphs: Vec<Bitmap, MAX_MODULES> = Vec::new();
        for module in self.layout.modules() {
            let digit = char::from_digit(u32::from(module.id()), 10)
                .ok_or(Error::NumberOutOfDigitRange)?;
            let _ = glyphs.push(self.glyphs.glyph(digit)?);
        }

        for (canvas, glyph) in self.layout.modules_mut().zip(glyphs) {
            canvas.set_bitmap(glyph);
        }
        Ok(())
    }

    /// Render `text` onto declared row `row`, one character per module
    pub fn set_text(&mut self, text: &str, row: usize) -> Result<(), Error> {
        self.layout.set_text(text, row, &self.glyphs)
    }

    /// Render the decimal digits of `number` onto declared row `row`
    pub fn set_number(&mut self, number: u32, row: usize) -> Result<(), Error> {
        let mut digits: String<10> = String::new();
        write!(digits, "{}", number).map_err(|_| Error::TextTooLongForRow)?;
        self.set_text(&digits, row)
    }

    /// Show one character on the module with id `module`
    pub fn set_character(&mut self, module: u16, ch: char) -> Result<(), Error> {
        let glyph = self.glyphs.glyph(ch)?;
        self.layout.module_mut(module)?.set_bitmap(glyph);
        Ok(())
    }

    /// Show a single digit `0..=9` on the module with id `module`
    pub fn set_module_number(&mut self, module: u16, number: u32) -> Result<(), Error> {
        let ch = char::from_digit(number, 10).ok_or(Error::NumberOutOfDigitRange)?;
        self.set_character(module, ch)
    }

    /// Visit every module's id and canvas in chain order
    pub fn for_each_module<F: FnMut(u16, &mut Canvas)>(&mut self, mut f: F) {
        let mut ids: Vec<u16, MAX_MODULES> = self.layout.chain().map(Module::id).collect();
        if self.chain.direction == ChainDirection::Descending {
            ids.reverse();
        }
        for id in ids {
            if let Ok(canvas) = self.layout.module_mut(id) {
                f(id, canvas);
            }
        }
    }

    /// Module layout
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Mutable module layout
    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    /// Glyph library
    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    /// Chain protocol parameters
    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain
    }

    /// Underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Rendered bitmaps in the order they are clocked out
    fn wire_order(&self) -> Vec<Bitmap, MAX_MODULES> {
        let mut wire: Vec<Bitmap, MAX_MODULES> =
            self.layout.chain().map(|m| m.rendered()).collect();
        if self.chain.direction.highest_id_first() {
            wire.reverse();
        }
        wire
    }

    fn broadcast(&mut self, write: RegisterWrite) -> Result<(), DisplayError<B::Error>> {
        let frame = RowFrame::broadcast(write, self.layout.module_count())?;
        self.send(frame.as_bytes())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), DisplayError<B::Error>> {
        self.bus.write(data).map_err(DisplayError::Transport)
    }
}
