//! Framebuffer and animation core for daisy-chained 8x8 LED matrices
//!
//! This crate contains everything between "draw this" and "write these
//! bytes", independent of the chip HAL underneath:
//!
//! - Bitmap transforms (rotate, flip, invert, shift)
//! - Matrix modules with optional mounting-orientation preprocessing
//! - Module layouts with a derived physical chain index
//! - The display driver (register setup, brightness, row-frame updates)
//! - The scrolling text engine
//! - Configuration types

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod bitmap;
pub mod config;
pub mod display;
pub mod error;
pub mod glyph;
pub mod layout;
pub mod module;
pub mod scroll;

pub use bitmap::Bitmap;
pub use config::MatrixConfig;
pub use display::MatrixDisplay;
pub use error::{DisplayError, Error};
pub use glyph::{Font8x8, GlyphSource};
pub use layout::Layout;
pub use module::{Canvas, Module, Preprocess};
pub use scroll::{scroll_text, ScrollOutcome, ScrollRequest, ScrollState, Scroller};

#[cfg(test)]
pub(crate) mod testing;
