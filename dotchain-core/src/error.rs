//! Error types
//!
//! Validation failures are raised before any bus write for the failing call.
//! Transport failures are passed through untouched.

use core::fmt;

use dotchain_protocol::ProtocolError;

/// Validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Two modules in one layout share an id
    DuplicateModuleId(u16),
    /// Bitmap row or layout row outside the valid range
    RowOutOfRange,
    /// Bitmap column outside 0-7
    ColumnOutOfRange,
    /// Text has more characters than the row has modules
    TextTooLongForRow,
    /// Brightness value above 0x0F
    BrightnessOutOfRange,
    /// More brightness values than modules in the chain
    TooManyBrightnessValues,
    /// Single-digit display asked to show something outside 0-9
    NumberOutOfDigitRange,
    /// Character not present in the glyph library
    UnsupportedCharacter(char),
    /// Bulk bitmap write with a length other than 8
    InvalidBitmapLength,
    /// Layout exceeds the fixed module or row capacity
    LayoutTooLarge,
    /// No module with this id in the layout
    UnknownModuleId(u16),
    /// Scroll speed of zero columns per second
    InvalidScrollSpeed,
    /// Configuration could not be parsed or is inconsistent
    ConfigError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateModuleId(id) => write!(f, "duplicate module id {}", id),
            Error::RowOutOfRange => f.write_str("row out of range"),
            Error::ColumnOutOfRange => f.write_str("column must be in range 0-7"),
            Error::TextTooLongForRow => f.write_str("text is too long for the given row"),
            Error::BrightnessOutOfRange => f.write_str("maximum allowed brightness is 0x0F"),
            Error::TooManyBrightnessValues => {
                f.write_str("more brightness values than configured modules")
            }
            Error::NumberOutOfDigitRange => f.write_str("number is out of valid range 0-9"),
            Error::UnsupportedCharacter(ch) => write!(f, "unsupported character {:?}", ch),
            Error::InvalidBitmapLength => f.write_str("bitmap must be exactly 8 bytes"),
            Error::LayoutTooLarge => f.write_str("layout exceeds module capacity"),
            Error::UnknownModuleId(id) => write!(f, "no module with id {}", id),
            Error::InvalidScrollSpeed => f.write_str("scroll speed must be at least 1 column/s"),
            Error::ConfigError => f.write_str("invalid configuration"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::RowOutOfRange => Error::RowOutOfRange,
            ProtocolError::IntensityOutOfRange => Error::BrightnessOutOfRange,
            ProtocolError::ChainTooLong => Error::LayoutTooLarge,
        }
    }
}

/// Errors from operations that write to the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// Input rejected before anything was written
    Invalid(Error),
    /// Transport failed mid-transmission
    Transport(E),
}

impl<E> From<Error> for DisplayError<E> {
    fn from(err: Error) -> Self {
        DisplayError::Invalid(err)
    }
}

impl<E> From<ProtocolError> for DisplayError<E> {
    fn from(err: ProtocolError) -> Self {
        DisplayError::Invalid(err.into())
    }
}

impl<E: fmt::Debug> fmt::Display for DisplayError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Invalid(err) => write!(f, "{}", err),
            DisplayError::Transport(err) => write!(f, "transport error: {:?}", err),
        }
    }
}
