//! MAX7219 register map
//!
//! Register addresses and data values are bit-exact; the chip ignores any
//! address not listed here except the no-op register.

/// Rows per module (digit registers 1-8)
pub const ROW_COUNT: usize = 8;

/// Highest accepted intensity value
pub const MAX_INTENSITY: u8 = 0x0F;

/// Register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// No-op, passes data through to the next chip
    NoOp = 0x00,
    /// Decode mode (0x00 = raw bitmap, no BCD decode)
    DecodeMode = 0x09,
    /// LED intensity (0x00-0x0F)
    Intensity = 0x0A,
    /// Number of scanned rows minus one
    ScanLimit = 0x0B,
    /// Shutdown (0x00 = off, 0x01 = normal operation)
    Shutdown = 0x0C,
    /// Display test (all LEDs on)
    DisplayTest = 0x0F,
}

impl Register {
    /// Address byte for this register
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Digit register address for a bitmap row (row 0 is register 0x01)
    pub fn row(index: usize) -> Result<u8, ProtocolError> {
        if index >= ROW_COUNT {
            return Err(ProtocolError::RowOutOfRange);
        }
        Ok(index as u8 + 1)
    }
}

/// Shutdown register data
pub mod shutdown {
    /// Shutdown mode, LEDs off, bitmap retained
    pub const OFF: u8 = 0x00;
    /// Normal operation
    pub const ON: u8 = 0x01;
}

/// Scan limit value with all eight rows active
pub const SCAN_ALL_ROWS: u8 = 0x07;

/// Decode mode value for raw bitmap rows
pub const DECODE_NONE: u8 = 0x00;

/// Protocol-level validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Row index outside 0-7
    RowOutOfRange,
    /// Intensity above 0x0F
    IntensityOutOfRange,
    /// Chain longer than a frame can hold
    ChainTooLong,
}

/// A single register write addressed to one chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterWrite {
    /// Register address byte
    pub addr: u8,
    /// Data byte
    pub data: u8,
}

impl RegisterWrite {
    /// Create a write to a named register
    pub const fn new(register: Register, data: u8) -> Self {
        Self {
            addr: register.addr(),
            data,
        }
    }

    /// Create a write of bitmap data to a row register
    pub fn row(index: usize, data: u8) -> Result<Self, ProtocolError> {
        Ok(Self {
            addr: Register::row(index)?,
            data,
        })
    }

    /// Create an intensity write, rejecting values above 0x0F
    pub fn intensity(value: u8) -> Result<Self, ProtocolError> {
        if value > MAX_INTENSITY {
            return Err(ProtocolError::IntensityOutOfRange);
        }
        Ok(Self::new(Register::Intensity, value))
    }

    /// Wire bytes in transmission order
    pub const fn to_bytes(self) -> [u8; 2] {
        [self.addr, self.data]
    }
}
