//! SPI transport abstractions
//!
//! A MAX7219 chain is a long shift register: every byte written pushes the
//! previous bytes one position further down the chain, and a rising edge on
//! LOAD (chip select) latches whatever each chip holds at that moment. One
//! [`ChainBus::write`] call is therefore one latched transfer.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Mode, SpiBus, SpiDevice, MODE_0};

/// SPI mode for MAX7219-class chips (data sampled on the rising clock edge)
pub const SPI_MODE: Mode = MODE_0;

/// Fastest serial clock the chips accept
pub const MAX_SPI_FREQUENCY_HZ: u32 = 10_000_000;

/// Blocking writer for a daisy-chained device string
///
/// Implementations must issue `data` as a single latched transfer: select
/// the chain, clock out every byte in order, then release the select line.
/// Writes are serialized in the order they are issued.
pub trait ChainBus {
    /// Error type for transport failures
    type Error;

    /// Write one complete transfer
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: ChainBus + ?Sized> ChainBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(data)
    }
}

/// [`ChainBus`] over an `embedded-hal` SPI device
///
/// The device owns chip select, so each write is already framed as one
/// transaction.
#[derive(Debug)]
pub struct SpiDeviceBus<D> {
    device: D,
}

impl<D> SpiDeviceBus<D> {
    /// Wrap an SPI device
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Release the wrapped device
    pub fn release(self) -> D {
        self.device
    }
}

impl<D: SpiDevice> ChainBus for SpiDeviceBus<D> {
    type Error = D::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.device.write(data)
    }
}

/// Errors from a [`LoadPinBus`] transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadPinError<S, P> {
    /// SPI bus error
    Spi(S),
    /// LOAD pin could not be driven
    Pin(P),
}

/// [`ChainBus`] over a raw SPI bus plus a dedicated LOAD pin
///
/// LOAD is held low while bytes are clocked and driven high after the bus is
/// flushed, which latches the shift registers of every chip in the chain.
#[derive(Debug)]
pub struct LoadPinBus<S, P> {
    spi: S,
    load: P,
}

impl<S, P> LoadPinBus<S, P> {
    /// Create a new bus from an SPI peripheral and the LOAD pin
    pub fn new(spi: S, load: P) -> Self {
        Self { spi, load }
    }

    /// Release the SPI peripheral and LOAD pin
    pub fn release(self) -> (S, P) {
        (self.spi, self.load)
    }
}

impl<S: SpiBus, P: OutputPin> ChainBus for LoadPinBus<S, P> {
    type Error = LoadPinError<S::Error, P::Error>;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.load.set_low().map_err(LoadPinError::Pin)?;
        self.spi.write(data).map_err(LoadPinError::Spi)?;
        self.spi.flush().map_err(LoadPinError::Spi)?;
        // Rising edge latches the chain
        self.load.set_high().map_err(LoadPinError::Pin)
    }
}
