//! Dotchain Hardware Abstraction Layer
//!
//! This crate defines the transport seam between the matrix framebuffer and
//! whatever actually clocks bytes into the first chip of the chain. Chip HALs
//! implement `embedded-hal` traits; the adapters here turn those into a
//! [`ChainBus`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  dotchain-core (display, scroll)        │
//! └─────────────────────────────────────────┘
//!                     │ ChainBus::write
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dotchain-hal (this crate - adapters)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  SpiDevice    │       │ SpiBus + LOAD │
//! │  (CS managed) │       │  output pin   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`spi::ChainBus`] - Blocking byte-sequence writer, one call per latched transfer
//!
//! [`SPI_MODE`] and [`MAX_SPI_FREQUENCY_HZ`] are the settings to configure the
//! chip HAL's SPI peripheral with.

#![no_std]
#![deny(unsafe_code)]

pub mod spi;

// Re-export key types at crate root for convenience
pub use spi::{ChainBus, LoadPinBus, LoadPinError, SpiDeviceBus, MAX_SPI_FREQUENCY_HZ, SPI_MODE};
