//! Display configuration
//!
//! Describes a physical installation: how the chain is wired, where each
//! module sits in the text grid, which modules are mounted upside down, and
//! the startup brightness and scroll speed.
//!
//! With the `toml` feature a configuration can be loaded from text:
//!
//! ```toml
//! brightness = 4
//! columns_per_second = 12
//! layout = [[3, 2, 1, 0]]
//! upside_down = [2]
//!
//! [chain]
//! direction = "descending"
//! test_mode_active = 1
//! ```

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use dotchain_protocol::{ChainConfig, MAX_INTENSITY, SCAN_ALL_ROWS};

use crate::error::Error;
use crate::layout::{Layout, MAX_MODULES, MAX_ROWS};
use crate::module::{Module, Preprocess};

/// Default startup brightness
pub const DEFAULT_BRIGHTNESS: u8 = 8;

/// Default scroll speed
pub const DEFAULT_COLUMNS_PER_SECOND: u16 = 10;

/// Module ids of one declared row, left to right
pub type RowIds = Vec<u16, MAX_MODULES>;

/// Complete display configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatrixConfig {
    /// Chain wiring and protocol parameters
    pub chain: ChainConfig,
    /// Declared rows of module ids
    pub layout: Vec<RowIds, MAX_ROWS>,
    /// Modules mounted rotated by 180 degrees
    pub upside_down: Vec<u16, MAX_MODULES>,
    /// Startup intensity for every module (0-15)
    pub brightness: u8,
    /// Default scroll speed
    pub columns_per_second: u16,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            layout: Vec::new(),
            upside_down: Vec::new(),
            brightness: DEFAULT_BRIGHTNESS,
            columns_per_second: DEFAULT_COLUMNS_PER_SECOND,
        }
    }
}

impl MatrixConfig {
    /// One row of `count` modules with ids `0..count`
    pub fn single_row(count: usize) -> Result<Self, Error> {
        if count > MAX_MODULES {
            return Err(Error::LayoutTooLarge);
        }
        let mut layout = Vec::new();
        let _ = layout.push((0..count as u16).collect());
        Ok(Self {
            layout,
            ..Self::default()
        })
    }

    /// Parse and validate a TOML document
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(input).map_err(|_| Error::ConfigError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and cross references
    pub fn validate(&self) -> Result<(), Error> {
        if self.brightness > MAX_INTENSITY {
            return Err(Error::BrightnessOutOfRange);
        }
        if self.columns_per_second == 0 {
            return Err(Error::InvalidScrollSpeed);
        }
        if self.chain.test_mode_active > 0x01 || self.chain.scan_limit > SCAN_ALL_ROWS {
            return Err(Error::ConfigError);
        }
        for &id in &self.upside_down {
            if !self.layout.iter().any(|row| row.contains(&id)) {
                return Err(Error::UnknownModuleId(id));
            }
        }
        Ok(())
    }

    /// Build the module layout, with upside-down modules rotated on render
    pub fn build_layout(&self) -> Result<Layout, Error> {
        Layout::from_rows(self.layout.iter().map(|row| {
            row.iter().map(|&id| {
                if self.upside_down.contains(&id) {
                    Module::with_preprocess(id, Preprocess::Rotate180)
                } else {
                    Module::new(id)
                }
            })
        }))
    }
}
