//! Chain wiring conventions
//!
//! Boards differ in which end of the chain module 0 sits on, and in which
//! data value the display-test register treats as "test on". Both are
//! configuration, not separate driver types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::register::SCAN_ALL_ROWS;

/// Sort order of the chain index by module id
///
/// With `Descending`, the chain index runs from the highest id down and a
/// row transfer walks it backwards, so module 0's pair is clocked out first
/// and lands on the chip furthest from the controller. `Ascending` is the
/// mirror image: module 0 is the chip nearest the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChainDirection {
    /// Chain index sorted by ascending id
    Ascending,
    /// Chain index sorted by descending id
    #[default]
    Descending,
}

impl ChainDirection {
    /// Whether the highest module id is clocked out first in a transfer
    pub const fn highest_id_first(self) -> bool {
        matches!(self, ChainDirection::Ascending)
    }
}

/// Protocol parameters that vary between chain variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChainConfig {
    /// Chain ordering convention
    pub direction: ChainDirection,
    /// Display-test data value that enables test mode (0x00 or 0x01)
    pub test_mode_active: u8,
    /// Scan-limit register value (0x07 scans all rows)
    pub scan_limit: u8,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            direction: ChainDirection::Descending,
            test_mode_active: 0x01,
            scan_limit: SCAN_ALL_ROWS,
        }
    }
}

impl ChainConfig {
    /// Display-test data value for the requested state
    pub const fn test_mode_value(&self, enabled: bool) -> u8 {
        if enabled {
            self.test_mode_active
        } else {
            // Only bit 0 is significant to the chip
            (self.test_mode_active ^ 0x01) & 0x01
        }
    }
}
