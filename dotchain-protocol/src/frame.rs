//! Row frame composition
//!
//! A full screen update is eight transfers, one per bitmap row. Each transfer
//! carries one `(row register, row bitmap)` pair per module:
//!
//! ```text
//! ┌─────────┬─────────┬─────────┬─────────┬─────┐
//! │ ROW+1   │ BITMAP  │ ROW+1   │ BITMAP  │ ... │
//! │ (far)   │ (far)   │         │         │     │
//! └─────────┴─────────┴─────────┴─────────┴─────┘
//! ```
//!
//! Pairs must be supplied in wire order: the first pair ends up on the chip
//! furthest from the controller.

use heapless::Vec;

use crate::register::{ProtocolError, RegisterWrite};

/// Longest chain a single frame can address
pub const MAX_CHAIN_LEN: usize = 64;

/// Maximum frame size in bytes (two per module)
pub const MAX_FRAME_SIZE: usize = MAX_CHAIN_LEN * 2;

/// One latched transfer covering every module in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFrame {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
}

impl RowFrame {
    /// Compose the transfer for bitmap row `row`
    ///
    /// `data` yields each module's byte for that row in wire order.
    pub fn compose<I>(row: usize, data: I) -> Result<Self, ProtocolError>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut bytes = Vec::new();
        for value in data {
            let write = RegisterWrite::row(row, value)?;
            bytes
                .extend_from_slice(&write.to_bytes())
                .map_err(|_| ProtocolError::ChainTooLong)?;
        }
        Ok(Self { bytes })
    }

    /// Compose a transfer that writes the same register to every module
    pub fn broadcast(write: RegisterWrite, modules: usize) -> Result<Self, ProtocolError> {
        if modules > MAX_CHAIN_LEN {
            return Err(ProtocolError::ChainTooLong);
        }
        let mut bytes = Vec::new();
        for _ in 0..modules {
            // Capacity checked above
            let _ = bytes.extend_from_slice(&write.to_bytes());
        }
        Ok(Self { bytes })
    }

    /// Raw bytes to hand to the bus
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of modules addressed by this frame
    pub fn modules(&self) -> usize {
        self.bytes.len() / 2
    }

    /// Iterate the register writes in wire order
    pub fn writes(&self) -> impl Iterator<Item = RegisterWrite> + '_ {
        self.bytes.chunks_exact(2).map(|pair| RegisterWrite {
            addr: pair[0],
            data: pair[1],
        })
    }
}
