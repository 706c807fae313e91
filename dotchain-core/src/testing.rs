//! Mock collaborators shared by the unit tests

use dotchain_hal::ChainBus;
use dotchain_protocol::MAX_FRAME_SIZE;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

/// One recorded transfer
pub type Transfer = Vec<u8, MAX_FRAME_SIZE>;

/// Transfers kept by [`RecordingBus`]; later ones are only counted
pub const RECORDED_TRANSFERS: usize = 256;

/// Bus that records every transfer
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub transfers: Vec<Transfer, RECORDED_TRANSFERS>,
    pub total: usize,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.transfers.clear();
        self.total = 0;
    }

    pub fn last(&self) -> &[u8] {
        self.transfers.last().map(|t| t.as_slice()).unwrap_or(&[])
    }
}

impl ChainBus for RecordingBus {
    type Error = core::convert::Infallible;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.total += 1;
        let mut transfer = Transfer::new();
        transfer.extend_from_slice(data).unwrap();
        let _ = self.transfers.push(transfer);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// Bus that accepts `healthy` transfers and then fails every write
#[derive(Debug, Default)]
pub struct FailingBus {
    pub healthy: usize,
    pub attempts: usize,
}

impl FailingBus {
    pub fn after(healthy: usize) -> Self {
        Self {
            healthy,
            attempts: 0,
        }
    }
}

impl ChainBus for FailingBus {
    type Error = BusFault;

    fn write(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.attempts > self.healthy {
            Err(BusFault)
        } else {
            Ok(())
        }
    }
}

/// Delay that returns immediately and records what it was asked for
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub calls: usize,
    pub total_ms: u64,
    pub last_ms: u32,
}

impl DelayNs for CountingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
        self.last_ms = ms;
    }
}
