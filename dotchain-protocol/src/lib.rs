//! MAX7219 Chain Protocol
//!
//! This crate defines the wire-level protocol for a string of MAX7219 LED
//! drivers sharing one serial bus. Every chip exposes 16-bit commands made of
//! a register address and a data byte:
//!
//! ```text
//! ┌──────────┬──────────┐
//! │ REGISTER │ DATA     │
//! │ 1B       │ 1B       │
//! └──────────┴──────────┘
//! ```
//!
//! A transfer to an N-chip chain is N such pairs back to back. Bytes clocked
//! in first are pushed furthest along the chain, so the pair meant for the
//! chip nearest the controller goes last.

#![no_std]
#![deny(unsafe_code)]

pub mod chain;
pub mod frame;
pub mod register;

pub use chain::{ChainConfig, ChainDirection};
pub use frame::{RowFrame, MAX_CHAIN_LEN, MAX_FRAME_SIZE};
pub use register::{
    shutdown, ProtocolError, Register, RegisterWrite, DECODE_NONE, MAX_INTENSITY, ROW_COUNT,
    SCAN_ALL_ROWS,
};
