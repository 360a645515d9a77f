//! AppsBee ZigBee Serial Protocol
//!
//! This crate defines the framed serial protocol spoken between a host and
//! an AppsBee ZigBee module, plus the ASCII configuration commands the
//! module accepts on the same UART. It is pure wire logic: no I/O, no
//! allocation, no global state.
//!
//! # Protocol Overview
//!
//! Frames written to the local module carry a destination header; the
//! module strips it and delivers the rest over the air:
//! ```text
//! ┌──────┬─────────┬──────┐┌──────┬────────┬─────┬────────┬──────────┬──────────┐
//! │ 0xAA │ TARGET  │ 0x55 ││ 0x7E │ LENGTH │ TAG │ SOURCE │ DATA     │ CHECKSUM │
//! │ 1B   │ 2B (BE) │ 1B   ││ 1B   │ 1B     │ 1B  │ 2B (BE)│ 0–250B   │ 1B       │
//! └──────┴─────────┴──────┘└──────┴────────┴─────┴────────┴──────────┴──────────┘
//!   destination header       over-the-air frame
//! ```
//!
//! LENGTH counts TAG + SOURCE + DATA. The checksum is chosen so that TAG,
//! SOURCE, DATA and CHECKSUM sum to `0xFF` modulo 256.

#![no_std]
#![deny(unsafe_code)]

pub mod address;
pub mod frame;
pub mod payload;
pub mod settings;

pub use address::{DestinationHeader, DeviceId, Role, BROADCAST_ADDRESS, COORDINATOR_ADDRESS};
pub use frame::{
    Frame, FrameDecoder, FrameError, OverflowPolicy, FRAME_START, MAX_DATA_LEN, MAX_PAYLOAD_LEN,
};
pub use payload::{dispatch, GeneralCommand, ParseCommandError, Payload};
pub use settings::{Setting, SettingError, SettingRequest, INVALID_DATA_TOKEN};
