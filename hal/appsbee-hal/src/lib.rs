//! AppsBee Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the ZigBee link is written
//! against. Board support (an Arduino-style shield on a UART, a USB serial
//! adapter on a host, a simulated module in tests) implements them once and
//! the protocol and link crates stay board-agnostic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  appsbee-core (link, module control)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  appsbee-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board UART /  │       │  embedded-io  │
//! │ GPIO / timer  │       │  streams      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial byte transport
//! - [`gpio::OutputPin`] - Module reset and mode lines
//! - [`clock::Clock`] - Monotonic millisecond time base

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use gpio::OutputPin;
pub use uart::{IoUart, Uart, UartRx, UartTx};
