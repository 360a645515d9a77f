//! Board-agnostic link logic for the AppsBee ZigBee shield
//!
//! This crate ties the protocol to hardware through the `appsbee-hal`
//! traits:
//!
//! - [`Link`]: frame send and the bounded receive loop over one UART
//! - [`AppsBee`]: reset sequencing, unicast address and module settings
//! - [`LinkConfig`]: host-side link configuration
//!
//! Logging goes through `defmt` or `log`, selected by crate feature.

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod error;
pub mod link;
pub mod module;

pub use config::{ConfigError, LinkConfig};
pub use error::LinkError;
pub use link::{Link, LinkStats, Reception};
pub use module::{AppsBee, Response};

pub use appsbee_protocol as protocol;
