//! Link configuration
//!
//! Host-side settings for one ZigBee link. With the `serde` feature the
//! configuration can be stored as postcard-serialized binary data, e.g. in a
//! flash page, and restored on boot.

use appsbee_protocol::settings::is_supported_baud_rate;
use appsbee_protocol::{OverflowPolicy, Role};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default UART speed of a factory-fresh module
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// How long a started frame may take to finish arriving
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u32 = 200;

/// How long the module may take to start answering a command
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 1000;

/// Settle time after reset before the module accepts commands
///
/// Routers need 500 ms, the coordinator 1500 ms.
pub const DEFAULT_BOOT_DELAY_MS: u32 = 1500;

/// Largest postcard encoding of a [`LinkConfig`]
#[cfg(feature = "serde")]
pub const MAX_CONFIG_BYTES: usize = 32;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate the module cannot run at
    UnsupportedBaudRate,
    /// A timeout of zero would never let a frame complete
    ZeroTimeout,
    /// Stored bytes could not be decoded
    Corrupt,
    /// Output buffer too small for the encoded config
    BufferTooSmall,
}

/// Configuration for one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Role of the attached module
    pub role: Role,
    /// UART speed in bits per second
    ///
    /// The link never touches the UART's speed; the board crate reads this
    /// to set up its UART before handing it to [`crate::Link::new`].
    pub baudrate: u32,
    /// Frame completion timeout (ms)
    pub receive_timeout_ms: u32,
    /// Command response timeout (ms)
    pub response_timeout_ms: u32,
    /// Delay after reset (ms)
    pub boot_delay_ms: u32,
    /// Handling of frames longer than the receive buffer
    pub overflow_policy: OverflowPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            role: Role::Coordinator,
            baudrate: DEFAULT_BAUDRATE,
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            boot_delay_ms: DEFAULT_BOOT_DELAY_MS,
            overflow_policy: OverflowPolicy::Reject,
        }
    }
}

impl LinkConfig {
    /// Defaults for a coordinator module
    pub fn coordinator() -> Self {
        Self::default()
    }

    /// Defaults for a router module
    pub fn router() -> Self {
        Self {
            role: Role::Router,
            ..Self::default()
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let baud_ok = i32::try_from(self.baudrate).is_ok_and(is_supported_baud_rate);
        if !baud_ok {
            return Err(ConfigError::UnsupportedBaudRate);
        }
        if self.receive_timeout_ms == 0 || self.response_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Serialize into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::BufferTooSmall)
    }

    /// Deserialize and validate a stored configuration
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupt)?;
        config.validate()?;
        Ok(config)
    }
}
