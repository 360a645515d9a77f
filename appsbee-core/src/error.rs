//! Link error type

use appsbee_protocol::{FrameError, SettingError};

use crate::config::ConfigError;

/// Errors returned by link and module operations
///
/// `E` is the UART error type. Framing problems on receive are not errors;
/// they come back as [`crate::Reception::Rejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Transport failure
    Uart(E),
    /// Outgoing frame could not be built
    Frame(FrameError),
    /// Setting value rejected before transmission
    Setting(SettingError),
    /// Link configuration unusable
    Config(ConfigError),
    /// Module did not answer a command in time
    NoResponse,
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}

impl<E> From<SettingError> for LinkError<E> {
    fn from(e: SettingError) -> Self {
        LinkError::Setting(e)
    }
}

impl<E> From<ConfigError> for LinkError<E> {
    fn from(e: ConfigError) -> Self {
        LinkError::Config(e)
    }
}
