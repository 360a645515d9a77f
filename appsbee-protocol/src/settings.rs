//! Module configuration commands
//!
//! Besides frames, the module accepts plain ASCII commands on the same UART:
//! a keyword, a space, and an optional decimal argument. A bare keyword
//! queries the current value; with an argument it changes it. Values are
//! range-checked here, before anything reaches the wire.

use core::fmt::{self, Write};

use heapless::String;

use crate::address::{Role, MAX_ROUTER_ID};

/// Token reported for every rejected setting value
pub const INVALID_DATA_TOKEN: &str = "*Invalid Data*";

/// Query sent to learn the router's unicast address
pub const UNICAST_QUERY: &str = "UNI_SEC_ADDR";

/// Baud rates the module can switch to
pub const BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Longest rendered command
pub const MAX_COMMAND_LEN: usize = 32;

/// Lowest and highest single channel number
const FIRST_CHANNEL: i32 = 11;
const LAST_CHANNEL: i32 = 26;

/// Channel bitmask bit for channel 11; higher channels shift left
const CHANNEL_MASK_BASE: i32 = 0x800;

/// Module setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    /// Personal area network id, 1..=65535 (module default 4372)
    PanId,
    /// UART speed, one of [`BAUD_RATES`] (module default 9600)
    BaudRate,
    /// Transmit power, 0..=21 (module default 21)
    TxPower,
    /// Channel 11..=26, or a raw channel bitmask >= 2048
    Channel,
    /// Announce ratio, 1..=32767 (module default 600)
    AnnounceRatio,
    /// Router unicast address, 1..=2047 or -1 to clear; 0 belongs to the coordinator
    UnicastAddress,
    /// Software reset; any value
    SoftwareReset,
}

impl Setting {
    pub const ALL: [Setting; 7] = [
        Setting::PanId,
        Setting::BaudRate,
        Setting::TxPower,
        Setting::Channel,
        Setting::AnnounceRatio,
        Setting::UnicastAddress,
        Setting::SoftwareReset,
    ];

    /// Command keyword as the module expects it
    pub fn keyword(self) -> &'static str {
        match self {
            Setting::PanId => "PANID",
            Setting::BaudRate => "BAUD_RATE",
            Setting::TxPower => "TX_POWER",
            Setting::Channel => "CHANNEL",
            Setting::AnnounceRatio => "ANNCE_RATIO",
            Setting::UnicastAddress => "UNI_SEC_ADDR",
            Setting::SoftwareReset => "PW_RESET",
        }
    }

    /// Check `value` for a module in `role` and return what goes on the wire
    ///
    /// Single channels are converted to their bitmask; every other setting is
    /// sent unchanged.
    pub fn validate(self, value: i32, role: Role) -> Result<i32, SettingError> {
        let invalid = Err(SettingError::InvalidData {
            setting: self,
            value,
        });
        match self {
            Setting::PanId if !(1..=65535).contains(&value) => invalid,
            Setting::BaudRate if !is_supported_baud_rate(value) => invalid,
            Setting::TxPower if !(0..=21).contains(&value) => invalid,
            Setting::Channel => {
                if (FIRST_CHANNEL..=LAST_CHANNEL).contains(&value) {
                    Ok(CHANNEL_MASK_BASE << (value - FIRST_CHANNEL))
                } else if value >= CHANNEL_MASK_BASE {
                    Ok(value)
                } else {
                    invalid
                }
            }
            Setting::AnnounceRatio if !(1..=32767).contains(&value) => invalid,
            Setting::UnicastAddress
                if role == Role::Coordinator
                    || !(value == -1 || (1..=i32::from(MAX_ROUTER_ID)).contains(&value)) =>
            {
                invalid
            }
            _ => Ok(value),
        }
    }
}

/// True if the module can run its UART at `rate`
pub fn is_supported_baud_rate(rate: i32) -> bool {
    u32::try_from(rate).is_ok_and(|rate| BAUD_RATES.contains(&rate))
}

/// Rejected setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingError {
    /// Value out of range for the setting or not allowed for this role
    InvalidData { setting: Setting, value: i32 },
    /// Rendered command does not fit the command buffer
    CommandTooLong { setting: Setting },
}

impl SettingError {
    /// Fixed token the module driver has always reported for bad values
    ///
    /// Every rejection renders the same token; match on the variant for
    /// the reason.
    pub fn token(&self) -> &'static str {
        INVALID_DATA_TOKEN
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A configuration command to send to the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingRequest {
    /// Ask for the current value
    Query(Setting),
    /// Change the value
    Set(Setting, i32),
}

impl SettingRequest {
    pub fn setting(&self) -> Setting {
        match *self {
            SettingRequest::Query(setting) | SettingRequest::Set(setting, _) => setting,
        }
    }

    /// Validate and render the ASCII command, e.g. `"CHANNEL 8192"`
    pub fn encode(&self, role: Role) -> Result<String<MAX_COMMAND_LEN>, SettingError> {
        self.render(role)
    }

    fn render<const N: usize>(&self, role: Role) -> Result<String<N>, SettingError> {
        let mut command = String::new();
        let written = match *self {
            SettingRequest::Query(setting) => write!(command, "{} ", setting.keyword()),
            SettingRequest::Set(setting, value) => {
                let wire_value = setting.validate(value, role)?;
                write!(command, "{} {}", setting.keyword(), wire_value)
            }
        };
        written.map_err(|_| SettingError::CommandTooLong {
            setting: self.setting(),
        })?;
        Ok(command)
    }
}

/// Pull the unicast address out of a `"UNI_SEC_ADDR: #"` response
///
/// Only `-` and digits are kept, so surrounding text is ignored. Returns
/// `None` when no number is present.
pub fn parse_unicast_response(response: &str) -> Option<i16> {
    let mut digits = String::<8>::new();
    for c in response.chars() {
        if c == '-' || c.is_ascii_digit() {
            digits.push(c).ok()?;
        }
    }
    digits.parse().ok()
}
