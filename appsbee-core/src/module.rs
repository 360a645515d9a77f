//! AppsBee module controller
//!
//! Drives the control lines of the shield and the ASCII configuration
//! channel that shares the UART with the frame traffic. Start-up sequence:
//!
//! 1. Mode line high (transparent frame mode), reset line released
//! 2. Wait for power to settle, pulse reset
//! 3. Wait for the module to boot
//! 4. Learn the local address: 0 for a coordinator, queried for a router

use appsbee_hal::{Clock, OutputPin, Uart};
use appsbee_protocol::settings::{parse_unicast_response, UNICAST_QUERY};
use appsbee_protocol::{DeviceId, Role, Setting, SettingRequest};
use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::error::LinkError;
use crate::link::Link;

/// Power-up settle time before the first reset pulse (ms)
const POWER_UP_DELAY_MS: u32 = 2000;

/// Reset pulse width (ms)
const RESET_PULSE_MS: u32 = 2;

/// Pause before querying the unicast address (ms)
const ADDRESS_QUERY_DELAY_MS: u32 = 1000;

/// Gap allowed between response bytes; ~2 characters at 9600 baud (ms)
const RESPONSE_BYTE_GAP_MS: u32 = 2;

/// Longest module response kept; the rest is discarded
pub const RESPONSE_CAPACITY: usize = 64;

/// Text the module sent back for a command
pub type Response = String<RESPONSE_CAPACITY>;

/// An AppsBee shield: the serial link plus its reset and mode lines
pub struct AppsBee<U, C, P, D> {
    link: Link<U, C>,
    reset: P,
    mode: P,
    delay: D,
}

impl<U, C, P, D> AppsBee<U, C, P, D>
where
    U: Uart,
    C: Clock,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(link: Link<U, C>, reset: P, mode: P, delay: D) -> Self {
        Self {
            link,
            reset,
            mode,
            delay,
        }
    }

    pub fn link(&self) -> &Link<U, C> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut Link<U, C> {
        &mut self.link
    }

    /// Release the link, reset pin, mode pin and delay
    pub fn into_parts(self) -> (Link<U, C>, P, P, D) {
        (self.link, self.reset, self.mode, self.delay)
    }

    /// Reset the module and learn the local address
    pub fn begin(&mut self) -> Result<DeviceId, LinkError<U::Error>> {
        self.mode.set_high();
        self.reset.set_high();
        self.delay.delay_ms(POWER_UP_DELAY_MS);
        self.pulse_reset();

        self.link.reset_decoder();
        self.delay.delay_ms(self.link.config().boot_delay_ms);

        let id = match self.link.role() {
            Role::Coordinator => {
                self.link.set_device_id(DeviceId::COORDINATOR);
                DeviceId::COORDINATOR
            }
            Role::Router => self.read_unicast_address()?,
        };
        info!("AppsBee up, role {:?}, id {}", self.link.role(), id.get());
        Ok(id)
    }

    /// Pulse the reset line; used to apply a changed setting
    pub fn pulse_reset(&mut self) {
        self.reset.set_low();
        self.delay.delay_ms(RESET_PULSE_MS);
        self.reset.set_high();
    }

    /// Ask the module for its unicast address and adopt it
    ///
    /// A response without a usable number leaves the router unassigned.
    pub fn read_unicast_address(&mut self) -> Result<DeviceId, LinkError<U::Error>> {
        self.delay.delay_ms(ADDRESS_QUERY_DELAY_MS);
        self.link.write_raw(UNICAST_QUERY.as_bytes())?;
        let response = self.read_response()?;

        let id = parse_unicast_response(&response)
            .and_then(|id| DeviceId::new(id).ok())
            .unwrap_or(DeviceId::UNASSIGNED);
        debug!("unicast address response {}, id {}", response.as_str(), id.get());

        self.link.set_device_id(id);
        Ok(id)
    }

    /// Give a router a new unicast address, then read back what the module took
    ///
    /// A coordinator's address is fixed at 0 and is returned without I/O.
    pub fn write_unicast_address(&mut self, id: i16) -> Result<DeviceId, LinkError<U::Error>> {
        if self.link.role() == Role::Coordinator {
            return Ok(DeviceId::COORDINATOR);
        }

        let request = SettingRequest::Set(Setting::UnicastAddress, i32::from(id));
        let command = request.encode(self.link.role())?;
        self.link.write_raw(command.as_bytes())?;
        // Only the echo; the address is read back after the reset
        self.read_response()?;
        self.pulse_reset();

        self.read_unicast_address()
    }

    /// Send a configuration command and return the module's answer
    ///
    /// Values are range-checked first; an out-of-range value never reaches
    /// the module. A successful set is applied with a reset pulse. Changing
    /// the baud rate takes effect on the module side only; the host UART
    /// must be reconfigured by the caller.
    pub fn configure(&mut self, request: SettingRequest) -> Result<Response, LinkError<U::Error>> {
        let command = match request.encode(self.link.role()) {
            Ok(command) => command,
            Err(e) => {
                warn!("config rejected: {:?}", request);
                return Err(e.into());
            }
        };
        debug!("config command: {}", command.as_str());

        self.link.write_raw(command.as_bytes())?;
        let response = self.read_response()?;

        if let SettingRequest::Set(setting, value) = request {
            self.pulse_reset();
            if setting == Setting::UnicastAddress {
                let id = i16::try_from(value)
                    .ok()
                    .and_then(|id| DeviceId::new(id).ok())
                    .unwrap_or(DeviceId::UNASSIGNED);
                self.link.set_device_id(id);
            }
            info!("config applied: {:?}", request);
        }

        Ok(response)
    }

    /// Wait for the module to start answering, then collect until it goes quiet
    ///
    /// The response timeout covers the whole exchange; a peer that never
    /// stops talking is cut off there.
    fn read_response(&mut self) -> Result<Response, LinkError<U::Error>> {
        let start = self.link.now_ms();
        let timeout = u64::from(self.link.config().response_timeout_ms);

        while self.link.available()? == 0 {
            if self.link.now_ms().saturating_sub(start) >= timeout {
                warn!("module did not answer within {} ms", timeout);
                return Err(LinkError::NoResponse);
            }
        }

        let mut response = Response::new();
        while let Some(byte) = self.link.read_raw_byte()? {
            // Excess bytes are drained but not kept
            let _ = response.push(char::from(byte));
            if self.link.now_ms().saturating_sub(start) >= timeout {
                warn!("module response cut off after {} ms", timeout);
                break;
            }
            self.delay.delay_ms(RESPONSE_BYTE_GAP_MS);
        }
        Ok(response)
    }
}
