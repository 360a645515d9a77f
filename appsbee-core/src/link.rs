//! ZigBee link
//!
//! A [`Link`] owns everything one serial connection to a module needs: the
//! UART, a clock, the frame decoder and the local device address. There is
//! exactly one decoder per link and it is only touched through `&mut self`,
//! so no locking is involved.

use appsbee_hal::{Clock, Uart};
use appsbee_protocol::{
    DestinationHeader, DeviceId, Frame, FrameDecoder, FrameError, GeneralCommand, Payload, Role,
};

use crate::config::LinkConfig;
use crate::error::LinkError;

/// Outcome of one [`Link::receive`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reception {
    /// No bytes waiting and no frame in progress
    Nothing,
    /// A valid frame
    Frame(Frame),
    /// A complete frame was discarded; the decoder has resynchronized
    Rejected(FrameError),
    /// A started frame stalled past the receive timeout and was abandoned
    TimedOut,
}

/// Link counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub frames_sent: u32,
    pub frames_received: u32,
    pub checksum_errors: u32,
    pub overflows: u32,
    pub length_errors: u32,
    pub timeouts: u32,
}

impl LinkStats {
    fn record_rejection(&mut self, error: FrameError) {
        let counter = match error {
            FrameError::InvalidChecksum => &mut self.checksum_errors,
            FrameError::Overflow => &mut self.overflows,
            _ => &mut self.length_errors,
        };
        *counter = counter.saturating_add(1);
    }
}

/// One serial link to an AppsBee module
pub struct Link<U, C> {
    uart: U,
    clock: C,
    config: LinkConfig,
    device_id: DeviceId,
    decoder: FrameDecoder,
    stats: LinkStats,
}

impl<U: Uart, C: Clock> Link<U, C> {
    /// Create a link over `uart`
    ///
    /// The local address starts at the role's initial id; a router learns
    /// its real address from [`crate::AppsBee::begin`].
    pub fn new(uart: U, clock: C, config: LinkConfig) -> Result<Self, LinkError<U::Error>> {
        config.validate()?;
        Ok(Self {
            uart,
            clock,
            config,
            device_id: config.role.initial_id(),
            decoder: FrameDecoder::with_policy(config.overflow_policy),
            stats: LinkStats::default(),
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    /// Source address stamped on outgoing frames
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn set_device_id(&mut self, id: DeviceId) {
        self.device_id = id;
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// True when no received frame is partially assembled
    pub fn is_idle(&self) -> bool {
        self.decoder.is_idle()
    }

    /// Drop any partially received frame
    pub fn reset_decoder(&mut self) {
        self.decoder.reset();
    }

    /// Release the UART and clock
    pub fn into_parts(self) -> (U, C) {
        (self.uart, self.clock)
    }

    /// Send a payload to the role's default destination
    pub fn send(&mut self, payload: &Payload) -> Result<(), LinkError<U::Error>> {
        self.send_to(self.config.role.default_destination(), payload)
    }

    /// Send a payload to `target`
    pub fn send_to(&mut self, target: u16, payload: &Payload) -> Result<(), LinkError<U::Error>> {
        let frame = payload.to_frame(self.device_id)?;
        self.send_frame(DestinationHeader::new(target), &frame)
    }

    /// Send a general command to its own target id
    pub fn send_command(&mut self, command: GeneralCommand) -> Result<(), LinkError<U::Error>> {
        let target = command.target_id as u16;
        self.send_to(target, &Payload::Command(command))
    }

    pub fn send_text(&mut self, target: u16, text: &str) -> Result<(), LinkError<U::Error>> {
        self.send_to(target, &Payload::text(text)?)
    }

    pub fn send_int(&mut self, target: u16, value: i16) -> Result<(), LinkError<U::Error>> {
        self.send_to(target, &Payload::Int(value))
    }

    pub fn send_float(&mut self, target: u16, value: f32) -> Result<(), LinkError<U::Error>> {
        self.send_to(target, &Payload::Float(value))
    }

    /// Write an already-built frame behind `header`
    pub fn send_frame(
        &mut self,
        header: DestinationHeader,
        frame: &Frame,
    ) -> Result<(), LinkError<U::Error>> {
        let bytes = frame.encode_addressed_to_vec(header)?;
        self.write_raw(&bytes)?;
        self.stats.frames_sent = self.stats.frames_sent.saturating_add(1);
        trace!(
            "TX: tag {} to {} ({} bytes)",
            frame.tag,
            header.target,
            bytes.len()
        );
        Ok(())
    }

    /// Pull bytes until a frame completes, the transport runs dry between
    /// frames, or a started frame times out
    ///
    /// Inside a frame the receive timeout bounds the silence between two
    /// bytes, not the whole transfer, so a full-length frame at a slow baud
    /// rate still gets through. Bytes outside a frame never extend it:
    /// noise without a preamble ends the call as [`Reception::Nothing`].
    pub fn receive(&mut self) -> Result<Reception, LinkError<U::Error>> {
        if self.decoder.is_idle() && self.uart.available().map_err(LinkError::Uart)? == 0 {
            return Ok(Reception::Nothing);
        }

        let mut deadline_start = self.clock.now_ms();
        let timeout = u64::from(self.config.receive_timeout_ms);

        loop {
            if self.clock.elapsed_ms(deadline_start) >= timeout {
                if self.decoder.is_idle() {
                    return Ok(Reception::Nothing);
                }
                self.decoder.reset();
                self.stats.timeouts = self.stats.timeouts.saturating_add(1);
                warn!("RX: frame timed out after {} ms", self.config.receive_timeout_ms);
                return Ok(Reception::TimedOut);
            }

            match self.uart.read_byte().map_err(LinkError::Uart)? {
                Some(byte) => match self.decoder.feed(byte) {
                    Ok(Some(frame)) => {
                        self.stats.frames_received = self.stats.frames_received.saturating_add(1);
                        trace!(
                            "RX: tag {} from {} ({} data bytes)",
                            frame.tag,
                            frame.source.get(),
                            frame.data.len()
                        );
                        return Ok(Reception::Frame(frame));
                    }
                    Ok(None) if !self.decoder.is_idle() => {
                        deadline_start = self.clock.now_ms();
                    }
                    Ok(None) => {}
                    Err(e) => {
                        self.stats.record_rejection(e);
                        warn!("RX: frame rejected: {:?}", e);
                        return Ok(Reception::Rejected(e));
                    }
                },
                None if self.decoder.is_idle() => return Ok(Reception::Nothing),
                // Mid-frame: wait for the rest
                None => {}
            }
        }
    }

    pub(crate) fn write_raw(&mut self, bytes: &[u8]) -> Result<(), LinkError<U::Error>> {
        self.uart.write_blocking(bytes).map_err(LinkError::Uart)?;
        self.uart.flush().map_err(LinkError::Uart)
    }

    pub(crate) fn read_raw_byte(&mut self) -> Result<Option<u8>, LinkError<U::Error>> {
        self.uart.read_byte().map_err(LinkError::Uart)
    }

    pub(crate) fn available(&mut self) -> Result<usize, LinkError<U::Error>> {
        self.uart.available().map_err(LinkError::Uart)
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}
