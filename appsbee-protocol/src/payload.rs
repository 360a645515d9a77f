//! Typed payloads carried in frames
//!
//! The tag byte selects how the data is laid out. Multi-byte numbers use
//! little-endian order, the native layout of the AVR boards the shield was
//! built for.

use core::str::FromStr;

use heapless::{String, Vec};

use crate::address::DeviceId;
use crate::frame::{Frame, FrameError, MAX_DATA_LEN};

// Payload tags
pub const TAG_GENERAL_COMMAND: u8 = 0x06;
pub const TAG_STRING: u8 = 0x07;
pub const TAG_INT: u8 = 0x08;
pub const TAG_FLOAT: u8 = 0x09;

/// Longest text that fits next to its length byte and terminator
pub const MAX_TEXT_LEN: usize = MAX_DATA_LEN - 2;

/// Wire size of a general command
const GENERAL_COMMAND_LEN: usize = 6;

/// Numeric remote-control command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneralCommand {
    /// Device the command is meant for
    pub target_id: i16,
    /// Device that issued the command
    pub source_id: i16,
    pub command_id: u8,
    pub parameter: u8,
}

impl GeneralCommand {
    /// Wire layout: target (LE), source (LE), command, parameter
    pub fn to_bytes(&self) -> [u8; GENERAL_COMMAND_LEN] {
        let [t0, t1] = self.target_id.to_le_bytes();
        let [s0, s1] = self.source_id.to_le_bytes();
        [t0, t1, s0, s1, self.command_id, self.parameter]
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < GENERAL_COMMAND_LEN {
            return Err(FrameError::MalformedPayload);
        }
        Ok(Self {
            target_id: i16::from_le_bytes([data[0], data[1]]),
            source_id: i16::from_le_bytes([data[2], data[3]]),
            command_id: data[4],
            parameter: data[5],
        })
    }
}

/// Error parsing a `"target,command,parameter"` command string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseCommandError;

impl FromStr for GeneralCommand {
    type Err = ParseCommandError;

    /// Parse `"target,command,parameter"`; the source id is left at 0
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split(',').map(str::trim);
        let mut next = || fields.next().ok_or(ParseCommandError);

        let target_id = next()?.parse().map_err(|_| ParseCommandError)?;
        let command_id = next()?.parse().map_err(|_| ParseCommandError)?;
        let parameter = next()?.parse().map_err(|_| ParseCommandError)?;

        Ok(Self {
            target_id,
            source_id: 0,
            command_id,
            parameter,
        })
    }
}

/// Decoded frame contents
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Payload {
    /// General command (tag 6)
    Command(GeneralCommand),
    /// Text (tag 7)
    Text(String<MAX_TEXT_LEN>),
    /// 16-bit integer (tag 8)
    Int(i16),
    /// 32-bit float (tag 9)
    Float(f32),
    /// Any other tag, passed through untouched
    Unknown {
        tag: u8,
        data: Vec<u8, MAX_DATA_LEN>,
    },
}

impl Payload {
    /// Build a text payload, refusing text that does not fit
    pub fn text(value: &str) -> Result<Self, FrameError> {
        let mut text = String::new();
        text.push_str(value)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Payload::Text(text))
    }

    /// Tag byte this payload travels under
    pub fn tag(&self) -> u8 {
        match self {
            Payload::Command(_) => TAG_GENERAL_COMMAND,
            Payload::Text(_) => TAG_STRING,
            Payload::Int(_) => TAG_INT,
            Payload::Float(_) => TAG_FLOAT,
            Payload::Unknown { tag, .. } => *tag,
        }
    }

    /// Parse a payload from a validated frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let data = &frame.data[..];
        match frame.tag {
            TAG_GENERAL_COMMAND => GeneralCommand::from_bytes(data).map(Payload::Command),
            TAG_STRING => {
                let (&len, rest) = data.split_first().ok_or(FrameError::MalformedPayload)?;
                let bytes = rest
                    .get(..usize::from(len))
                    .ok_or(FrameError::MalformedPayload)?;
                let text =
                    core::str::from_utf8(bytes).map_err(|_| FrameError::MalformedPayload)?;
                Self::text(text).map_err(|_| FrameError::MalformedPayload)
            }
            TAG_INT => match data {
                [b0, b1, ..] => Ok(Payload::Int(i16::from_le_bytes([*b0, *b1]))),
                _ => Err(FrameError::MalformedPayload),
            },
            TAG_FLOAT => match data {
                [b0, b1, b2, b3, ..] => Ok(Payload::Float(f32::from_le_bytes([*b0, *b1, *b2, *b3]))),
                _ => Err(FrameError::MalformedPayload),
            },
            tag => Ok(Payload::Unknown {
                tag,
                data: frame.data.clone(),
            }),
        }
    }

    /// Encode this payload into a frame sent by `source`
    pub fn to_frame(&self, source: DeviceId) -> Result<Frame, FrameError> {
        match self {
            Payload::Command(cmd) => Frame::new(TAG_GENERAL_COMMAND, source, &cmd.to_bytes()),
            Payload::Text(text) => {
                // Payload: [len][chars...][NUL]
                let mut data = Vec::<u8, MAX_DATA_LEN>::new();
                data.push(text.len() as u8)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                data.extend_from_slice(text.as_bytes())
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                data.push(0).map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(TAG_STRING, source, &data)
            }
            Payload::Int(value) => Frame::new(TAG_INT, source, &value.to_le_bytes()),
            Payload::Float(value) => Frame::new(TAG_FLOAT, source, &value.to_le_bytes()),
            Payload::Unknown { tag, data } => Frame::new(*tag, source, data),
        }
    }
}

/// Dispatch a validated frame on its tag
pub fn dispatch(frame: &Frame) -> Result<Payload, FrameError> {
    Payload::from_frame(frame)
}
