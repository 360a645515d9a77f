//! Frame encoding and decoding for the AppsBee protocol.
//!
//! Over-the-air frame format:
//! - START (1 byte): 0x7E preamble
//! - LENGTH (1 byte): TAG + SOURCE + DATA byte count (3-253)
//! - TAG (1 byte): payload type identifier
//! - SOURCE (2 bytes): sender device id, big-endian
//! - DATA (0-250 bytes): type-specific data
//! - CHECKSUM (1 byte): 0xFF minus the 8-bit sum of TAG, SOURCE and DATA

use heapless::Vec;

use crate::address::{DestinationHeader, DeviceId};

/// Frame preamble byte
pub const FRAME_START: u8 = 0x7E;

/// TAG + SOURCE bytes counted in LENGTH ahead of the data
pub const HEADER_LEN: usize = 3;

/// Largest LENGTH value the decoder accepts without overflowing
pub const MAX_PAYLOAD_LEN: usize = 253;

/// Maximum data bytes in one frame
pub const MAX_DATA_LEN: usize = MAX_PAYLOAD_LEN - HEADER_LEN;

/// Receive buffer: the whole payload plus the checksum byte
pub const RX_BUFFER_SIZE: usize = MAX_PAYLOAD_LEN + 1;

/// Maximum over-the-air frame size (START + LENGTH + payload + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = 1 + 1 + MAX_PAYLOAD_LEN + 1;

/// Maximum frame size as written to the local module, header included
pub const MAX_ADDRESSED_FRAME_SIZE: usize = DestinationHeader::LEN + MAX_FRAME_SIZE;

/// Running sum of a valid frame, checksum byte included
const CHECKSUM_TARGET: u8 = 0xFF;

/// Errors that can occur during frame encoding, decoding or dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Data exceeds [`MAX_DATA_LEN`]
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Source id outside -1..=2047
    InvalidAddress,
    /// Checksum mismatch
    InvalidChecksum,
    /// LENGTH too small to hold TAG and SOURCE
    InvalidLength,
    /// LENGTH larger than the receive buffer; frame discarded
    Overflow,
    /// Data does not match the layout its tag promises
    MalformedPayload,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload type identifier
    pub tag: u8,
    /// Sending device
    pub source: DeviceId,
    /// Raw data after the source address
    pub data: Vec<u8, MAX_DATA_LEN>,
}

impl Frame {
    /// Create a new frame originating from `source`
    pub fn new(tag: u8, source: DeviceId, data: &[u8]) -> Result<Self, FrameError> {
        if data.len() > MAX_DATA_LEN {
            return Err(FrameError::PayloadTooLarge);
        }
        if !source.is_valid() {
            return Err(FrameError::InvalidAddress);
        }

        let mut data_vec = Vec::new();
        data_vec
            .extend_from_slice(data)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            tag,
            source,
            data: data_vec,
        })
    }

    /// Create a frame with no data (LENGTH == 3)
    pub fn empty(tag: u8, source: DeviceId) -> Self {
        Self {
            tag,
            source,
            data: Vec::new(),
        }
    }

    /// LENGTH field value
    pub fn payload_len(&self) -> u8 {
        (HEADER_LEN + self.data.len()) as u8
    }

    /// Checksum byte for this frame
    pub fn checksum(&self) -> u8 {
        calculate_checksum(self.tag, self.source.to_be_bytes(), &self.data)
    }

    /// Size of the over-the-air encoding
    pub fn encoded_len(&self) -> usize {
        1 + 1 + HEADER_LEN + self.data.len() + 1
    }

    /// Encode the over-the-air frame (starting at the preamble)
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let [src_hi, src_lo] = self.source.to_be_bytes();
        let data_end = 5 + self.data.len();

        buffer[0] = FRAME_START;
        buffer[1] = self.payload_len();
        buffer[2] = self.tag;
        buffer[3] = src_hi;
        buffer[4] = src_lo;
        buffer[5..data_end].copy_from_slice(&self.data);
        buffer[data_end] = self.checksum();

        Ok(frame_len)
    }

    /// Encode the frame as written to the local module, destination header first
    pub fn encode_addressed(
        &self,
        header: DestinationHeader,
        buffer: &mut [u8],
    ) -> Result<usize, FrameError> {
        if buffer.len() < DestinationHeader::LEN {
            return Err(FrameError::BufferTooSmall);
        }
        buffer[..DestinationHeader::LEN].copy_from_slice(&header.to_bytes());
        let len = self.encode(&mut buffer[DestinationHeader::LEN..])?;
        Ok(DestinationHeader::LEN + len)
    }

    /// Encode the over-the-air frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Encode the addressed frame into a heapless Vec
    pub fn encode_addressed_to_vec(
        &self,
        header: DestinationHeader,
    ) -> Result<Vec<u8, MAX_ADDRESSED_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_ADDRESSED_FRAME_SIZE];
        let len = self.encode_addressed(header, &mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Calculate the checksum byte for a frame
fn calculate_checksum(tag: u8, source: [u8; 2], data: &[u8]) -> u8 {
    let sum = data.iter().fold(
        tag.wrapping_add(source[0]).wrapping_add(source[1]),
        |acc, &byte| acc.wrapping_add(byte),
    );
    CHECKSUM_TARGET - sum
}

/// What to do with a frame whose LENGTH exceeds the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverflowPolicy {
    /// Consume the whole frame, then report [`FrameError::Overflow`]
    #[default]
    Reject,
    /// Keep what fits, validate the checksum over every byte, and deliver
    /// the frame with its data cut short. Legacy shield firmware behaves
    /// this way; the delivered data is not what the sender sent.
    Truncate,
}

/// State machine for decoding incoming frames
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    buffer: Vec<u8, RX_BUFFER_SIZE>,
    expected_length: u8,
    checksum: u8,
    offset: usize,
    overflowed: bool,
    policy: OverflowPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for the preamble
    Sync,
    /// Got the preamble, waiting for LENGTH
    Preamble,
    /// Collecting LENGTH payload bytes plus the checksum
    Accumulating,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a new frame decoder that rejects oversized frames
    pub fn new() -> Self {
        Self::with_policy(OverflowPolicy::Reject)
    }

    /// Create a decoder with an explicit overflow policy
    pub fn with_policy(policy: OverflowPolicy) -> Self {
        Self {
            state: DecodeState::Sync,
            buffer: Vec::new(),
            expected_length: 0,
            checksum: 0,
            offset: 0,
            overflowed: false,
            policy,
        }
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Reset the decoder state, abandoning any partial frame
    pub fn reset(&mut self) {
        self.state = DecodeState::Sync;
        self.buffer.clear();
        self.expected_length = 0;
        self.checksum = 0;
        self.offset = 0;
        self.overflowed = false;
    }

    /// True while hunting for a preamble (no frame in progress)
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::Sync
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is decoded,
    /// `Ok(None)` when more bytes are needed, or `Err` when a frame was
    /// rejected. The decoder is back in sync after any `Err`.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            DecodeState::Sync => {
                if byte == FRAME_START {
                    self.state = DecodeState::Preamble;
                }
                // Silently ignore bytes outside a frame
                Ok(None)
            }
            DecodeState::Preamble => {
                if usize::from(byte) < HEADER_LEN {
                    self.reset();
                    return Err(FrameError::InvalidLength);
                }
                self.expected_length = byte;
                self.buffer.clear();
                self.offset = 0;
                self.checksum = 0;
                self.overflowed = false;
                self.state = DecodeState::Accumulating;
                Ok(None)
            }
            DecodeState::Accumulating => {
                self.checksum = self.checksum.wrapping_add(byte);
                if self.buffer.push(byte).is_err() {
                    self.overflowed = true;
                }
                self.offset += 1;

                if self.offset > usize::from(self.expected_length) {
                    let result = self.complete();
                    self.reset();
                    result.map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Feed multiple bytes to the decoder
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Validate and extract the frame once LENGTH + 1 bytes are in
    fn complete(&self) -> Result<Frame, FrameError> {
        if self.overflowed && self.policy == OverflowPolicy::Reject {
            return Err(FrameError::Overflow);
        }
        if self.checksum != CHECKSUM_TARGET {
            return Err(FrameError::InvalidChecksum);
        }

        // Truncated frames never stored their checksum byte
        let data_end = usize::from(self.expected_length).min(MAX_PAYLOAD_LEN);
        let mut data = Vec::new();
        data.extend_from_slice(&self.buffer[HEADER_LEN..data_end])
            .map_err(|_| FrameError::Overflow)?;

        Ok(Frame {
            tag: self.buffer[0],
            source: DeviceId::from_be_bytes([self.buffer[1], self.buffer[2]]),
            data,
        })
    }
}
