//! Device addressing
//!
//! A ZigBee network has one coordinator (address 0) and up to 2047 routers.
//! A router that has not been given a unicast address reports -1.

use crate::frame::FrameError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// First byte of the destination header
pub const HEADER_SYNC: u8 = 0xAA;

/// Last byte of the destination header
pub const HEADER_END: u8 = 0x55;

/// Destination that reaches every node
pub const BROADCAST_ADDRESS: u16 = 0xFFFF;

/// Destination of the coordinator
pub const COORDINATOR_ADDRESS: u16 = 0x0000;

/// Highest unicast address a router can hold
pub const MAX_ROUTER_ID: i16 = 2047;

/// Network role of the local module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    /// Network coordinator, fixed address 0
    #[default]
    Coordinator,
    /// Router or end device, address assigned over the config channel
    Router,
}

impl Role {
    /// Destination used when a send does not name a target
    ///
    /// Coordinators broadcast; routers report to the coordinator.
    pub fn default_destination(self) -> u16 {
        match self {
            Role::Coordinator => BROADCAST_ADDRESS,
            Role::Router => COORDINATOR_ADDRESS,
        }
    }

    /// Address the module has before it has been queried
    pub fn initial_id(self) -> DeviceId {
        match self {
            Role::Coordinator => DeviceId::COORDINATOR,
            Role::Router => DeviceId::UNASSIGNED,
        }
    }
}

/// Source address carried in every frame
///
/// Values received from the air are taken as-is; only locally originated
/// ids are range-checked (see [`DeviceId::new`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(i16);

impl DeviceId {
    /// The coordinator
    pub const COORDINATOR: Self = Self(0);
    /// A router without a unicast address
    pub const UNASSIGNED: Self = Self(-1);

    /// Create a local device id, rejecting anything outside -1..=2047
    pub fn new(id: i16) -> Result<Self, FrameError> {
        let id = Self(id);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(FrameError::InvalidAddress)
        }
    }

    /// Raw numeric id
    pub fn get(self) -> i16 {
        self.0
    }

    /// True for -1 (unassigned), 0 (coordinator) and 1..=2047 (routers)
    pub fn is_valid(self) -> bool {
        (-1..=MAX_ROUTER_ID).contains(&self.0)
    }

    /// True once a router has a unicast address, always true for the coordinator
    pub fn is_assigned(self) -> bool {
        self.0 >= 0
    }

    pub fn is_coordinator(self) -> bool {
        self.0 == 0
    }

    /// Big-endian wire form; -1 is sent as `0xFFFF`
    pub fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Parse the wire form
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(i16::from_be_bytes(bytes))
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

/// 4-byte prefix telling the local module where to deliver a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DestinationHeader {
    /// Destination address (`0xFFFF` broadcasts)
    pub target: u16,
}

impl DestinationHeader {
    pub const LEN: usize = 4;

    pub fn new(target: u16) -> Self {
        Self { target }
    }

    pub fn broadcast() -> Self {
        Self::new(BROADCAST_ADDRESS)
    }

    /// Header for a send without an explicit target
    pub fn default_for(role: Role) -> Self {
        Self::new(role.default_destination())
    }

    pub fn to_bytes(self) -> [u8; Self::LEN] {
        let [hi, lo] = self.target.to_be_bytes();
        [HEADER_SYNC, hi, lo, HEADER_END]
    }
}
