//! Port for real-time location rooms.

use tokio::sync::broadcast;

use crate::domain::{LocationUpdate, RoomName};

use super::define_port_error;

define_port_error! {
    /// Errors raised when joining a room.
    pub enum RoomError {
        /// The room already holds `capacity` members.
        Full { capacity: usize } => "room is full ({capacity} members)",
    }
}

/// Membership handle returned by [`LocationRooms::join`].
#[derive(Debug)]
pub struct RoomSubscription {
    /// Updates published to the room, including the member's own.
    pub updates: broadcast::Receiver<LocationUpdate>,
    /// Member count after joining.
    pub members: usize,
}

/// Registry of named rooms fanning location updates out to members.
///
/// Callers must pair every successful [`join`](LocationRooms::join) with a
/// [`leave`](LocationRooms::leave) so empty rooms are dropped.
#[cfg_attr(test, mockall::automock)]
pub trait LocationRooms: Send + Sync {
    /// Join `room`, creating it on first use.
    fn join(&self, room: &RoomName) -> Result<RoomSubscription, RoomError>;

    /// Send `update` to every member of `room`; returns the receiver count.
    fn publish(&self, room: &RoomName, update: LocationUpdate) -> usize;

    /// Leave `room`, removing it once empty.
    fn leave(&self, room: &RoomName);
}
