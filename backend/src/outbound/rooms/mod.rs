//! In-process location room registry.
//!
//! Rooms live only as long as they have members; each one is a tokio
//! broadcast channel so every member, the sender included, receives each
//! published update. State is per process, so horizontally scaled
//! deployments need sticky WebSocket routing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::ports::{LocationRooms, RoomError, RoomSubscription};
use crate::domain::{DEFAULT_ROOM_CAPACITY, LocationUpdate, RoomName};

/// Updates buffered per room before slow members start lagging.
const ROOM_BUFFER: usize = 64;

#[derive(Debug)]
struct Room {
    sender: broadcast::Sender<LocationUpdate>,
    members: usize,
}

/// [`LocationRooms`] backed by a mutex-guarded map of broadcast channels.
#[derive(Debug)]
pub struct InMemoryLocationRooms {
    capacity: usize,
    rooms: Mutex<HashMap<RoomName, Room>>,
}

impl Default for InMemoryLocationRooms {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_CAPACITY)
    }
}

impl InMemoryLocationRooms {
    /// Registry admitting at most `capacity` members per room.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Member count of `room`, zero when it does not exist.
    pub fn members(&self, room: &RoomName) -> usize {
        self.lock().get(room).map_or(0, |room| room.members)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RoomName, Room>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationRooms for InMemoryLocationRooms {
    fn join(&self, name: &RoomName) -> Result<RoomSubscription, RoomError> {
        let mut rooms = self.lock();
        let room = rooms.entry(name.clone()).or_insert_with(|| Room {
            sender: broadcast::channel(ROOM_BUFFER).0,
            members: 0,
        });
        if room.members >= self.capacity {
            return Err(RoomError::full(self.capacity));
        }
        room.members += 1;
        debug!(room = %name, members = room.members, "member joined");
        Ok(RoomSubscription {
            updates: room.sender.subscribe(),
            members: room.members,
        })
    }

    fn publish(&self, name: &RoomName, update: LocationUpdate) -> usize {
        self.lock()
            .get(name)
            .and_then(|room| room.sender.send(update).ok())
            .unwrap_or(0)
    }

    fn leave(&self, name: &RoomName) {
        let mut rooms = self.lock();
        let Some(room) = rooms.get_mut(name) else {
            return;
        };
        room.members = room.members.saturating_sub(1);
        if room.members == 0 {
            rooms.remove(name);
            debug!(room = %name, "room emptied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn room() -> RoomName {
        RoomName::new("r1").expect("valid room")
    }

    fn update(username: &str) -> LocationUpdate {
        LocationUpdate {
            username: username.to_owned(),
            lat: 48.85,
            lng: 2.35,
        }
    }

    #[rstest]
    fn rejects_members_beyond_capacity(room: RoomName) {
        let rooms = InMemoryLocationRooms::default();
        let held: Vec<_> = (0..DEFAULT_ROOM_CAPACITY)
            .map(|_| rooms.join(&room).expect("room has space"))
            .collect();
        assert_eq!(held.last().map(|s| s.members), Some(DEFAULT_ROOM_CAPACITY));

        let error = rooms.join(&room).expect_err("room is full");
        assert_eq!(error, RoomError::Full { capacity: 50 });
    }

    #[rstest]
    #[tokio::test]
    async fn publishes_to_every_member_including_sender(room: RoomName) {
        let rooms = InMemoryLocationRooms::new(5);
        let mut ann = rooms.join(&room).expect("join");
        let mut bob = rooms.join(&room).expect("join");

        assert_eq!(rooms.publish(&room, update("Ann")), 2);
        assert_eq!(ann.updates.recv().await.expect("update"), update("Ann"));
        assert_eq!(bob.updates.recv().await.expect("update"), update("Ann"));
    }

    #[rstest]
    fn empty_rooms_are_dropped(room: RoomName) {
        let rooms = InMemoryLocationRooms::new(5);
        let _first = rooms.join(&room).expect("join");
        let _second = rooms.join(&room).expect("join");
        rooms.leave(&room);
        assert_eq!(rooms.members(&room), 1);
        rooms.leave(&room);
        assert_eq!(rooms.members(&room), 0);
        assert_eq!(rooms.publish(&room, update("Ann")), 0);
    }

    #[rstest]
    fn leaving_an_unknown_room_is_a_no_op(room: RoomName) {
        let rooms = InMemoryLocationRooms::default();
        rooms.leave(&room);
        assert_eq!(rooms.members(&room), 0);
    }
}
