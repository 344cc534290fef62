//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::{Origin, Url};

use crate::domain::ports::LocationRooms;

/// Dependency bundle for WebSocket sessions.
#[derive(Clone)]
pub struct WsState {
    pub rooms: Arc<dyn LocationRooms>,
    allowed_origins: Arc<[Origin]>,
}

impl WsState {
    /// Construct state from the room registry and the Origin allow-list.
    ///
    /// An empty allow-list accepts upgrades from any origin.
    pub fn new(rooms: Arc<dyn LocationRooms>, allowed_origins: &[Url]) -> Self {
        Self {
            rooms,
            allowed_origins: allowed_origins.iter().map(Url::origin).collect(),
        }
    }

    pub fn accepts_any_origin(&self) -> bool {
        self.allowed_origins.is_empty()
    }

    pub fn allows(&self, origin: &Url) -> bool {
        self.accepts_any_origin() || self.allowed_origins.contains(&origin.origin())
    }
}
