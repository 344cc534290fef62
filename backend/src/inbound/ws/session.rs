//! Per-connection WebSocket handler for location rooms.
//!
//! Keeps framing and heartbeats at the edge while room membership lives in
//! the injected `LocationRooms` port. The public contract pings every 5s and
//! considers a connection idle after 10s without client traffic. Tests
//! shorten both intervals.

use std::future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::geo::GeoPoint;
use crate::domain::ports::{LocationRooms, RoomError};
use crate::domain::{LocationUpdate, RoomName, room_username};
use crate::inbound::ws::messages::{ClientFrame, FrameErrorCode, ServerFrame};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    rooms: Arc<dyn LocationRooms>,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(rooms).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

enum Event {
    Tick,
    Inbound(Option<Result<Message, ProtocolError>>),
    Broadcast(Result<LocationUpdate, RecvError>),
}

/// Room the connection currently belongs to.
struct Membership {
    room: RoomName,
    username: String,
    updates: broadcast::Receiver<LocationUpdate>,
}

struct WsSession {
    rooms: Arc<dyn LocationRooms>,
    membership: Option<Membership>,
}

async fn next_update(membership: Option<&mut Membership>) -> Result<LocationUpdate, RecvError> {
    match membership {
        Some(membership) => membership.updates.recv().await,
        None => future::pending().await,
    }
}

impl WsSession {
    fn new(rooms: Arc<dyn LocationRooms>) -> Self {
        Self {
            rooms,
            membership: None,
        }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let event = tokio::select! {
                _ = heartbeat.tick() => Event::Tick,
                message = stream.recv() => Event::Inbound(message),
                update = next_update(self.membership.as_mut()) => Event::Broadcast(update),
            };

            let result = match event {
                Event::Tick => self.handle_heartbeat_tick(&mut session, &last_heartbeat).await,
                Event::Inbound(message) => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                Event::Broadcast(update) => self.handle_broadcast(&mut session, update).await,
            };

            if let Err(error) = result {
                self.leave_room();
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &mut self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        let reply = match frame {
            ClientFrame::Join { room, username } => self.join(&room, username.as_deref()),
            ClientFrame::Location { lat, lng } => self.share_location(lat, lng),
            ClientFrame::Leave => {
                self.leave_room();
                None
            }
        };

        match reply {
            Some(frame) => self
                .send_json(session, &frame)
                .await
                .map_err(SessionError::Network),
            None => Ok(()),
        }
    }

    fn join(&mut self, raw_room: &str, username: Option<&str>) -> Option<ServerFrame> {
        let room = match RoomName::new(raw_room) {
            Ok(room) => room,
            Err(error) => {
                return Some(ServerFrame::error(
                    FrameErrorCode::InvalidRoom,
                    error.to_string(),
                ));
            }
        };
        self.leave_room();

        match self.rooms.join(&room) {
            Ok(subscription) => {
                debug!(room = %room, members = subscription.members, "joined location room");
                let joined = ServerFrame::Joined {
                    room: room.to_string(),
                    members: subscription.members,
                };
                self.membership = Some(Membership {
                    room,
                    username: room_username(username),
                    updates: subscription.updates,
                });
                Some(joined)
            }
            Err(error @ RoomError::Full { .. }) => {
                Some(ServerFrame::error(FrameErrorCode::RoomFull, error.to_string()))
            }
        }
    }

    fn share_location(&self, lat: f64, lng: f64) -> Option<ServerFrame> {
        let Some(membership) = self.membership.as_ref() else {
            return Some(ServerFrame::error(
                FrameErrorCode::NotInRoom,
                "join a room before sharing a location",
            ));
        };
        let point = match GeoPoint::new(lat, lng) {
            Ok(point) => point,
            Err(error) => {
                return Some(ServerFrame::error(
                    FrameErrorCode::InvalidLocation,
                    error.to_string(),
                ));
            }
        };
        self.rooms.publish(
            &membership.room,
            LocationUpdate {
                username: membership.username.clone(),
                lat: point.lat(),
                lng: point.lng(),
            },
        );
        None
    }

    fn leave_room(&mut self) {
        if let Some(membership) = self.membership.take() {
            self.rooms.leave(&membership.room);
        }
    }

    async fn handle_broadcast(
        &mut self,
        session: &mut Session,
        update: Result<LocationUpdate, RecvError>,
    ) -> Result<(), SessionError> {
        match update {
            Ok(update) => self
                .send_json(session, &ServerFrame::Location(update))
                .await
                .map_err(SessionError::Network),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "WebSocket client lagging behind its room");
                Ok(())
            }
            Err(RecvError::Closed) => {
                self.membership = None;
                Ok(())
            }
        }
    }

    async fn send_json(&self, session: &mut Session, frame: &ServerFrame) -> Result<(), Closed> {
        match serde_json::to_string(frame) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize WebSocket frame");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
