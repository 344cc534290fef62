//! Wire-level frames exchanged over the location WebSocket.
//!
//! Every frame is a JSON object discriminated by its `type` field.

use serde::{Deserialize, Serialize};

use crate::domain::LocationUpdate;

/// Frame sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Join `room`, leaving any room joined earlier.
    Join {
        room: String,
        #[serde(default)]
        username: Option<String>,
    },
    /// Share a position with the joined room.
    Location { lat: f64, lng: f64 },
    /// Leave the joined room.
    Leave,
}

/// Machine-readable codes carried by [`ServerFrame::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameErrorCode {
    RoomFull,
    InvalidRoom,
    NotInRoom,
    InvalidLocation,
}

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Joined { room: String, members: usize },
    Location(LocationUpdate),
    Error {
        code: FrameErrorCode,
        message: String,
    },
}

impl ServerFrame {
    pub fn error(code: FrameErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"type":"join","room":"r1"}"#, ClientFrame::Join { room: "r1".into(), username: None })]
    #[case(
        r#"{"type":"join","room":"r1","username":"Ann"}"#,
        ClientFrame::Join { room: "r1".into(), username: Some("Ann".into()) }
    )]
    #[case(r#"{"type":"location","lat":48.85,"lng":2.35}"#, ClientFrame::Location { lat: 48.85, lng: 2.35 })]
    #[case(r#"{"type":"leave"}"#, ClientFrame::Leave)]
    fn parses_client_frames(#[case] raw: &str, #[case] expected: ClientFrame) {
        let frame: ClientFrame = serde_json::from_str(raw).expect("frame parses");
        assert_eq!(frame, expected);
    }

    #[rstest]
    #[case(r#"{"type":"teleport"}"#)]
    #[case(r#"{"type":"location","lat":"north"}"#)]
    #[case(r#"{"room":"r1"}"#)]
    fn rejects_unknown_frames(#[case] raw: &str) {
        assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
    }

    #[test]
    fn serialises_location_frame() {
        let frame = ServerFrame::Location(LocationUpdate {
            username: "Ann".to_owned(),
            lat: 48.5,
            lng: 2.25,
        });
        assert_json_snapshot!(frame, @r#"
        {
          "type": "location",
          "username": "Ann",
          "lat": 48.5,
          "lng": 2.25
        }
        "#);
    }

    #[test]
    fn serialises_error_frame() {
        let frame = ServerFrame::error(FrameErrorCode::RoomFull, "room is full (50 members)");
        assert_json_snapshot!(frame, @r#"
        {
          "type": "error",
          "code": "room_full",
          "message": "room is full (50 members)"
        }
        "#);
    }
}
