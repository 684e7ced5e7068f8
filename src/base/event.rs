//! Typed events decoded from the real-time WebSocket feed.
//!
//! Every frame is decoded exactly once, at the feed boundary. Frames that are not events
//! (e.g., replies to our own actions) decode to `None`; malformed frames decode to an
//! [`EventDecodeError`] so that the caller can log and skip them.

use serde::Deserialize;
use serde_json::Value;
use serde_with::{json::JsonString, serde_as};
use thiserror::Error;

use super::types::Post;

/// Wire name of the "a post was created" event.
pub const POSTED: &str = "posted";
/// Wire name of the "a user is typing" event.
pub const TYPING: &str = "typing";
/// Wire name of the "a user account was created" event.
pub const NEW_USER: &str = "new_user";

// Types.

/// A single real-time event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A post was created in `channel_id`.
    Posted { channel_id: String, post: Post },
    /// `user_id` started typing in `channel_id`.
    Typing { channel_id: String, user_id: String },
    /// A new user account was created.
    UserCreated { user_id: String },
    /// Any event kind the bot does not react to.
    Other { kind: String },
}

#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("malformed frame: {0}")]
    Frame(#[source] serde_json::Error),
    #[error("malformed `{kind}` payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

// Wire shapes.

#[derive(Debug, Deserialize)]
struct Frame {
    event: Option<String>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    broadcast: Broadcast,
}

#[derive(Debug, Default, Deserialize)]
struct Broadcast {
    #[serde(default)]
    channel_id: Option<String>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct PostedData {
    #[serde_as(as = "JsonString")]
    post: Post,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user_id: String,
}

// Impls.

impl Event {
    /// Decode a raw text frame.
    pub fn decode(frame: &str) -> Result<Option<Self>, EventDecodeError> {
        let frame: Frame = serde_json::from_str(frame).map_err(EventDecodeError::Frame)?;

        let Some(kind) = frame.event else {
            return Ok(None);
        };

        let broadcast_channel = frame.broadcast.channel_id.filter(|c| !c.is_empty());
        let payload = |source| EventDecodeError::Payload { kind: kind.clone(), source };

        let event = match kind.as_str() {
            POSTED => {
                let data: PostedData = serde_json::from_value(frame.data).map_err(payload)?;
                let channel_id = broadcast_channel.unwrap_or_else(|| data.post.channel_id.clone());

                Event::Posted { channel_id, post: data.post }
            }
            TYPING => {
                let data: UserData = serde_json::from_value(frame.data).map_err(payload)?;

                Event::Typing {
                    channel_id: broadcast_channel.unwrap_or_default(),
                    user_id: data.user_id,
                }
            }
            NEW_USER => {
                let data: UserData = serde_json::from_value(frame.data).map_err(payload)?;

                Event::UserCreated { user_id: data.user_id }
            }
            _ => Event::Other { kind },
        };

        Ok(Some(event))
    }

    /// The wire name of this event's kind.
    pub fn kind(&self) -> &str {
        match self {
            Event::Posted { .. } => POSTED,
            Event::Typing { .. } => TYPING,
            Event::UserCreated { .. } => NEW_USER,
            Event::Other { kind } => kind.as_str(),
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn posted_frame(broadcast_channel: &str, post_channel: &str) -> String {
        let post = json!({
            "id": "p1",
            "channel_id": post_channel,
            "user_id": "u1",
            "message": "are you alive?",
            "root_id": "",
            "create_at": 1_600_000_000_000i64
        });

        json!({
            "event": "posted",
            "data": { "channel_display_name": "Debug", "post": post.to_string(), "sender_name": "@max" },
            "broadcast": { "omit_users": null, "user_id": "", "channel_id": broadcast_channel, "team_id": "" },
            "seq": 3
        })
        .to_string()
    }

    #[test]
    fn test_decode_posted() {
        let event = Event::decode(&posted_frame("c1", "c1")).unwrap().unwrap();

        let Event::Posted { channel_id, post } = event else {
            panic!("expected a posted event");
        };
        assert_eq!(channel_id, "c1");
        assert_eq!(post.id, "p1");
        assert_eq!(post.user_id, "u1");
        assert_eq!(post.message, "are you alive?");
    }

    #[test]
    fn test_decode_posted_falls_back_to_post_channel() {
        let event = Event::decode(&posted_frame("", "c9")).unwrap().unwrap();

        assert!(matches!(event, Event::Posted { channel_id, .. } if channel_id == "c9"));
    }

    #[test]
    fn test_decode_typing() {
        let frame = json!({
            "event": "typing",
            "data": { "parent_id": "", "user_id": "u7" },
            "broadcast": { "channel_id": "c1" },
            "seq": 4
        });

        let event = Event::decode(&frame.to_string()).unwrap().unwrap();
        assert_eq!(event, Event::Typing { channel_id: "c1".into(), user_id: "u7".into() });
        assert_eq!(event.kind(), TYPING);
    }

    #[test]
    fn test_decode_new_user() {
        let frame = json!({ "event": "new_user", "data": { "user_id": "u8" }, "broadcast": { "channel_id": "" }, "seq": 5 });

        let event = Event::decode(&frame.to_string()).unwrap().unwrap();
        assert_eq!(event, Event::UserCreated { user_id: "u8".into() });
    }

    #[test]
    fn test_decode_other_kind() {
        let frame = json!({ "event": "status_change", "data": { "status": "online" }, "broadcast": {}, "seq": 6 });

        let event = Event::decode(&frame.to_string()).unwrap().unwrap();
        assert_eq!(event, Event::Other { kind: "status_change".into() });
    }

    #[test]
    fn test_decode_reply_frame_is_not_an_event() {
        let frame = json!({ "status": "OK", "seq_reply": 1 });

        assert!(Event::decode(&frame.to_string()).unwrap().is_none());
    }

    #[test]
    fn test_decode_malformed_payload() {
        let frame = json!({ "event": "posted", "data": { "post": "{not json" }, "broadcast": { "channel_id": "c1" } });

        let err = Event::decode(&frame.to_string()).unwrap_err();
        assert!(matches!(err, EventDecodeError::Payload { ref kind, .. } if kind == POSTED));
    }

    #[test]
    fn test_decode_missing_user_id() {
        let frame = json!({ "event": "new_user", "data": {}, "broadcast": {} });

        assert!(Event::decode(&frame.to_string()).is_err());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(Event::decode("not json"), Err(EventDecodeError::Frame(_))));
    }
}
