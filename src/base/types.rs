use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Error body returned by the Mattermost API on any non-success status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} (id: {id}, status: {status_code}, detail: {detailed_error})")]
pub struct ApiError {
    /// Stable error identifier (e.g., `api.user.login.invalid_credentials`).
    #[serde(default)]
    pub id: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Detailed (often internal) error text.
    #[serde(default)]
    pub detailed_error: String,
    /// HTTP status code.
    #[serde(default)]
    pub status_code: u16,
}

/// Subset of the server's client configuration used for the reachability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(rename = "Version", default)]
    pub version: String,
}

/// A user account.
///
/// Unknown fields are retained in `extra` so that an updated user can be sent back
/// to the server without dropping anything the server gave us.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A workspace (Mattermost calls this a team).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelType {
    #[default]
    #[serde(rename = "O")]
    Open,
    #[serde(rename = "P")]
    Private,
    #[serde(rename = "D")]
    Direct,
    #[serde(rename = "G")]
    Group,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(rename = "type", default)]
    pub channel_type: ChannelType,
}

/// Request body for creating a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChannel {
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    pub purpose: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
}

/// A chat message as stored by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub root_id: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub create_at: Option<DateTime<Utc>>,
}

impl Post {
    /// How long the post had existed at `now`, if the server reported its creation time.
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.create_at.map(|created| now - created)
    }
}

/// An outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub channel_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
}

impl NewPost {
    pub fn new(channel_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message: message.into(),
            root_id: None,
        }
    }

    /// Thread this post as a reply to `root_id`.
    pub fn with_root_id(mut self, root_id: impl Into<String>) -> Self {
        self.root_id = Some(root_id.into());
        self
    }
}

// Tests.
