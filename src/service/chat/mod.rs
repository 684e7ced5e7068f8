pub mod mattermost;

use std::{ops::Deref, pin::Pin, sync::Arc};

use async_trait::async_trait;
use futures::Stream;
use secrecy::SecretString;

use crate::base::{
    event::Event,
    types::{Channel, NewChannel, NewPost, Post, Res, ServerInfo, Team, User, Void},
};

// Types.

/// Stream of decoded real-time events.
///
/// The stream is lazy and effectively infinite; dropping it closes the subscription.
/// Items that fail to decode are yielded as errors so the consumer can log and skip them.
pub type EventStream = Pin<Box<dyn Stream<Item = Res<Event>> + Send>>;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the remote calls the bot makes against the chat server.
/// Every call returns an explicit result that the caller must handle.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Check that the server is reachable and return its basic info.
    async fn get_server_info(&self) -> Res<ServerInfo>;

    /// Log in as the bot user.
    ///
    /// The returned session token is kept by the client and used for every subsequent call.
    async fn login(&self, email: &str, password: &SecretString) -> Res<User>;

    /// Update a user's profile.
    async fn update_user(&self, user: &User) -> Res<User>;

    /// Look up a team (workspace) by name.
    async fn get_team_by_name(&self, name: &str) -> Res<Team>;

    /// Look up a channel by name within a team.
    async fn get_channel_by_name(&self, name: &str, team_id: &str) -> Res<Channel>;

    /// Create a channel.
    async fn create_channel(&self, channel: &NewChannel) -> Res<Channel>;

    /// Create a post.
    async fn create_post(&self, post: &NewPost) -> Res<Post>;

    /// Delete a post.
    async fn delete_post(&self, post_id: &str) -> Void;

    /// Create (or fetch the existing) direct channel between two users.
    async fn create_direct_channel(&self, user_a: &str, user_b: &str) -> Res<Channel>;

    /// Get a user by ID.
    async fn get_user(&self, user_id: &str) -> Res<User>;

    /// Subscribe to the real-time event feed.
    async fn subscribe(&self) -> Res<EventStream>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
