//! Mattermost chat service integration for ssi-bot.
//!
//! This module provides the Mattermost implementation of the `GenericChatClient` trait:
//! - REST API v4 calls (login, users, teams, channels, posts)
//! - The `/api/v4/websocket` real-time event feed
//!
//! The session token obtained at login is kept for the life of the client and is never refreshed.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt, future};
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    event::Event,
    types::{ApiError, Channel, NewChannel, NewPost, Post, Res, ServerInfo, Team, User, Void},
};

use super::{ChatClient, EventStream, GenericChatClient};

/// Header carrying the session token in the login response.
const TOKEN_HEADER: &str = "Token";

// Extra methods on `ChatClient` applied by the mattermost implementation.

impl ChatClient {
    /// Creates a new Mattermost chat client.
    pub fn mattermost(config: &Config) -> Res<Self> {
        let client = MattermostChatClient::new(config)?;
        Ok(Self::from(client))
    }
}

impl From<MattermostChatClient> for ChatClient {
    fn from(client: MattermostChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// Mattermost client implementation.
pub struct MattermostChatClient {
    http: reqwest::Client,
    api_url: String,
    websocket_url: String,
    token: OnceLock<String>,
}

impl MattermostChatClient {
    /// Create a new Mattermost chat client.
    #[instrument(name = "MattermostChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::builder().user_agent(concat!("ssi-bot/", env!("CARGO_PKG_VERSION"))).build()?;

        let api_url = format!("{}/api/v4", config.server_url.trim_end_matches('/'));
        let websocket_url = format!("{}/api/v4/websocket", config.websocket_base_url());

        debug!("Mattermost API at {}, WebSocket at {}", api_url, websocket_url);

        Ok(Self {
            http,
            api_url,
            websocket_url,
            token: OnceLock::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Attach the session token, if there is one.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Res<T> {
        let response = self.authorized(request).send().await?;
        let response = check_status(response).await?;

        Ok(response.json::<T>().await?)
    }
}

/// Turn any non-success response into an [`ApiError`].
async fn check_status(response: Response) -> Res<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let mut error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| ApiError {
        message: body,
        ..Default::default()
    });

    if error.status_code == 0 {
        error.status_code = status.as_u16();
    }

    Err(error.into())
}

/// Decode one WebSocket message into an event, dropping non-event frames.
fn decode_message(message: Result<Message, tungstenite::Error>) -> Option<Res<Event>> {
    match message {
        Ok(Message::Text(text)) => Event::decode(text.as_str()).map_err(anyhow::Error::from).transpose(),
        Ok(Message::Close(frame)) => {
            info!("Event feed closed by the server: {:?}", frame);
            None
        }
        Ok(_) => None,
        Err(err) => Some(Err(err.into())),
    }
}

#[async_trait]
impl GenericChatClient for MattermostChatClient {
    #[instrument(skip(self))]
    async fn get_server_info(&self) -> Res<ServerInfo> {
        let request = self.http.get(self.url("/config/client")).query(&[("format", "old")]);

        self.send(request).await
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &SecretString) -> Res<User> {
        let body = json!({
            "login_id": email,
            "password": password.expose_secret(),
        });

        let response = self.http.post(self.url("/users/login")).json(&body).send().await?;
        let response = check_status(response).await?;

        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(anyhow::anyhow!("Login response did not carry a session token."))?;

        if self.token.set(token).is_err() {
            return Err(anyhow::anyhow!("Client is already logged in."));
        }

        Ok(response.json::<User>().await?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, user: &User) -> Res<User> {
        let request = self.http.put(self.url(&format!("/users/{}", user.id))).json(user);

        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn get_team_by_name(&self, name: &str) -> Res<Team> {
        let request = self.http.get(self.url(&format!("/teams/name/{name}")));

        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn get_channel_by_name(&self, name: &str, team_id: &str) -> Res<Channel> {
        let request = self.http.get(self.url(&format!("/teams/{team_id}/channels/name/{name}")));

        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn create_channel(&self, channel: &NewChannel) -> Res<Channel> {
        let request = self.http.post(self.url("/channels")).json(channel);

        self.send(request).await
    }

    #[instrument(skip(self, post), fields(channel_id = %post.channel_id))]
    async fn create_post(&self, post: &NewPost) -> Res<Post> {
        let request = self.http.post(self.url("/posts")).json(post);

        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: &str) -> Void {
        let request = self.authorized(self.http.delete(self.url(&format!("/posts/{post_id}"))));

        check_status(request.send().await?).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_direct_channel(&self, user_a: &str, user_b: &str) -> Res<Channel> {
        let request = self.http.post(self.url("/channels/direct")).json(&[user_a, user_b]);

        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Res<User> {
        let request = self.http.get(self.url(&format!("/users/{user_id}")));

        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn subscribe(&self) -> Res<EventStream> {
        let token = self.token.get().ok_or(anyhow::anyhow!("Cannot subscribe to events before logging in."))?;

        let (mut socket, _) = tokio_tungstenite::connect_async(self.websocket_url.as_str()).await?;

        // Authenticate the socket with the session token.

        let challenge = json!({
            "seq": 1,
            "action": "authentication_challenge",
            "data": { "token": token },
        });

        socket.send(Message::text(challenge.to_string())).await?;

        info!("Subscribed to the event feed at {}", self.websocket_url);

        let stream = socket.filter_map(|message| future::ready(decode_message(message)));

        Ok(Box::pin(stream))
    }
}

// Tests.
