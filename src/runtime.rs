//! Runtime services and shared state for the ssi-bot.
//!
//! Construction runs the startup sequence, strictly in this order, stopping at the first fatal error:
//! 1. server reachability check
//! 2. login
//! 3. profile reconciliation
//! 4. workspace (team) lookup
//! 5. debug channel provisioning
//!
//! After that, the started notice is posted and the main channel is resolved (both non-fatal).

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        replies,
        types::{Channel, ChannelType, NewChannel, NewPost, Res, Team, User, Void},
    },
    interaction::{context::BotContext, dispatch::Dispatcher},
    service::chat::ChatClient,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the chat client, the configuration, and the context resolved at startup.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// Read-only state resolved during startup.
    pub context: Arc<BotContext>,
}

impl Runtime {
    /// Create a new runtime instance against the configured Mattermost server.
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the chat client.
        let chat = ChatClient::mattermost(&config)?;

        Self::with_chat(config, chat).await
    }

    /// Create a new runtime instance with the given chat client, running the startup sequence.
    #[instrument(skip_all)]
    pub async fn with_chat(config: Config, chat: ChatClient) -> Res<Self> {
        let context = bootstrap(&config, &chat).await?;

        Ok(Self {
            config,
            chat,
            context: Arc::new(context),
        })
    }

    /// Run until a termination signal is received.
    pub async fn start(&self) -> Void {
        let shutdown = CancellationToken::new();

        tokio::spawn(cancel_on_signal(shutdown.clone()));

        self.run(shutdown).await
    }

    /// Subscribe to the event feed and dispatch events until `shutdown` is cancelled.
    ///
    /// The stopped notice is posted to the debug channel on the way out.
    pub async fn run(&self, shutdown: CancellationToken) -> Void {
        let events = self.chat.subscribe().await.context("We failed to connect to the event feed")?;
        let dispatcher = Dispatcher::new(self.context.clone(), self.chat.clone())?;

        let result = dispatcher.run(events, shutdown).await;

        self.post_to_debug_channel(&replies::stopped_notice(&self.config.bot_name)).await;

        result
    }

    /// Best-effort post to the debug channel.
    async fn post_to_debug_channel(&self, message: &str) {
        send_to_debug_channel(&self.chat, &self.context.debug_channel, message).await;
    }
}

/// Run the startup sequence and produce the bot context.
#[instrument(skip_all)]
async fn bootstrap(config: &Config, chat: &ChatClient) -> Res<BotContext> {
    // Make sure the server is up.

    let info = chat
        .get_server_info()
        .await
        .context("There was a problem pinging the Mattermost server. Are you sure it's running?")?;

    info!("Server detected and is running version {}", info.version);

    // Log in as the bot user; the client keeps the session token.

    let bot_user = chat
        .login(&config.bot_email, &config.bot_password)
        .await
        .context("There was a problem logging into the Mattermost server. Are the bot credentials correct?")?;

    info!("Logged in as {} ({})", bot_user.username, bot_user.id);

    let bot_user = reconcile_profile(config, chat, bot_user).await?;

    // Find the team.

    let team = chat
        .get_team_by_name(&config.team_name)
        .await
        .with_context(|| format!("We failed to get the team `{}`, or the bot is not a member of it", config.team_name))?;

    let debug_channel = provision_debug_channel(config, chat, &team).await?;

    send_to_debug_channel(chat, &debug_channel, &replies::started_notice(&config.bot_name)).await;

    // The main channel is optional; without it, moderation is disabled.

    let main_channel = match chat.get_channel_by_name(&config.main_channel_name, &team.id).await {
        Ok(channel) => Some(channel),
        Err(err) => {
            error!("We failed to get the main channel `{}`; moderation is disabled: {:#}", config.main_channel_name, err);
            None
        }
    };

    Ok(BotContext {
        config: config.clone(),
        bot_user,
        team,
        debug_channel,
        main_channel,
    })
}

/// Update the bot's profile if it drifted from the configured values.
async fn reconcile_profile(config: &Config, chat: &ChatClient, user: User) -> Res<User> {
    if user.username == config.bot_username && user.first_name == config.bot_first_name && user.last_name == config.bot_last_name {
        return Ok(user);
    }

    let mut user = user;
    user.username = config.bot_username.clone();
    user.first_name = config.bot_first_name.clone();
    user.last_name = config.bot_last_name.clone();

    let user = chat.update_user(&user).await.context("We failed to update the bot user")?;

    info!("Looks like this might be the first run so we've updated the bot's account settings");

    Ok(user)
}

/// Find the debug channel by name, creating it if it does not exist.
async fn provision_debug_channel(config: &Config, chat: &ChatClient, team: &Team) -> Res<Channel> {
    match chat.get_channel_by_name(&config.debug_channel_name, &team.id).await {
        Ok(channel) => return Ok(channel),
        Err(err) => warn!("Debug channel `{}` not found; creating it: {:#}", config.debug_channel_name, err),
    }

    let new_channel = NewChannel {
        team_id: team.id.clone(),
        name: config.debug_channel_name.clone(),
        display_name: config.debug_channel_display_name.clone(),
        purpose: config.debug_channel_purpose.clone(),
        channel_type: ChannelType::Open,
    };

    let channel = chat
        .create_channel(&new_channel)
        .await
        .with_context(|| format!("We failed to create the channel `{}`", config.debug_channel_name))?;

    info!("Looks like this might be the first run so we've created the channel {}", config.debug_channel_name);

    Ok(channel)
}

/// Best-effort post to the debug channel; failures are only logged.
async fn send_to_debug_channel(chat: &ChatClient, debug_channel: &Channel, message: &str) {
    if let Err(err) = chat.create_post(&NewPost::new(&debug_channel.id, message)).await {
        error!("We failed to send a message to the debug channel: {:#}", err);
    }
}

/// Wait for Ctrl+C or SIGTERM, then cancel `shutdown`.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Termination signal received ...");

    shutdown.cancel();
}
