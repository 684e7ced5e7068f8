//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use secrecy::SecretString;
use serde::Deserialize;

use super::types::Res;

/// Default human readable bot name used in the start / stop notices.
fn default_bot_name() -> String {
    "SSI Mattermost Bot".to_string()
}

/// Default bot account username.
fn default_bot_username() -> String {
    "ssibot".to_string()
}

/// Default bot account first name.
fn default_bot_first_name() -> String {
    "SSI".to_string()
}

/// Default bot account last name.
fn default_bot_last_name() -> String {
    "Bot".to_string()
}

/// Default team (workspace) name.
fn default_team_name() -> String {
    "general".to_string()
}

/// Default debug channel name.
fn default_debug_channel_name() -> String {
    "ssi_bot_debug".to_string()
}

/// Default debug channel display name, used when the channel has to be created.
fn default_debug_channel_display_name() -> String {
    "Debugging For SSI Bot".to_string()
}

/// Default debug channel purpose, used when the channel has to be created.
fn default_debug_channel_purpose() -> String {
    "This is used as a test channel for logging bot debug messages".to_string()
}

/// Default moderated channel name.
fn default_main_channel_name() -> String {
    "town-square".to_string()
}

/// Default privileged user for the typing rule.
fn default_privileged_user_id() -> String {
    "qa8frsba7fd4mji4nt39pjtsmc".to_string()
}

/// Default delay between onboarding messages.
fn default_onboarding_delay_ms() -> u64 {
    1000
}

/// Configuration for the ssi-bot application.
///
/// Trivially cloneable; every clone shares the same inner values.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Mattermost server base URL, e.g. `https://chat.example.com` (`SERVER_URL`).
    pub server_url: String,
    /// WebSocket base URL (`WEBSOCKET_URL`).
    /// Derived from `server_url` when absent.
    #[serde(default)]
    pub websocket_url: Option<String>,
    /// Bot account email (`BOT_EMAIL`).
    pub bot_email: String,
    /// Bot account password (`BOT_PASSWORD`).
    pub bot_password: SecretString,
    /// Name used in the start / stop notices (`BOT_NAME`).
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Desired bot username (`BOT_USERNAME`).
    #[serde(default = "default_bot_username")]
    pub bot_username: String,
    /// Desired bot first name (`BOT_FIRST_NAME`).
    #[serde(default = "default_bot_first_name")]
    pub bot_first_name: String,
    /// Desired bot last name (`BOT_LAST_NAME`).
    #[serde(default = "default_bot_last_name")]
    pub bot_last_name: String,
    /// Team the bot operates in (`TEAM_NAME`).
    #[serde(default = "default_team_name")]
    pub team_name: String,
    /// Debug channel name (`DEBUG_CHANNEL_NAME`).
    #[serde(default = "default_debug_channel_name")]
    pub debug_channel_name: String,
    /// Debug channel display name (`DEBUG_CHANNEL_DISPLAY_NAME`).
    #[serde(default = "default_debug_channel_display_name")]
    pub debug_channel_display_name: String,
    /// Debug channel purpose (`DEBUG_CHANNEL_PURPOSE`).
    #[serde(default = "default_debug_channel_purpose")]
    pub debug_channel_purpose: String,
    /// Channel in which every post is deleted (`MAIN_CHANNEL_NAME`).
    #[serde(default = "default_main_channel_name")]
    pub main_channel_name: String,
    /// User whose typing in the debug channel gets scolded (`PRIVILEGED_USER_ID`).
    #[serde(default = "default_privileged_user_id")]
    pub privileged_user_id: String,
    /// Delay between onboarding messages, in milliseconds (`ONBOARDING_DELAY_MS`).
    #[serde(default = "default_onboarding_delay_ms")]
    pub onboarding_delay_ms: u64,
}

impl ConfigInner {
    /// Delay between onboarding messages.
    pub fn onboarding_delay(&self) -> Duration {
        Duration::from_millis(self.onboarding_delay_ms)
    }

    /// Base URL for the WebSocket feed.
    pub fn websocket_base_url(&self) -> String {
        if let Some(url) = &self.websocket_url {
            return url.trim_end_matches('/').to_string();
        }

        let server = self.server_url.trim_end_matches('/');

        if let Some(rest) = server.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = server.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            server.to_string()
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("SSI_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        Self::validated(cfg.build()?.try_deserialize()?)
    }

    /// Wrap and validate an already deserialized configuration.
    pub fn validated(inner: ConfigInner) -> Res<Self> {
        let result = Config { inner: Arc::new(inner) };

        if !(result.server_url.starts_with("http://") || result.server_url.starts_with("https://")) {
            return Err(anyhow::anyhow!("Server URL must start with `http://` or `https://`."));
        }

        if result.websocket_url.as_deref().is_some_and(|url| !(url.starts_with("ws://") || url.starts_with("wss://"))) {
            return Err(anyhow::anyhow!("WebSocket URL must start with `ws://` or `wss://`."));
        }

        if result.bot_email.is_empty() {
            return Err(anyhow::anyhow!("Bot email must not be empty."));
        }

        Ok(result)
    }
}

// Tests.
