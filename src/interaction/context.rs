//! Read-only state resolved during startup and shared with the dispatcher.

use crate::base::{
    config::Config,
    types::{Channel, Team, User},
};

/// Everything the dispatcher needs to know about "who and where" the bot is.
///
/// Built once by the startup sequence, then only ever read. The event loop and the
/// shutdown path share it behind an `Arc`; nothing mutates it, so no lock is required.
#[derive(Debug, Clone)]
pub struct BotContext {
    pub config: Config,
    /// The bot's own (reconciled) user account.
    pub bot_user: User,
    pub team: Team,
    pub debug_channel: Channel,
    /// The moderated channel; `None` when the lookup failed at startup.
    pub main_channel: Option<Channel>,
}

impl BotContext {
    pub fn is_bot(&self, user_id: &str) -> bool {
        self.bot_user.id == user_id
    }

    pub fn is_debug_channel(&self, channel_id: &str) -> bool {
        self.debug_channel.id == channel_id
    }

    pub fn is_main_channel(&self, channel_id: &str) -> bool {
        self.main_channel.as_ref().is_some_and(|c| c.id == channel_id)
    }

    pub fn is_privileged_user(&self, user_id: &str) -> bool {
        self.config.privileged_user_id == user_id
    }
}
