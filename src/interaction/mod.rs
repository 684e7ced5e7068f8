//! Event handling and user interactions for ssi-bot.
//!
//! This module provides functionality for reacting to real-time events:
//! - Classifying events by kind and channel, and dispatching them
//! - Keyword replies and moderation in the debug / main channels
//! - Onboarding newly created users

pub mod context;
pub mod dispatch;
pub mod keywords;
pub mod onboarding;
