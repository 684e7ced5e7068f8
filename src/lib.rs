//! Library root for `ssi-bot`.
//!
//! Ssi-bot is a small Mattermost bot for the SSI community server, designed to:
//! - Answer liveness checks ("alive", "up", "running", "hello") in a debug channel
//! - Keep the main channel free of messages by deleting every post
//! - Welcome newly created users with a scripted direct-message sequence
//!
//! The bot integrates with Mattermost through its REST API and WebSocket event feed.
//! The architecture is built around a chat-client trait that allows the event
//! dispatcher to be driven by a mock in tests.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::{debug, info};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the ssi-bot runtime:
/// - Initializes the crypto provider
/// - Runs the startup sequence against the chat server
/// - Starts the main event loop until a termination signal arrives
pub async fn start(config: Config) -> Void {
    info!("Starting {} ...", config.bot_name);

    // Start the crypto provider.
    if crypto::ring::default_provider().install_default().is_err() {
        debug!("A crypto provider is already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
