//! The event dispatcher.
//!
//! Consumes events one at a time, in delivery order, and routes each to a reaction rule:
//! - `typing` by the privileged user in the debug channel: scold them
//! - `new_user`: run the onboarding script
//! - `posted` in the debug channel: keyword reply, or the fallback reply (own posts are ignored)
//! - `posted` in the main channel: delete the post
//! - anything else: ignore
//!
//! Every remote call is awaited before the next event is taken. Failures are logged and dropped.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{
        event::Event,
        replies,
        types::{NewPost, Post, Res, Void},
    },
    interaction::{context::BotContext, keywords::KeywordRules, onboarding},
    service::chat::{ChatClient, EventStream},
};

pub struct Dispatcher {
    context: Arc<BotContext>,
    chat: ChatClient,
    keywords: KeywordRules,
}

impl Dispatcher {
    pub fn new(context: Arc<BotContext>, chat: ChatClient) -> Res<Self> {
        Ok(Self {
            context,
            chat,
            keywords: KeywordRules::standard()?,
        })
    }

    /// Pull events from `events` until it ends or `shutdown` is cancelled.
    ///
    /// Cancellation also interrupts an in-flight event (e.g., an onboarding script). The feed is
    /// closed when this returns. A feed that ends on its own is reported as an error.
    pub async fn run(&self, mut events: EventStream, shutdown: CancellationToken) -> Void {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,
                next = events.next() => match next {
                    Some(Ok(event)) => {
                        tokio::select! {
                            biased;

                            _ = shutdown.cancelled() => break,
                            _ = self.dispatch(event) => {}
                        }
                    }
                    Some(Err(err)) => warn!("Skipping bad event from the feed: {:#}", err),
                    None => return Err(anyhow::anyhow!("The event feed closed unexpectedly.")),
                },
            }
        }

        info!("Shutdown requested; closing the event feed.");

        Ok(())
    }

    /// Handle a single event, logging any error.
    #[instrument(skip_all, fields(kind = event.kind()))]
    pub async fn dispatch(&self, event: Event) {
        // Process the event.
        let result = self.dispatch_internal(event).await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {:#}", err);
        }
    }

    async fn dispatch_internal(&self, event: Event) -> Void {
        match event {
            Event::Typing { channel_id, user_id } => self.handle_typing(&channel_id, &user_id).await,
            Event::UserCreated { user_id } => onboarding::onboard_user(&self.context, &self.chat, &user_id).await,
            Event::Posted { channel_id, post } if self.context.is_debug_channel(&channel_id) => self.handle_debug_post(&post).await,
            Event::Posted { channel_id, post } if self.context.is_main_channel(&channel_id) => self.handle_main_post(&post).await,
            Event::Posted { channel_id, .. } => {
                debug!("Ignoring post in unrelated channel {}.", channel_id);
                Ok(())
            }
            Event::Other { kind } => {
                debug!("Ignoring `{}` event.", kind);
                Ok(())
            }
        }
    }

    async fn handle_typing(&self, channel_id: &str, user_id: &str) -> Void {
        if !(self.context.is_privileged_user(user_id) && self.context.is_debug_channel(channel_id)) {
            return Ok(());
        }

        info!("Privileged user is typing in the debug channel ...");

        let post = NewPost::new(&self.context.debug_channel.id, replies::TYPING_SCOLD);
        self.chat.create_post(&post).await?;

        Ok(())
    }

    async fn handle_debug_post(&self, post: &Post) -> Void {
        // Ignore our own posts.
        if self.context.is_bot(&post.user_id) {
            return Ok(());
        }

        info!("Responding to debug channel message ...");

        let reply = self.keywords.reply_for(&post.message).unwrap_or(replies::FALLBACK_REPLY);

        let reply = NewPost::new(&self.context.debug_channel.id, reply).with_root_id(&post.id);
        self.chat.create_post(&reply).await?;

        Ok(())
    }

    async fn handle_main_post(&self, post: &Post) -> Void {
        info!("Deleting main channel message {} ...", post.id);

        if let Some(age) = post.age_at(Utc::now()) {
            debug!("Message {} was posted {} ms ago.", post.id, age.num_milliseconds());
        }

        self.chat.delete_post(&post.id).await
    }
}
