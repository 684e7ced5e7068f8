//! Onboarding of newly created users.

use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        replies,
        types::{NewPost, Void},
    },
    interaction::context::BotContext,
    service::chat::ChatClient,
};

/// Greet a new user with the onboarding script in a direct channel.
///
/// If the direct channel cannot be opened, a single notice is posted to the debug channel and
/// nothing is sent to the user. The script messages are sent in order, separated by the configured
/// delay; the first failed send aborts the rest of the script.
///
/// This blocks the caller for the whole script, so a second new user queues behind the first.
#[instrument(skip(context, chat))]
pub async fn onboard_user(context: &BotContext, chat: &ChatClient, user_id: &str) -> Void {
    info!("New user {} ...", user_id);

    // Open the direct channel.

    let channel = match chat.create_direct_channel(&context.bot_user.id, user_id).await {
        Ok(channel) => channel,
        Err(err) => {
            error!("Failed to establish a direct channel to {}: {}", user_id, err);

            let notice = NewPost::new(&context.debug_channel.id, replies::onboarding_failed_notice(user_id));
            chat.create_post(&notice).await?;

            return Ok(());
        }
    };

    // The username is only used for the greeting.

    let username = match chat.get_user(user_id).await {
        Ok(user) => Some(user.username),
        Err(err) => {
            warn!("Failed to get user {}; greeting without a name: {}", user_id, err);
            None
        }
    };

    // Send the script.

    let delay = context.config.onboarding_delay();
    let script = replies::onboarding_script(username.as_deref());
    let total = script.len();

    for (index, message) in script.into_iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }

        chat.create_post(&NewPost::new(&channel.id, message))
            .await
            .map_err(|err| err.context(format!("Onboarding of {user_id} aborted after {index} of {total} messages")))?;
    }

    info!("Onboarded user {}.", user_id);

    Ok(())
}
