use std::sync::Arc;

use serenity::all::{ChannelId, CreateEmbed, CreateMessage, Http, UserId};
use tracing::{info, warn};

use super::BotState;

impl BotState {
    async fn discord_http(&self) -> Option<Arc<Http>> {
        let this = self.0.read().await;

        this.discord.as_ref().map(|ctx| ctx.http.clone())
    }

    /// Posts to `LOG_CHANNEL_ID`. Does nothing when no log channel is configured.
    pub async fn discord_send_log(&self, embed: CreateEmbed) {
        let Some(channel_id) = self.0.read().await.config.log_channel_id else {
            return;
        };
        let Some(http) = self.discord_http().await else {
            warn!("Discord is not connected; dropping log entry");
            return;
        };

        if let Err(why) = ChannelId::new(channel_id)
            .send_message(&http, CreateMessage::new().embed(embed))
            .await
        {
            warn!("Failed to send to log channel {}: {:?}", channel_id, why);
        }
    }

    /// Keeps a copy of every drop in the DMs of `DROP_ARCHIVE_USER_ID`.
    pub async fn discord_archive_drop(&self, title: &str, embed: CreateEmbed) {
        let Some(user_id) = self.0.read().await.config.drop_archive_user_id else {
            return;
        };
        let Some(http) = self.discord_http().await else {
            return;
        };

        match UserId::new(user_id)
            .direct_message(&http, CreateMessage::new().embed(embed))
            .await
        {
            Ok(_) => info!("Archived drop \"{}\" to DM", title),
            Err(why) => warn!("Failed to archive drop \"{}\": {:?}", title, why),
        }
    }
}
