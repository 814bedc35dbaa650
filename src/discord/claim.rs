use std::time::Instant;

use serenity::all::{
    ComponentInteraction, Context, CreateEmbed, CreateMessage, EditInteractionResponse, Timestamp,
};
use tracing::{info, warn};

use crate::state::BotState;

use super::global_drop::drop_embed;

pub async fn run(bot: &BotState, ctx: &Context, component: &ComponentInteraction, drop_id: &str) {
    if let Err(why) = component.defer_ephemeral(&ctx.http).await {
        warn!("[{}] Failed to acknowledge claim: {:?}", drop_id, why);
        return;
    }

    let Some(claimed) = bot.drop_claim(drop_id, Instant::now()).await else {
        let _ = component
            .edit_response(
                &ctx.http,
                EditInteractionResponse::new().content("This drop is no longer available."),
            )
            .await;
        return;
    };

    let delivered = match component
        .user
        .direct_message(&ctx.http, CreateMessage::new().embed(drop_embed(&claimed.post)))
        .await
    {
        Ok(_) => true,
        Err(why) => {
            warn!(
                "[{}] Failed to DM {}: {:?}",
                drop_id,
                component.user.tag(),
                why
            );
            false
        }
    };

    let content = if delivered {
        "📬 Sent to your DMs!"
    } else {
        "⚠️ I could not DM you. Allow direct messages from server members and try again."
    };
    let _ = component
        .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await;

    info!(
        "[{}] Claimed by {} (claim #{}, delivered: {})",
        drop_id,
        component.user.tag(),
        claimed.claims,
        delivered
    );

    bot.discord_send_log(
        CreateEmbed::new()
            .title("🎁 Drop claimed")
            .description(format!(
                "**{}** claimed **{}**.",
                component.user.tag(),
                claimed.post.title
            ))
            .field("Claims", claimed.claims.to_string(), true)
            .field("Delivered", if delivered { "yes" } else { "no" }, true)
            .colour(0x00AE86)
            .timestamp(Timestamp::now()),
    )
    .await;
}
