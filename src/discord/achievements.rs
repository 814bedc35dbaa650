use serenity::all::{
    ChannelType, CommandOptionType, Context, CreateCommand, CreateCommandOption, CreateEmbed,
    Permissions, ResolvedValue, Timestamp,
};
use tracing::{error, info};

use crate::channel_name::with_trailing_number;
use crate::state::BotState;

use super::respond::{Reply, Responder};
use super::{find_option, rename_channel};

pub async fn run(
    bot: &BotState,
    ctx: &Context,
    responder: &mut Responder<'_>,
) -> serenity::Result<()> {
    let command = responder.interaction();
    let options = command.data.options();

    let channel = match find_option(&options, "channel") {
        Some(ResolvedValue::Channel(channel)) if channel.kind == ChannelType::Text => *channel,
        _ => {
            return responder
                .reply(ctx, Reply::ephemeral_text("❌ Please pick a text channel."))
                .await;
        }
    };
    let number = match find_option(&options, "number") {
        Some(ResolvedValue::Integer(number)) if *number >= 0 => *number as u64,
        _ => {
            return responder
                .reply(ctx, Reply::ephemeral_text("❌ The number must be 0 or larger."))
                .await;
        }
    };
    let Some(old_name) = channel.name.clone() else {
        return responder
            .reply(ctx, Reply::ephemeral_text("❌ Could not read the channel name."))
            .await;
    };
    let new_name = with_trailing_number(&old_name, number);

    /* Channel renames are heavily rate limited; the edit can wait minutes before it goes out. */
    responder.defer(ctx, true).await?;

    let reason = format!("Renamed by {}", command.user.tag());
    if let Err(why) = rename_channel(ctx, channel.id, &new_name, &reason).await {
        error!("Failed to rename {} to {}: {:?}", old_name, new_name, why);
        return responder
            .reply(
                ctx,
                Reply::ephemeral_text(
                    "⚠️ Failed to rename the channel. Check that the bot can manage this channel.",
                ),
            )
            .await;
    }

    responder
        .reply(
            ctx,
            Reply::ephemeral_text(format!(
                "✅ Renamed **{}** → **{}**.",
                old_name, new_name
            )),
        )
        .await?;
    info!("{} renamed {} to {}", command.user.tag(), old_name, new_name);

    bot.discord_send_log(
        CreateEmbed::new()
            .title("🏆 Channel renamed")
            .description(format!("**{}** renamed a channel.", command.user.tag()))
            .field("Old name", &old_name, true)
            .field("New name", &new_name, true)
            .colour(0x00AE86)
            .timestamp(Timestamp::now()),
    )
    .await;

    Ok(())
}

pub fn register() -> CreateCommand {
    CreateCommand::new("achievements")
        .description("Set the number at the end of a channel name.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Channel, "channel", "Channel to rename")
                .required(true)
                .channel_types(vec![ChannelType::Text]),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "number",
                "New number, for example 10",
            )
            .required(true)
            .min_int_value(0),
        )
        .default_member_permissions(Permissions::MANAGE_CHANNELS)
}
