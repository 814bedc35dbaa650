use std::time::Duration;

use serenity::all::{
    ButtonStyle, ChannelType, CommandOptionType, ComponentInteractionCollector, Context,
    CreateActionRow, CreateButton, CreateCommand, CreateCommandOption, CreateEmbed,
    CreateInteractionResponse, EditInteractionResponse, Permissions, ResolvedValue, Timestamp,
};
use tracing::{error, info};

use crate::channel_name::bump_trailing_number;
use crate::state::BotState;

use super::respond::{Reply, Responder};
use super::{find_option, rename_channel};

const CONFIRM_ID: &str = "channel_number:confirm";
const CANCEL_ID: &str = "channel_number:cancel";
const CONFIRM_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    Canceled,
    TimedOut,
    Failed,
}

impl Outcome {
    fn describe(self, old_name: &str, new_name: &str) -> String {
        match self {
            Self::Done => format!("✅ Renamed **{}** → **{}**.", old_name, new_name),
            Self::Canceled => "❎ Canceled. The channel name was not changed.".to_string(),
            Self::TimedOut => "⏰ No answer within 30 seconds. Nothing was changed.".to_string(),
            Self::Failed => format!(
                "⚠️ Could not rename **{}**. Check the bot's permissions and that the name is valid.",
                old_name
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Choice {
    Confirm,
    Cancel,
    Timeout,
}

fn choice_for(custom_id: Option<&str>) -> Choice {
    match custom_id {
        Some(CONFIRM_ID) => Choice::Confirm,
        Some(_) => Choice::Cancel,
        None => Choice::Timeout,
    }
}

fn buttons(disabled: bool) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(CONFIRM_ID)
            .label("Confirm")
            .style(ButtonStyle::Success)
            .disabled(disabled),
        CreateButton::new(CANCEL_ID)
            .label("Cancel")
            .style(ButtonStyle::Secondary)
            .disabled(disabled),
    ])]
}

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
    let Some(old_name) = channel.name.clone() else {
        return responder
            .reply(ctx, Reply::ephemeral_text("❌ Could not read the channel name."))
            .await;
    };
    let new_name = bump_trailing_number(&old_name);

    responder
        .reply(
            ctx,
            Reply::new()
                .content(format!(
                    "Rename **{}** → **{}**?",
                    old_name, new_name
                ))
                .components(buttons(false))
                .ephemeral(true),
        )
        .await?;
    let message = command.get_response(&ctx.http).await?;

    /* Presses by anyone but the invoking user are ignored. */
    let press = ComponentInteractionCollector::new(ctx)
        .author_id(command.user.id)
        .message_id(message.id)
        .filter(|press| press.data.custom_id == CONFIRM_ID || press.data.custom_id == CANCEL_ID)
        .timeout(CONFIRM_TIMEOUT)
        .await;

    if let Some(press) = &press {
        press
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await?;
    }

    let outcome = match choice_for(press.as_ref().map(|press| press.data.custom_id.as_str())) {
        Choice::Timeout => Outcome::TimedOut,
        Choice::Cancel => Outcome::Canceled,
        Choice::Confirm => {
            let reason = format!("Renamed by {}", command.user.tag());
            match rename_channel(ctx, channel.id, &new_name, &reason).await {
                Ok(()) => Outcome::Done,
                Err(why) => {
                    error!("Failed to rename {} to {}: {:?}", old_name, new_name, why);
                    Outcome::Failed
                }
            }
        }
    };

    command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new()
                .content(outcome.describe(&old_name, &new_name))
                .components(buttons(true)),
        )
        .await?;

    if outcome == Outcome::Done {
        info!("{} renamed {} to {}", command.user.tag(), old_name, new_name);

        bot.discord_send_log(
            CreateEmbed::new()
                .title("🔢 Channel number bumped")
                .description(format!("**{}** renamed a channel.", command.user.tag()))
                .field("Old name", &old_name, true)
                .field("New name", &new_name, true)
                .colour(0x00AE86)
                .timestamp(Timestamp::now()),
        )
        .await;
    }

    Ok(())
}

pub fn register() -> CreateCommand {
    CreateCommand::new("channel-number")
        .description("Add one to the number at the end of a channel name.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Channel, "channel", "Channel to rename")
                .required(true)
                .channel_types(vec![ChannelType::Text]),
        )
        .default_member_permissions(Permissions::MANAGE_CHANNELS)
}
