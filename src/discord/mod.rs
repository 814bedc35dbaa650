use serenity::all::{
    ChannelId, Command, CommandInteraction, EditChannel, GuildId, Interaction, Ready,
    ResolvedOption, ResolvedValue,
};
use serenity::{async_trait, prelude::*};
use tracing::{error, info, warn};

use crate::drops;
use crate::state::BotState;

use respond::{Reply, Responder};

mod achievements;
mod bot_log;
mod channel_number;
mod claim;
mod global_drop;
mod respond;

fn find_option<'a>(
    options: &'a [ResolvedOption<'a>],
    name: &str,
) -> Option<&'a ResolvedValue<'a>> {
    options
        .iter()
        .find(|option| option.name == name)
        .map(|option| &option.value)
}

async fn rename_channel(
    ctx: &Context,
    channel_id: ChannelId,
    name: &str,
    reason: &str,
) -> serenity::Result<()> {
    channel_id
        .edit(&ctx.http, EditChannel::new().name(name).audit_log_reason(reason))
        .await
        .map(|_| ())
}

async fn register_commands(bot: &BotState, ctx: &Context) {
    let commands = vec![
        achievements::register(),
        channel_number::register(),
        global_drop::register(),
    ];

    /* Guild commands show up immediately; global ones can take up to an hour. */
    let result = match bot.config().await.guild_id {
        Some(guild_id) => GuildId::new(guild_id).set_commands(&ctx.http, commands).await,
        None => Command::set_global_commands(&ctx.http, commands).await,
    };

    match result {
        Ok(commands) => info!("Registered {} commands", commands.len()),
        Err(why) => error!("Error registering commands: {why:?}"),
    }
}

async fn run_command(bot: &BotState, ctx: &Context, command: &CommandInteraction) {
    let mut responder = Responder::new(command);

    let result = match command.data.name.as_str() {
        "achievements" => achievements::run(bot, ctx, &mut responder).await,
        "channel-number" => channel_number::run(bot, ctx, &mut responder).await,
        "global-drop" => global_drop::run(bot, ctx, &mut responder).await,
        name => {
            warn!("Unknown command: {}", name);
            responder
                .reply(
                    ctx,
                    Reply::ephemeral_text(format!("❌ The command \"{}\" is not registered.", name)),
                )
                .await
        }
    };

    if let Err(why) = result {
        error!(
            "Error executing command {} ({:?}): {:?}",
            command.data.name,
            responder.state(),
            why
        );

        if let Err(why) = responder
            .reply(
                ctx,
                Reply::ephemeral_text("⚠️ Something went wrong while running this command."),
            )
            .await
        {
            error!("Failed to notify user about error: {:?}", why);
        }
    }
}

#[async_trait]
impl EventHandler for BotState {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Connected to Discord as {}", ready.user.name);

        /* Gateway reconnects fire ready again; only set up once. */
        if !self.set_if_startup().await {
            return;
        }
        self.set_discord(ctx.clone()).await;

        register_commands(self, &ctx).await;
        bot_log::run(self, &ready).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => run_command(self, &ctx, &command).await,
            Interaction::Component(component) => {
                /* Other buttons belong to a running collector. */
                if let Some(drop_id) = drops::parse_button_id(&component.data.custom_id) {
                    claim::run(self, &ctx, &component, drop_id).await;
                }
            }
            _ => {}
        }
    }
}
