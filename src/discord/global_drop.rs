use std::time::Duration;

use serenity::all::{
    ButtonStyle, CommandOptionType, Context, CreateActionRow, CreateButton, CreateCommand,
    CreateCommandOption, CreateEmbed, CreateEmbedFooter, CreateInputText,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateQuickModal,
    InputTextStyle, Permissions, ResolvedValue, Timestamp,
};
use tracing::info;

use crate::drops::{self, DropKind, DropPost};
use crate::state::BotState;

use super::find_option;
use super::respond::{Reply, Responder};

const MODAL_TIMEOUT: Duration = Duration::from_secs(120);
/* Embed field values are capped at 1024 characters. */
const MAX_CONTENT_LENGTH: u16 = 1024;

/// The public post members claim from.
pub(super) fn drop_embed(post: &DropPost) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title(&post.title)
        .description(&post.description)
        .colour(0x00AE86)
        .footer(CreateEmbedFooter::new(format!("Posted by {}", post.author)))
        .timestamp(Timestamp::now());

    match post.kind {
        DropKind::Image => embed.image(&post.payload),
        DropKind::File => embed.field("File", format!("[Download]({})", post.payload), false),
        DropKind::Link | DropKind::Text => embed.field("Drop", &post.payload, false),
    }
}

fn archive_embed(post: &DropPost) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title("📦 Global drop saved")
        .colour(0x0099ff)
        .field("Type", post.kind.as_str(), true)
        .field("Title", &post.title, true)
        .field("Description", &post.description, false)
        .footer(CreateEmbedFooter::new(format!("Posted by {}", post.author)))
        .timestamp(Timestamp::now());

    if post.kind.needs_attachment() {
        embed.field("Attachment", &post.payload, false)
    } else {
        embed.field("Content", &post.payload, false)
    }
}

fn claim_button(drop_id: &str) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![CreateButton::new(
        drops::button_id(drop_id),
    )
    .label("Claim")
    .style(ButtonStyle::Success)])]
}

fn content_modal(kind: DropKind) -> CreateQuickModal {
    let (title, label, style) = match kind {
        DropKind::Link => ("Enter link", "Link to hand out", InputTextStyle::Short),
        _ => ("Enter text", "Text to hand out", InputTextStyle::Paragraph),
    };

    CreateQuickModal::new(title)
        .timeout(MODAL_TIMEOUT)
        .field(CreateInputText::new(style, label, "content").max_length(MAX_CONTENT_LENGTH))
}

pub async fn run(
    bot: &BotState,
    ctx: &Context,
    responder: &mut Responder<'_>,
) -> serenity::Result<()> {
    let command = responder.interaction();
    let options = command.data.options();

    let kind = match find_option(&options, "type") {
        Some(ResolvedValue::String(value)) => DropKind::parse(value),
        _ => None,
    };
    let Some(kind) = kind else {
        return responder
            .reply(ctx, Reply::ephemeral_text("❌ Unknown drop type."))
            .await;
    };
    let attachment = match find_option(&options, "attachment") {
        Some(ResolvedValue::Attachment(attachment)) => Some(*attachment),
        _ => None,
    };
    let text = |name: &str| match find_option(&options, name) {
        Some(ResolvedValue::String(value)) => value.to_string(),
        _ => String::new(),
    };
    let (title, description) = (text("title"), text("description"));

    if let Err(why) = drops::validate_input(kind, attachment.is_some()) {
        return responder
            .reply(ctx, Reply::ephemeral_text(why.message()))
            .await;
    }

    let config = bot.config().await;
    let drop_id = drops::new_drop_id();
    let author = command.user.tag();

    let post = match attachment {
        Some(attachment) => {
            let post = DropPost {
                kind,
                title,
                description,
                payload: attachment.url.clone(),
                author,
            };
            bot.drop_register(drop_id.clone(), post.clone(), config.drop_ttl)
                .await;

            responder
                .reply(
                    ctx,
                    Reply::new()
                        .embed(drop_embed(&post))
                        .components(claim_button(&drop_id)),
                )
                .await?;
            post
        }
        None => {
            let Some(response) = responder.quick_modal(ctx, content_modal(kind)).await? else {
                return responder
                    .reply(ctx, Reply::ephemeral_text("⏰ Input timed out."))
                    .await;
            };

            let post = DropPost {
                kind,
                title,
                description,
                payload: response.inputs.first().cloned().unwrap_or_default(),
                author,
            };
            bot.drop_register(drop_id.clone(), post.clone(), config.drop_ttl)
                .await;

            response
                .interaction
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .embed(drop_embed(&post))
                            .components(claim_button(&drop_id)),
                    ),
                )
                .await?;
            post
        }
    };

    info!("[{}] {} posted {} drop \"{}\"", drop_id, post.author, post.kind, post.title);
    bot.discord_archive_drop(&post.title, archive_embed(&post))
        .await;

    Ok(())
}

pub fn register() -> CreateCommand {
    CreateCommand::new("global-drop")
        .description("Post a drop that members can claim.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "type", "Kind of drop")
                .required(true)
                .add_string_choice("📁 File", "file")
                .add_string_choice("🖼️ Image", "image")
                .add_string_choice("🔗 Link", "link")
                .add_string_choice("💬 Text", "text"),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "title", "Title of the drop")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "description",
                "Short description",
            )
            .required(true),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::Attachment,
            "attachment",
            "File or image, only for file and image drops",
        ))
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
}
