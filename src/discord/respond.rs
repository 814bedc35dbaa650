use serenity::all::{
    CommandInteraction, Context, CreateActionRow, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateQuickModal,
    EditInteractionResponse, QuickModalResponse,
};

/// Where a command interaction stands with Discord. Every reply goes through
/// [`ResponseState::reply_action`] so the "already answered?" check lives in one place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseState {
    Unanswered,
    Deferred,
    Replied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseAction {
    Create,
    EditDeferred,
    FollowUp,
}

impl ResponseState {
    pub fn reply_action(self) -> ResponseAction {
        match self {
            Self::Unanswered => ResponseAction::Create,
            Self::Deferred => ResponseAction::EditDeferred,
            Self::Replied => ResponseAction::FollowUp,
        }
    }

    pub fn can_defer(self) -> bool {
        self == Self::Unanswered
    }
}

#[derive(Clone, Debug, Default)]
pub struct Reply {
    content: Option<String>,
    embeds: Vec<CreateEmbed>,
    components: Vec<CreateActionRow>,
    ephemeral: bool,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the common "only you can see this" text reply.
    pub fn ephemeral_text(content: impl Into<String>) -> Self {
        Self::new().content(content).ephemeral(true)
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn components(mut self, components: Vec<CreateActionRow>) -> Self {
        self.components = components;
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }
}

pub struct Responder<'a> {
    interaction: &'a CommandInteraction,
    state: ResponseState,
}

impl<'a> Responder<'a> {
    pub fn new(interaction: &'a CommandInteraction) -> Self {
        Self {
            interaction,
            state: ResponseState::Unanswered,
        }
    }

    pub fn interaction(&self) -> &'a CommandInteraction {
        self.interaction
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    pub async fn defer(&mut self, ctx: &Context, ephemeral: bool) -> serenity::Result<()> {
        if !self.state.can_defer() {
            return Ok(());
        }

        self.interaction
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Defer(
                    CreateInteractionResponseMessage::new().ephemeral(ephemeral),
                ),
            )
            .await?;
        self.state = ResponseState::Deferred;

        Ok(())
    }

    /// Sends `reply` as the initial response, as the edit of a deferred response, or as a
    /// follow-up, depending on the current state. Ephemerality of an edited deferred response
    /// was fixed when deferring.
    pub async fn reply(&mut self, ctx: &Context, reply: Reply) -> serenity::Result<()> {
        match self.state.reply_action() {
            ResponseAction::Create => {
                let mut message = CreateInteractionResponseMessage::new()
                    .embeds(reply.embeds)
                    .components(reply.components)
                    .ephemeral(reply.ephemeral);
                if let Some(content) = reply.content {
                    message = message.content(content);
                }

                self.interaction
                    .create_response(&ctx.http, CreateInteractionResponse::Message(message))
                    .await?;
            }
            ResponseAction::EditDeferred => {
                let mut edit = EditInteractionResponse::new()
                    .embeds(reply.embeds)
                    .components(reply.components);
                if let Some(content) = reply.content {
                    edit = edit.content(content);
                }

                self.interaction.edit_response(&ctx.http, edit).await?;
            }
            ResponseAction::FollowUp => {
                let mut followup = CreateInteractionResponseFollowup::new()
                    .embeds(reply.embeds)
                    .components(reply.components)
                    .ephemeral(reply.ephemeral);
                if let Some(content) = reply.content {
                    followup = followup.content(content);
                }

                self.interaction.create_followup(&ctx.http, followup).await?;
            }
        }
        self.state = ResponseState::Replied;

        Ok(())
    }

    /// Shows a modal as the initial response and waits for it to be submitted.
    /// Afterwards the interaction counts as replied, also when the modal timed out.
    pub async fn quick_modal(
        &mut self,
        ctx: &Context,
        modal: CreateQuickModal,
    ) -> serenity::Result<Option<QuickModalResponse>> {
        if self.state != ResponseState::Unanswered {
            return Ok(None);
        }

        let response = self.interaction.quick_modal(ctx, modal).await?;
        self.state = ResponseState::Replied;

        Ok(response)
    }
}
