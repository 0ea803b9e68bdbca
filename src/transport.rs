use std::sync::Arc;

use async_trait::async_trait;
use poise::{
    serenity_prelude::{
        self as serenity, ChannelId, CreateAttachment, CreateMessage, GuildId, Http, UserId,
    },
    CreateReply,
};
use tracing::warn;

use crate::{
    commands::ApplicationContext,
    intake::{Action, IntakeError, Notice, SourceMessage},
};

/// The outbound half of the host layer: everything a plan may ask for.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn reply_private(&self, to: UserId, text: &str) -> Result<(), IntakeError>;
    async fn forward_notice(&self, notice: &Notice) -> Result<(), IntakeError>;
    async fn delete_source(&self, source: SourceMessage) -> Result<(), IntakeError>;
    async fn clear_commands(&self) -> Result<(), IntakeError>;
}

/// Executes a plan in order.
///
/// A notice that fails to deliver aborts the remainder of the plan, so a
/// source message is never deleted before its notice is confirmed. A failed
/// acknowledgement or deletion is logged and skipped.
pub async fn run_plan<T: Transport + ?Sized>(
    transport: &T,
    plan: Vec<Action>,
) -> Result<(), IntakeError> {
    for action in plan {
        match action {
            Action::Reply { to, text } => {
                if let Err(err) = transport.reply_private(to, &text).await {
                    warn!("Could not deliver a reply to user {to}: {err}");
                }
            }

            Action::ForwardNotice(notice) => transport.forward_notice(&notice).await?,

            Action::DeleteSource(source) => {
                if let Err(err) = transport.delete_source(source).await {
                    warn!("Could not delete source message {}: {err}", source.message);
                }
            }

            Action::ClearCommands => transport.clear_commands().await?,
        }
    }

    Ok(())
}

/// Where the command set lives, which is also where cleanup clears it from.
#[derive(Clone, Debug)]
pub enum RegistrationScope {
    Global,
    Guilds(Vec<GuildId>),
}

/// Production transport over the serenity HTTP client. Private replies go out
/// as DMs.
pub struct DiscordTransport {
    http: Arc<Http>,
    review_channel: ChannelId,
    registration_scope: RegistrationScope,
}

impl DiscordTransport {
    pub fn new(
        http: Arc<Http>,
        review_channel: ChannelId,
        registration_scope: RegistrationScope,
    ) -> DiscordTransport {
        DiscordTransport {
            http,
            review_channel,
            registration_scope,
        }
    }
}

fn transport_err(err: serenity::Error) -> IntakeError {
    IntakeError::DeliveryFailure(err.to_string())
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn reply_private(&self, to: UserId, text: &str) -> Result<(), IntakeError> {
        let dm = to
            .create_dm_channel(&self.http)
            .await
            .map_err(transport_err)?;
        dm.id.say(&self.http, text).await.map_err(transport_err)?;
        Ok(())
    }

    async fn forward_notice(&self, notice: &Notice) -> Result<(), IntakeError> {
        let mut message = CreateMessage::new().content(notice.content());

        for url in notice.attachment_urls() {
            let file = CreateAttachment::url(&self.http, url)
                .await
                .map_err(transport_err)?;
            message = message.add_file(file);
        }

        self.review_channel
            .send_message(&self.http, message)
            .await
            .map_err(transport_err)?;
        Ok(())
    }

    async fn delete_source(&self, source: SourceMessage) -> Result<(), IntakeError> {
        source
            .channel
            .delete_message(&self.http, source.message)
            .await
            .map_err(transport_err)
    }

    async fn clear_commands(&self) -> Result<(), IntakeError> {
        let registration_err =
            |err: serenity::Error| IntakeError::RegistrationFailure(err.to_string());

        match &self.registration_scope {
            RegistrationScope::Global => {
                serenity::Command::set_global_commands(&self.http, Vec::new())
                    .await
                    .map_err(registration_err)?;
            }

            RegistrationScope::Guilds(guilds) => {
                for guild in guilds {
                    guild
                        .set_commands(&self.http, Vec::new())
                        .await
                        .map_err(registration_err)?;
                }
            }
        }

        Ok(())
    }
}

/// Transport for plans triggered by a slash command: private replies become
/// ephemeral interaction responses instead of DMs, everything else delegates
/// to the shared [`DiscordTransport`].
pub struct InteractionTransport<'a> {
    ctx: ApplicationContext<'a>,
    inner: Arc<DiscordTransport>,
}

impl<'a> InteractionTransport<'a> {
    pub fn new(
        ctx: ApplicationContext<'a>,
        inner: Arc<DiscordTransport>,
    ) -> InteractionTransport<'a> {
        InteractionTransport { ctx, inner }
    }
}

#[async_trait]
impl Transport for InteractionTransport<'_> {
    async fn reply_private(&self, _to: UserId, text: &str) -> Result<(), IntakeError> {
        self.ctx
            .send(CreateReply::default().ephemeral(true).content(text))
            .await
            .map_err(transport_err)?;
        Ok(())
    }

    async fn forward_notice(&self, notice: &Notice) -> Result<(), IntakeError> {
        self.inner.forward_notice(notice).await
    }

    async fn delete_source(&self, source: SourceMessage) -> Result<(), IntakeError> {
        self.inner.delete_source(source).await
    }

    async fn clear_commands(&self) -> Result<(), IntakeError> {
        self.inner.clear_commands().await
    }
}
