use poise::{CreateReply, FrameworkError};
use tracing::{error, warn};

use crate::commands::{CommandError, Context};

pub async fn handle_error(error: FrameworkError<'_, crate::BotState, CommandError>) {
    use FrameworkError::*;

    match error {
        Setup { error, .. } => {
            error!("Error in user data setup: {}", error);
        }

        EventHandler { error, event, .. } => {
            error!(
                "Error in the {} event handler: {}",
                event.snake_case_name(),
                error
            );
        }

        Command { error, ctx, .. } => match error {
            CommandError::User { message } => {
                reply_with_error(ctx, &message).await;
            }

            CommandError::Internal { message } => {
                reply_with_internal_error(ctx, &message).await;
                error!("Internal error: {}", message);
            }

            CommandError::Serenity(error) => {
                reply_with_internal_error(ctx, &error.to_string()).await;
                error!("Serenity error: {}", error);
            }
        },

        ArgumentParse {
            error, input, ctx, ..
        } => {
            let response = if let Some(input) = input {
                format!(
                    "**Sorry, cannot parse `{}` as an argument: {}**",
                    input, error
                )
            } else {
                format!("**{}**", error)
            };

            reply_with_error(ctx, &response).await;
        }

        CommandStructureMismatch {
            description, ctx, ..
        } => {
            error!(
                "Failed to deserialize interaction arguments for `{}`: {}",
                ctx.command.qualified_name, description
            );
        }

        CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            reply_with_error(
                ctx,
                &format!(
                    "Sorry, you're too fast. Please try again in {} s.",
                    remaining_cooldown.as_secs()
                ),
            )
            .await;
        }

        MissingBotPermissions { ctx, .. } => {
            reply_with_error(
                ctx,
                "Sorry, the bot lacks permissions necessary to execute this command.",
            )
            .await;
        }

        MissingUserPermissions { ctx, .. } => {
            reply_with_error(
                ctx,
                "Sorry, you don't have permissions necessary to run this command.",
            )
            .await;
        }

        GuildOnly { ctx, .. } => {
            reply_with_error(ctx, "Sorry, but you can only run this command in a server.").await;
        }

        UnknownInteraction { interaction, .. } => {
            warn!("Received an unknown interaction: {:?}", interaction);
        }

        error => {
            error!("Unknown error: {}", error);
        }
    }
}

async fn reply_with_error(ctx: Context<'_>, error_message: &str) {
    if let Err(send_error) = poise::send_reply(
        ctx,
        CreateReply::default()
            .content(error_message)
            .ephemeral(true),
    )
    .await
    {
        error!(
            "Failed to send an error message to the user: {}\nThe message was: {}",
            send_error, error_message
        );
    }
}

async fn reply_with_internal_error(ctx: Context<'_>, error_message: &str) {
    reply_with_error(
        ctx,
        &format!(
            "Sorry, there was an internal error while executing your command: {}",
            error_message
        ),
    )
    .await;
}
