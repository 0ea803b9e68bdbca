mod cleanup;
mod conversational;
mod direct;

use crate::{intake::IntakeError, BotState};

/// The command set for deployments where every field travels in the slash
/// command options.
pub fn direct_commands() -> Vec<poise::Command<BotState, CommandError>> {
    vec![
        direct::colostart(),
        direct::coloend(),
        direct::lootmodifiers(),
        direct::submit(),
        cleanup::cleanupcommands(),
    ]
}

/// The command set for deployments that collect fields one prompt at a time
/// in the intake channel.
pub fn conversational_commands() -> Vec<poise::Command<BotState, CommandError>> {
    vec![
        conversational::colostart(),
        conversational::coloend(),
        conversational::lootmodifiers(),
        cleanup::cleanupcommands(),
    ]
}

pub(crate) type CommandResult = Result<(), CommandError>;
pub(crate) type Context<'a> = poise::Context<'a, BotState, CommandError>;
pub(crate) type ApplicationContext<'a> = poise::ApplicationContext<'a, BotState, CommandError>;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

pub(crate) fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

/// Keeps `?` working in command bodies that execute intake plans.
impl From<IntakeError> for CommandError {
    fn from(err: IntakeError) -> CommandError {
        match err {
            IntakeError::Timeout | IntakeError::InvalidInput(_) | IntakeError::PermissionDenied => {
                CommandError::User {
                    message: format!("❌ {err}."),
                }
            }

            IntakeError::DeliveryFailure(_) | IntakeError::RegistrationFailure(_) => {
                CommandError::Internal {
                    message: err.to_string(),
                }
            }
        }
    }
}
