/// Failure modes of a single submission attempt.
///
/// All of these are recovered at the boundary of one attempt and reported to
/// the user; none of them take the bot down.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("no response arrived within the wait window")]
    Timeout,

    #[error("{0}")]
    InvalidInput(String),

    #[error("could not deliver the notice: {0}")]
    DeliveryFailure(String),

    #[error("you do not have permission to use this command")]
    PermissionDenied,

    #[error("command registration failed: {0}")]
    RegistrationFailure(String),
}

impl IntakeError {
    pub fn invalid_input(reason: impl Into<String>) -> IntakeError {
        IntakeError::InvalidInput(reason.into())
    }
}
