//! The submission intake core.
//!
//! Everything in here is pure: inbound platform events are turned into plans
//! of [`Action`]s without touching the network. The host layer (commands and
//! the serenity event handler) is responsible for executing the plans.

mod error;
mod event;
mod notice;
mod session;
mod submission;

pub use error::IntakeError;
pub use event::{handle, plan_forward, plan_rejection, Action, IntakeEvent, IntakePolicy, SourceMessage};
pub use notice::Notice;
pub use session::{
    CollectSession, SessionKey, SessionOutcome, SessionReply, SessionStore, Step, RESPONSE_WAIT,
};
pub use submission::{
    matches_skip_phrase, Actor, Artifact, Submission, SubmissionFields, SubmissionKind,
    LOOT_SKIP_PHRASE, NOTES_SKIP_PHRASE,
};
