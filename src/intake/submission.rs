use poise::serenity_prelude::UserId;
use strum::Display;
use time::OffsetDateTime;

use super::error::IntakeError;

/// Saying this (case-insensitively) in place of the loot screenshot marks it
/// as intentionally omitted.
pub const LOOT_SKIP_PHRASE: &str = "no loot";
/// Saying this (case-insensitively) in place of the notes marks them as
/// intentionally omitted.
pub const NOTES_SKIP_PHRASE: &str = "no notes";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum SubmissionKind {
    #[strum(serialize = "Start")]
    Start,
    #[strum(serialize = "End")]
    End,
    #[strum(serialize = "Loot & Modifiers")]
    LootAndModifiers,
    #[strum(serialize = "Generic")]
    Generic,
}

impl SubmissionKind {
    pub fn label_emoji(&self) -> &'static str {
        use SubmissionKind::*;

        match self {
            Start | End => "📥",
            LootAndModifiers => "📤",
            Generic => "📬",
        }
    }
}

/// The submitting user, as far as the intake core cares about them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub display_name: String,
}

/// An attachment-or-text field of a submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Artifact {
    Attachment(String),
    Text(String),
    #[default]
    Absent,
}

impl Artifact {
    pub fn is_absent(&self) -> bool {
        matches!(self, Artifact::Absent)
    }

    pub fn attachment_url(&self) -> Option<&str> {
        match self {
            Artifact::Attachment(url) => Some(url),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Artifact::Text(content) => Some(content),
            _ => None,
        }
    }
}

/// Whatever the user supplied, before validation.
///
/// `primary` is the start/end screenshot or the modifiers artifact;
/// `secondary` is the loot screenshot. A generic multi-attachment message
/// carries its remaining attachments in `extra_attachments`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionFields {
    pub primary: Artifact,
    pub secondary: Artifact,
    pub extra_attachments: Vec<String>,
    pub notes: Option<String>,
}

/// One validated user submission. Constructing it through [`Submission::new`]
/// is the only way, so an invalid submission cannot be forwarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub kind: SubmissionKind,
    pub actor: Actor,
    pub fields: SubmissionFields,
    pub submitted_at: OffsetDateTime,
}

impl Submission {
    pub fn new(
        kind: SubmissionKind,
        actor: Actor,
        fields: SubmissionFields,
        submitted_at: OffsetDateTime,
    ) -> Result<Submission, IntakeError> {
        use SubmissionKind::*;

        match kind {
            Start | End => {
                if fields.primary.attachment_url().is_none() {
                    return Err(IntakeError::invalid_input(
                        "a screenshot attachment is required",
                    ));
                }
                if !fields.secondary.is_absent() || !fields.extra_attachments.is_empty() {
                    return Err(IntakeError::invalid_input(
                        "only a single screenshot is accepted",
                    ));
                }
            }

            LootAndModifiers => {
                if fields.primary.is_absent() {
                    return Err(IntakeError::invalid_input(
                        "a modifiers screenshot or modifiers text is required",
                    ));
                }
                if fields.secondary.text().is_some() {
                    return Err(IntakeError::invalid_input(
                        "the loot field must be a screenshot attachment",
                    ));
                }
                if !fields.extra_attachments.is_empty() {
                    return Err(IntakeError::invalid_input(
                        "only the modifiers and loot screenshots are accepted",
                    ));
                }
            }

            Generic => {
                if fields.primary.attachment_url().is_none()
                    && fields.secondary.attachment_url().is_none()
                {
                    return Err(IntakeError::invalid_input(
                        "at least one attachment is required",
                    ));
                }
            }
        }

        Ok(Submission {
            kind,
            actor,
            fields,
            submitted_at,
        })
    }

    /// Attachment URLs in forwarding order: primary, secondary, then extras.
    pub fn attachment_urls(&self) -> Vec<&str> {
        [&self.fields.primary, &self.fields.secondary]
            .into_iter()
            .filter_map(Artifact::attachment_url)
            .chain(self.fields.extra_attachments.iter().map(String::as_str))
            .collect()
    }
}

pub fn matches_skip_phrase(input: &str, phrase: &str) -> bool {
    input.trim().eq_ignore_ascii_case(phrase)
}
