use crate::utils::discord_timestamp::{discord_timestamp, TimestampStyle};

use super::submission::{Artifact, Submission, SubmissionKind};

/// The rendered review-channel message. Derived deterministically from a
/// [`Submission`] and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    content: String,
    attachment_urls: Vec<String>,
}

impl Notice {
    pub fn render(submission: &Submission) -> Notice {
        let mut content = format!(
            "{emoji} **{label}** submission from <@{id}> ({name})\nSubmitted: {timestamp}",
            emoji = submission.kind.label_emoji(),
            label = submission.kind,
            id = submission.actor.id,
            name = submission.actor.display_name,
            timestamp = discord_timestamp(submission.submitted_at, TimestampStyle::ShortDateTime),
        );

        let mut details = Vec::new();

        if let Artifact::Text(modifiers) = &submission.fields.primary {
            details.push(format!("🔧 Modifiers: {modifiers}"));
        }

        match (&submission.kind, &submission.fields.notes) {
            // Matches the established review-channel format: loot submissions
            // always carry a notes line, defaulting to "None".
            (SubmissionKind::LootAndModifiers, notes) => {
                details.push(format!("📝 Notes: {}", notes.as_deref().unwrap_or("None")));
            }
            (_, Some(notes)) => details.push(format!("📝 Notes: {notes}")),
            (_, None) => {}
        }

        if !details.is_empty() {
            content.push_str("\n\n");
            content.push_str(&details.join("\n"));
        }

        Notice {
            content,
            attachment_urls: submission
                .attachment_urls()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// In stable forwarding order: primary, secondary, then extras.
    pub fn attachment_urls(&self) -> &[String] {
        &self.attachment_urls
    }
}
