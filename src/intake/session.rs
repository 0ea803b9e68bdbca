use std::{collections::HashMap, sync::Mutex};

use poise::serenity_prelude::UserId;
use time::{Duration, OffsetDateTime};

use super::{
    error::IntakeError,
    event::SourceMessage,
    submission::{
        matches_skip_phrase, Actor, Artifact, Submission, SubmissionFields, SubmissionKind,
        LOOT_SKIP_PHRASE, NOTES_SKIP_PHRASE,
    },
};

/// How long the user has to answer each prompt.
pub const RESPONSE_WAIT: Duration = Duration::seconds(60);

/// Sessions are keyed per invocation, not per user, so a second concurrent
/// invocation by the same user opens a second session instead of corrupting
/// the first. Answers route to the most recently opened one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub actor: UserId,
    pub interaction: u64,
}

/// The field a conversational session is currently waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Screenshot,
    Modifiers,
    Loot,
    Notes,
}

impl Step {
    pub fn prompt(self) -> &'static str {
        use Step::*;

        match self {
            Screenshot => "Please post your screenshot as your next message in this channel.",
            Modifiers => {
                "Please post your modifiers screenshot, or describe your modifiers in text."
            }
            Loot => "Please post your loot screenshot, or say `no loot` to skip it.",
            Notes => "Any notes about the run? Say `no notes` to skip.",
        }
    }

    fn first(kind: SubmissionKind) -> Step {
        use SubmissionKind::*;

        match kind {
            Start | End | Generic => Step::Screenshot,
            LootAndModifiers => Step::Modifiers,
        }
    }
}

/// Ephemeral per-invocation collection state. Destroyed on completion,
/// timeout, or invalid input; never persisted.
#[derive(Clone, Debug)]
pub struct CollectSession {
    pub kind: SubmissionKind,
    pub actor: Actor,
    pub opened_at: OffsetDateTime,
    fields: SubmissionFields,
    step: Step,
    sources: Vec<SourceMessage>,
    deadline: OffsetDateTime,
}

/// A user message interpreted as the answer to the current prompt.
#[derive(Clone, Debug)]
pub struct SessionReply {
    pub attachment_url: Option<String>,
    pub text: String,
    pub source: SourceMessage,
}

#[derive(Debug)]
pub enum SessionOutcome {
    /// The session advanced; send the next prompt.
    NextPrompt(Step),
    /// All fields collected. Forward the submission, then delete the sources.
    Complete {
        submission: Submission,
        sources: Vec<SourceMessage>,
    },
    /// The answer was unusable; the session has been discarded.
    Rejected(IntakeError),
}

/// All live conversational sessions, with explicit deadlines. Expired entries
/// are collected by the session sweeper.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionKey, CollectSession>>,
}

impl SessionStore {
    pub fn new() -> SessionStore {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a session and returns the first prompt to send.
    pub fn open(
        &self,
        key: SessionKey,
        kind: SubmissionKind,
        actor: Actor,
        now: OffsetDateTime,
    ) -> Step {
        let step = Step::first(kind);
        let session = CollectSession {
            kind,
            actor,
            opened_at: now,
            fields: SubmissionFields::default(),
            step,
            sources: Vec::new(),
            deadline: now + RESPONSE_WAIT,
        };

        self.sessions
            .lock()
            .expect("Session store mutex should not be poisoned")
            .insert(key, session);

        step
    }

    /// Feeds a user message to the actor's most recently opened live session.
    /// Returns `None` when the actor has no live session, in which case the
    /// message falls through to ambient intake.
    pub fn answer(
        &self,
        actor: UserId,
        reply: SessionReply,
        now: OffsetDateTime,
    ) -> Option<SessionOutcome> {
        let mut sessions = self
            .sessions
            .lock()
            .expect("Session store mutex should not be poisoned");

        let key = sessions
            .iter()
            .filter(|(key, session)| key.actor == actor && session.deadline > now)
            .max_by_key(|(key, session)| (session.opened_at, key.interaction))
            .map(|(key, _)| *key)?;

        let mut session = sessions
            .remove(&key)
            .expect("Key was just taken from the map");

        let next = match session.step {
            Step::Screenshot => match reply.attachment_url {
                Some(url) => {
                    session.fields.primary = Artifact::Attachment(url);
                    session.sources.push(reply.source);
                    None
                }
                None => {
                    return Some(SessionOutcome::Rejected(IntakeError::invalid_input(
                        "expected a screenshot attachment",
                    )));
                }
            },

            Step::Modifiers => {
                if let Some(url) = reply.attachment_url {
                    session.fields.primary = Artifact::Attachment(url);
                } else if !reply.text.trim().is_empty() {
                    session.fields.primary = Artifact::Text(reply.text.trim().to_owned());
                } else {
                    return Some(SessionOutcome::Rejected(IntakeError::invalid_input(
                        "expected a modifiers screenshot or modifiers text",
                    )));
                }
                session.sources.push(reply.source);
                Some(Step::Loot)
            }

            Step::Loot => {
                if let Some(url) = reply.attachment_url {
                    session.fields.secondary = Artifact::Attachment(url);
                } else if matches_skip_phrase(&reply.text, LOOT_SKIP_PHRASE) {
                    session.fields.secondary = Artifact::Absent;
                } else {
                    return Some(SessionOutcome::Rejected(IntakeError::invalid_input(
                        "expected a loot screenshot or `no loot`",
                    )));
                }
                session.sources.push(reply.source);
                Some(Step::Notes)
            }

            Step::Notes => {
                let text = reply.text.trim();
                if matches_skip_phrase(text, NOTES_SKIP_PHRASE) {
                    session.fields.notes = None;
                } else if !text.is_empty() {
                    session.fields.notes = Some(text.to_owned());
                } else {
                    return Some(SessionOutcome::Rejected(IntakeError::invalid_input(
                        "expected text notes or `no notes`",
                    )));
                }
                session.sources.push(reply.source);
                None
            }
        };

        match next {
            Some(step) => {
                session.step = step;
                session.deadline = now + RESPONSE_WAIT;
                sessions.insert(key, session);
                Some(SessionOutcome::NextPrompt(step))
            }
            None => {
                let CollectSession {
                    kind,
                    actor,
                    fields,
                    sources,
                    ..
                } = session;

                match Submission::new(kind, actor, fields, now) {
                    Ok(submission) => Some(SessionOutcome::Complete {
                        submission,
                        sources,
                    }),
                    Err(err) => Some(SessionOutcome::Rejected(err)),
                }
            }
        }
    }

    /// Removes and returns every session whose deadline has passed, so the
    /// sweeper can notify the actors.
    pub fn expire(&self, now: OffsetDateTime) -> Vec<CollectSession> {
        let mut sessions = self
            .sessions
            .lock()
            .expect("Session store mutex should not be poisoned");

        let expired_keys: Vec<SessionKey> = sessions
            .iter()
            .filter(|(_, session)| session.deadline <= now)
            .map(|(key, _)| *key)
            .collect();

        expired_keys
            .into_iter()
            .filter_map(|key| sessions.remove(&key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::{ChannelId, MessageId, UserId};
    use time::OffsetDateTime;

    use crate::intake::submission::Artifact;

    use super::*;

    const T0: i64 = 1_700_000_000;

    fn at(seconds_after: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(T0 + seconds_after).unwrap()
    }

    fn actor() -> Actor {
        Actor {
            id: UserId::new(42),
            display_name: "tester#0001".to_string(),
        }
    }

    fn key(interaction: u64) -> SessionKey {
        SessionKey {
            actor: UserId::new(42),
            interaction,
        }
    }

    fn reply(attachment_url: Option<&str>, text: &str, message: u64) -> SessionReply {
        SessionReply {
            attachment_url: attachment_url.map(str::to_owned),
            text: text.to_owned(),
            source: SourceMessage {
                channel: ChannelId::new(100),
                message: MessageId::new(message),
            },
        }
    }

    #[test_log::test]
    fn loot_modifiers_session_collects_all_fields() {
        let store = SessionStore::new();
        let step = store.open(key(1), SubmissionKind::LootAndModifiers, actor(), at(0));
        assert_eq!(step, Step::Modifiers);

        let outcome = store
            .answer(
                UserId::new(42),
                reply(Some("https://cdn.example/modifiers.png"), "", 1),
                at(10),
            )
            .unwrap();
        assert!(matches!(outcome, SessionOutcome::NextPrompt(Step::Loot)));

        let outcome = store
            .answer(UserId::new(42), reply(None, "No Loot", 2), at(20))
            .unwrap();
        assert!(matches!(outcome, SessionOutcome::NextPrompt(Step::Notes)));

        let outcome = store
            .answer(UserId::new(42), reply(None, "ran out of potions", 3), at(30))
            .unwrap();

        match outcome {
            SessionOutcome::Complete {
                submission,
                sources,
            } => {
                assert_eq!(submission.kind, SubmissionKind::LootAndModifiers);
                assert_eq!(submission.fields.secondary, Artifact::Absent);
                assert_eq!(submission.fields.notes.as_deref(), Some("ran out of potions"));
                assert_eq!(sources.len(), 3);
            }
            other => panic!("Expected completion, got {other:?}"),
        }

        // The completed session is gone; a further message is not an answer.
        assert!(store
            .answer(UserId::new(42), reply(None, "anything else", 4), at(31))
            .is_none());
    }

    #[test]
    fn text_where_attachment_required_rejects_and_discards() {
        let store = SessionStore::new();
        store.open(key(1), SubmissionKind::Start, actor(), at(0));

        let outcome = store
            .answer(UserId::new(42), reply(None, "here you go", 1), at(10))
            .unwrap();
        assert!(matches!(
            outcome,
            SessionOutcome::Rejected(IntakeError::InvalidInput(_))
        ));
        assert!(store
            .answer(
                UserId::new(42),
                reply(Some("https://cdn.example/s.png"), "", 2),
                at(11)
            )
            .is_none());
    }

    #[test]
    fn expired_sessions_are_swept_and_ignore_late_answers() {
        let store = SessionStore::new();
        store.open(key(1), SubmissionKind::Start, actor(), at(0));

        // Not yet expired.
        assert!(store.expire(at(59)).is_empty());

        let expired = store.expire(at(61));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].kind, SubmissionKind::Start);

        assert!(store
            .answer(
                UserId::new(42),
                reply(Some("https://cdn.example/late.png"), "", 1),
                at(62)
            )
            .is_none());
    }

    #[test]
    fn deadline_resets_after_each_answered_prompt() {
        let store = SessionStore::new();
        store.open(key(1), SubmissionKind::LootAndModifiers, actor(), at(0));

        store
            .answer(
                UserId::new(42),
                reply(Some("https://cdn.example/modifiers.png"), "", 1),
                at(50),
            )
            .unwrap();

        // The loot prompt's window runs until t=110.
        assert!(store.expire(at(70)).is_empty());
        assert_eq!(store.expire(at(111)).len(), 1);
    }

    #[test_log::test]
    fn answers_route_to_the_most_recently_opened_session() {
        let store = SessionStore::new();
        store.open(key(1), SubmissionKind::Start, actor(), at(0));
        store.open(key(2), SubmissionKind::LootAndModifiers, actor(), at(5));

        // A Start session would complete on the first attachment; the newer
        // LootAndModifiers session asks for loot next instead.
        let outcome = store
            .answer(
                UserId::new(42),
                reply(Some("https://cdn.example/modifiers.png"), "", 1),
                at(10),
            )
            .unwrap();
        assert!(matches!(outcome, SessionOutcome::NextPrompt(Step::Loot)));
    }
}
