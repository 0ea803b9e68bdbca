use poise::serenity_prelude::{ChannelId, MessageId, UserId};
use time::OffsetDateTime;

use super::{
    error::IntakeError,
    notice::Notice,
    submission::{Actor, Artifact, Submission, SubmissionFields, SubmissionKind},
};

/// Channel coordinates of a user message that triggered or fed a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceMessage {
    pub channel: ChannelId,
    pub message: MessageId,
}

/// Per-deployment wiring the intake core plans against.
#[derive(Clone, Copy, Debug)]
pub struct IntakePolicy {
    pub intake_channel: ChannelId,
    pub review_channel: ChannelId,
    pub admin_user: UserId,
    /// Whether a plain attachment message in the intake channel counts as an
    /// implicit generic submission.
    pub message_intake: bool,
}

/// One inbound platform event, stripped of transport details.
#[derive(Clone, Debug)]
pub enum IntakeEvent {
    /// A slash command that carried all fields at once.
    DirectSubmission {
        kind: SubmissionKind,
        actor: Actor,
        fields: SubmissionFields,
    },

    /// A plain user message posted in some channel.
    ChannelMessage {
        source: SourceMessage,
        actor: Actor,
        author_is_bot: bool,
        attachment_urls: Vec<String>,
    },

    /// The administrative command-cleanup invocation.
    CommandCleanup { actor: Actor },
}

/// One outbound effect for the host layer to perform, in plan order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Private text for the actor: an acknowledgement or an error explanation.
    Reply { to: UserId, text: String },
    ForwardNotice(Notice),
    /// Never planned before the notice it belongs to.
    DeleteSource(SourceMessage),
    ClearCommands,
}

/// Turns an inbound event into a plan of actions. An empty plan means the
/// event is not ours to handle.
pub fn handle(policy: &IntakePolicy, event: IntakeEvent, now: OffsetDateTime) -> Vec<Action> {
    match event {
        IntakeEvent::DirectSubmission {
            kind,
            actor,
            fields,
        } => match Submission::new(kind, actor.clone(), fields, now) {
            Ok(submission) => plan_forward(&submission, Vec::new()),
            Err(err) => vec![Action::Reply {
                to: actor.id,
                text: format!("❌ Submission rejected: {err}."),
            }],
        },

        IntakeEvent::ChannelMessage {
            source,
            actor,
            author_is_bot,
            attachment_urls,
        } => {
            if author_is_bot || !policy.message_intake || source.channel != policy.intake_channel {
                return Vec::new();
            }

            let mut urls = attachment_urls.into_iter();
            let Some(first) = urls.next() else {
                // No attachment: not a submission, nothing gets deleted.
                return Vec::new();
            };
            let second = urls.next().map(Artifact::Attachment).unwrap_or_default();

            let fields = SubmissionFields {
                primary: Artifact::Attachment(first),
                secondary: second,
                extra_attachments: urls.collect(),
                notes: None,
            };

            match Submission::new(SubmissionKind::Generic, actor, fields, now) {
                Ok(submission) => plan_forward(&submission, vec![source]),
                Err(_) => Vec::new(),
            }
        }

        IntakeEvent::CommandCleanup { actor } => {
            if actor.id == policy.admin_user {
                vec![
                    Action::ClearCommands,
                    Action::Reply {
                        to: actor.id,
                        text: "✅ All registered commands were removed.".to_string(),
                    },
                ]
            } else {
                vec![Action::Reply {
                    to: actor.id,
                    text: format!("❌ {}.", IntakeError::PermissionDenied),
                }]
            }
        }
    }
}

/// The failure plan for a discarded conversational session. The explanation
/// goes out privately and the triggering message stays put.
pub fn plan_rejection(actor: &Actor, err: &IntakeError) -> Vec<Action> {
    vec![Action::Reply {
        to: actor.id,
        text: format!("❌ {err}. Your submission was cancelled, please run the command again."),
    }]
}

/// The success plan for a completed submission. Source deletion is ordered
/// strictly after the notice, so a delivery failure cannot lose user content.
pub fn plan_forward(submission: &Submission, sources: Vec<SourceMessage>) -> Vec<Action> {
    let mut plan = vec![
        Action::ForwardNotice(Notice::render(submission)),
        Action::Reply {
            to: submission.actor.id,
            text: format!("✅ {} submission received!", submission.kind),
        },
    ];
    plan.extend(sources.into_iter().map(Action::DeleteSource));
    plan
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::{ChannelId, MessageId, UserId};
    use time::OffsetDateTime;

    use super::*;

    fn policy() -> IntakePolicy {
        IntakePolicy {
            intake_channel: ChannelId::new(100),
            review_channel: ChannelId::new(200),
            admin_user: UserId::new(7),
            message_intake: true,
        }
    }

    fn actor(id: u64) -> Actor {
        Actor {
            id: UserId::new(id),
            display_name: format!("user-{id}"),
        }
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn intake_message(attachment_urls: Vec<String>) -> IntakeEvent {
        IntakeEvent::ChannelMessage {
            source: SourceMessage {
                channel: ChannelId::new(100),
                message: MessageId::new(555),
            },
            actor: actor(42),
            author_is_bot: false,
            attachment_urls,
        }
    }

    #[test]
    fn valid_direct_submission_forwards_then_acknowledges() {
        let plan = handle(
            &policy(),
            IntakeEvent::DirectSubmission {
                kind: SubmissionKind::Start,
                actor: actor(42),
                fields: SubmissionFields {
                    primary: Artifact::Attachment("https://cdn.example/s.png".to_string()),
                    ..Default::default()
                },
            },
            now(),
        );

        assert_eq!(plan.len(), 2);
        assert!(matches!(plan[0], Action::ForwardNotice(_)));
        assert!(matches!(
            &plan[1],
            Action::Reply { to, text } if *to == UserId::new(42) && text.contains("Start submission received")
        ));
    }

    #[test]
    fn invalid_direct_submission_only_notifies_the_actor() {
        let plan = handle(
            &policy(),
            IntakeEvent::DirectSubmission {
                kind: SubmissionKind::Start,
                actor: actor(42),
                fields: SubmissionFields::default(),
            },
            now(),
        );

        assert_eq!(plan.len(), 1);
        assert!(matches!(&plan[0], Action::Reply { text, .. } if text.starts_with('❌')));
    }

    #[test]
    fn intake_message_with_attachment_forwards_and_deletes_last() {
        let plan = handle(
            &policy(),
            intake_message(vec!["https://cdn.example/shot.png".to_string()]),
            now(),
        );

        assert_eq!(plan.len(), 3);
        assert!(matches!(plan[0], Action::ForwardNotice(_)));
        assert!(matches!(plan[1], Action::Reply { .. }));
        assert_eq!(
            plan[2],
            Action::DeleteSource(SourceMessage {
                channel: ChannelId::new(100),
                message: MessageId::new(555),
            })
        );
    }

    #[test]
    fn intake_message_forwards_every_attachment() {
        let plan = handle(
            &policy(),
            intake_message(vec![
                "https://cdn.example/one.png".to_string(),
                "https://cdn.example/two.png".to_string(),
                "https://cdn.example/three.png".to_string(),
            ]),
            now(),
        );

        let Action::ForwardNotice(notice) = &plan[0] else {
            panic!("Expected a notice, got {:?}", plan[0]);
        };
        assert_eq!(
            notice.attachment_urls(),
            [
                "https://cdn.example/one.png",
                "https://cdn.example/two.png",
                "https://cdn.example/three.png"
            ]
        );
    }

    #[test]
    fn session_rejection_replies_privately_and_keeps_the_message() {
        let plan = plan_rejection(
            &actor(42),
            &IntakeError::invalid_input("expected a screenshot attachment"),
        );

        assert_eq!(plan.len(), 1);
        assert!(matches!(
            &plan[0],
            Action::Reply { to, text }
                if *to == UserId::new(42)
                    && text.starts_with('❌')
                    && text.contains("cancelled")
        ));
    }

    #[test]
    fn intake_message_without_attachment_is_ignored() {
        assert!(handle(&policy(), intake_message(Vec::new()), now()).is_empty());
    }

    #[test]
    fn bot_messages_are_ignored() {
        let event = IntakeEvent::ChannelMessage {
            source: SourceMessage {
                channel: ChannelId::new(100),
                message: MessageId::new(555),
            },
            actor: actor(42),
            author_is_bot: true,
            attachment_urls: vec!["https://cdn.example/shot.png".to_string()],
        };

        assert!(handle(&policy(), event, now()).is_empty());
    }

    #[test]
    fn messages_outside_the_intake_channel_are_ignored() {
        let event = IntakeEvent::ChannelMessage {
            source: SourceMessage {
                channel: ChannelId::new(999),
                message: MessageId::new(555),
            },
            actor: actor(42),
            author_is_bot: false,
            attachment_urls: vec!["https://cdn.example/shot.png".to_string()],
        };

        assert!(handle(&policy(), event, now()).is_empty());
    }

    #[test]
    fn message_intake_can_be_disabled() {
        let mut policy = policy();
        policy.message_intake = false;

        let plan = handle(
            &policy,
            intake_message(vec!["https://cdn.example/shot.png".to_string()]),
            now(),
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn cleanup_by_non_admin_is_denied_without_clearing() {
        let plan = handle(
            &policy(),
            IntakeEvent::CommandCleanup { actor: actor(42) },
            now(),
        );

        assert_eq!(plan.len(), 1);
        assert!(matches!(&plan[0], Action::Reply { text, .. } if text.contains("permission")));
    }

    #[test]
    fn cleanup_by_admin_clears_then_confirms() {
        let plan = handle(
            &policy(),
            IntakeEvent::CommandCleanup { actor: actor(7) },
            now(),
        );

        assert_eq!(plan[0], Action::ClearCommands);
        assert!(matches!(&plan[1], Action::Reply { text, .. } if text.starts_with('✅')));
    }
}
