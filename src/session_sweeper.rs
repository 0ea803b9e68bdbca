use std::sync::Arc;

use indoc::formatdoc;
use time::OffsetDateTime;
use tokio::{select, sync::Notify};
use tracing::{info, info_span, warn, Instrument};

use crate::{
    intake::{IntakeError, SessionStore},
    transport::Transport,
    utils::discord_timestamp::{discord_timestamp, TimestampStyle},
};

const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

/// Background service that destroys conversational sessions whose prompt
/// deadline has passed and tells the affected users about it.
pub struct SessionSweeper {
    shutdown: Arc<Notify>,
    transport: Arc<dyn Transport>,
    sessions: Arc<SessionStore>,
}

impl SessionSweeper {
    pub fn create_and_start(
        shutdown: Arc<Notify>,
        transport: Arc<dyn Transport>,
        sessions: Arc<SessionStore>,
    ) {
        let sweeper = SessionSweeper {
            shutdown,
            transport,
            sessions,
        };

        tokio::spawn(sweeper.run().instrument(info_span!("session_sweeper")));
    }

    async fn run(self) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);

        loop {
            select! {
                _ = self.shutdown.notified() => {
                    info!("Session sweeper shutting down");
                    break;
                }

                _ = interval.tick() => self.sweep(OffsetDateTime::now_utc()).await,
            }
        }
    }

    async fn sweep(&self, now: OffsetDateTime) {
        for session in self.sessions.expire(now) {
            info!(
                "Expiring a {} session of user {} opened at {}",
                session.kind, session.actor.id, session.opened_at
            );

            let text = formatdoc! {
                r#"
                    ⌛ **Your {kind} submission timed out:** {reason}.

                    The session you opened {opened} has been discarded. Nothing was forwarded to the reviewers.

                    Please run the command again when you have everything ready.
                "#,
                kind = session.kind,
                reason = IntakeError::Timeout,
                opened = discord_timestamp(session.opened_at, TimestampStyle::Relative),
            };

            if let Err(err) = self.transport.reply_private(session.actor.id, &text).await {
                warn!(
                    "Could not notify {} about an expired session: {err}",
                    session.actor.id
                );
            }
        }
    }
}
