use poise::serenity_prelude::{self as serenity, FullEvent};
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::{
    commands::CommandError,
    intake::{
        handle, plan_forward, plan_rejection, Actor, IntakeEvent, SessionOutcome, SessionReply,
        SourceMessage,
    },
    transport::{run_plan, Transport},
    BotState,
};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, BotState, CommandError>,
    state: &BotState,
) -> Result<(), CommandError> {
    if let FullEvent::Message { new_message } = event {
        handle_message(ctx, new_message, state).await;
    }

    Ok(())
}

async fn handle_message(ctx: &serenity::Context, message: &serenity::Message, state: &BotState) {
    if message.author.bot || message.channel_id != state.policy.intake_channel {
        return;
    }

    let now = OffsetDateTime::now_utc();
    let source = SourceMessage {
        channel: message.channel_id,
        message: message.id,
    };
    let actor = Actor {
        id: message.author.id,
        display_name: message.author.tag(),
    };

    // An open collection session claims the message before ambient intake.
    let session_reply = SessionReply {
        attachment_url: message
            .attachments
            .first()
            .map(|attachment| attachment.url.clone()),
        text: message.content.clone(),
        source,
    };

    if let Some(outcome) = state.sessions.answer(message.author.id, session_reply, now) {
        match outcome {
            SessionOutcome::NextPrompt(step) => {
                let prompt = format!("<@{}> {}", actor.id, step.prompt());
                if let Err(err) = message.channel_id.say(&ctx.http, prompt).await {
                    warn!("Could not send the next prompt to {}: {err}", actor.id);
                }
            }

            SessionOutcome::Complete {
                submission,
                sources,
            } => {
                let plan = plan_forward(&submission, sources);
                if let Err(err) = run_plan(state.transport.as_ref(), plan).await {
                    error!("Could not forward a collected submission: {err}");
                    notify_failure(state, &actor, &err.to_string()).await;
                }
            }

            SessionOutcome::Rejected(err) => {
                // The explanation is a DM; the triggering message stays put
                // for manual follow-up.
                let plan = plan_rejection(&actor, &err);
                if let Err(send_err) = run_plan(state.transport.as_ref(), plan).await {
                    warn!("Could not notify {} about invalid input: {send_err}", actor.id);
                }
            }
        }

        return;
    }

    let event = IntakeEvent::ChannelMessage {
        source,
        actor: actor.clone(),
        author_is_bot: message.author.bot,
        attachment_urls: message
            .attachments
            .iter()
            .map(|attachment| attachment.url.clone())
            .collect(),
    };

    let plan = handle(&state.policy, event, now);
    if plan.is_empty() {
        return;
    }

    if let Err(err) = run_plan(state.transport.as_ref(), plan).await {
        error!("Could not forward an intake-channel submission: {err}");
        notify_failure(state, &actor, &err.to_string()).await;
    }
}

async fn notify_failure(state: &BotState, actor: &Actor, detail: &str) {
    let text = format!("❌ {detail}. Your message was left in place, please try again later.");
    if let Err(err) = state.transport.reply_private(actor.id, &text).await {
        warn!("Could not notify {} about the failure: {err}", actor.id);
    }
}
