use indoc::formatdoc;
use poise::CreateReply;
use time::OffsetDateTime;

use crate::{
    commands::{user_err, ApplicationContext, CommandResult},
    intake::{Actor, SessionKey, SubmissionKind, RESPONSE_WAIT},
};

/// Submit your starting setup screenshot for the Colosseum event.
#[poise::command(slash_command, rename = "colostart")]
pub async fn colostart(ctx: ApplicationContext<'_>) -> CommandResult {
    open_session(ctx, SubmissionKind::Start).await
}

/// Submit your ending setup screenshot for the Colosseum event.
#[poise::command(slash_command, rename = "coloend")]
pub async fn coloend(ctx: ApplicationContext<'_>) -> CommandResult {
    open_session(ctx, SubmissionKind::End).await
}

/// Submit your modifiers screenshot, optional loot screenshot, and optional notes.
#[poise::command(slash_command, rename = "lootmodifiers")]
pub async fn lootmodifiers(ctx: ApplicationContext<'_>) -> CommandResult {
    open_session(ctx, SubmissionKind::LootAndModifiers).await
}

/// Opens a collection session and sends the first prompt. The answers arrive
/// as plain messages and are routed to the session by the event handler.
async fn open_session(ctx: ApplicationContext<'_>, kind: SubmissionKind) -> CommandResult {
    let intake_channel = ctx.data.policy.intake_channel;
    if ctx.channel_id() != intake_channel {
        return Err(user_err(format!(
            "Please run this command in <#{intake_channel}>."
        )));
    }

    let actor = Actor {
        id: ctx.author().id,
        display_name: ctx.author().tag(),
    };
    let key = SessionKey {
        actor: actor.id,
        interaction: ctx.interaction.id.get(),
    };

    let step = ctx
        .data
        .sessions
        .open(key, kind, actor, OffsetDateTime::now_utc());

    let intro = formatdoc! {
        r#"
            **{kind} submission**

            {prompt}

            You have {wait} seconds to answer each prompt.
        "#,
        kind = kind,
        prompt = step.prompt(),
        wait = RESPONSE_WAIT.whole_seconds(),
    };

    ctx.send(CreateReply::default().content(intro)).await?;
    Ok(())
}
