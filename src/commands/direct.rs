use poise::serenity_prelude::Attachment;
use time::OffsetDateTime;

use crate::{
    commands::{ApplicationContext, CommandResult},
    intake::{handle, Actor, Artifact, IntakeEvent, SubmissionFields, SubmissionKind},
    transport::{run_plan, InteractionTransport},
};

/// Submit your starting setup screenshot for the Colosseum event.
#[poise::command(slash_command, rename = "colostart")]
pub async fn colostart(
    ctx: ApplicationContext<'_>,
    #[description = "Your starting setup screenshot."] screenshot: Attachment,
) -> CommandResult {
    let fields = SubmissionFields {
        primary: Artifact::Attachment(screenshot.url),
        ..Default::default()
    };
    submit_direct(ctx, SubmissionKind::Start, fields).await
}

/// Submit your ending setup screenshot for the Colosseum event.
#[poise::command(slash_command, rename = "coloend")]
pub async fn coloend(
    ctx: ApplicationContext<'_>,
    #[description = "Your ending setup screenshot."] screenshot: Attachment,
) -> CommandResult {
    let fields = SubmissionFields {
        primary: Artifact::Attachment(screenshot.url),
        ..Default::default()
    };
    submit_direct(ctx, SubmissionKind::End, fields).await
}

/// Submit your modifiers screenshot, optional loot screenshot, and optional notes.
#[poise::command(slash_command, rename = "lootmodifiers")]
pub async fn lootmodifiers(
    ctx: ApplicationContext<'_>,
    #[description = "Your modifiers screenshot."] modifiers: Attachment,
    #[description = "Your loot screenshot (optional)."] loot: Option<Attachment>,
    #[description = "Any notes about the run (optional)."] notes: Option<String>,
) -> CommandResult {
    let fields = SubmissionFields {
        primary: Artifact::Attachment(modifiers.url),
        secondary: loot
            .map(|attachment| Artifact::Attachment(attachment.url))
            .unwrap_or_default(),
        notes: notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty()),
        ..Default::default()
    };
    submit_direct(ctx, SubmissionKind::LootAndModifiers, fields).await
}

/// Submit a screenshot for review.
#[poise::command(slash_command, rename = "submit")]
pub async fn submit(
    ctx: ApplicationContext<'_>,
    #[description = "The screenshot to submit."] screenshot: Attachment,
    #[description = "A second screenshot (optional)."] extra: Option<Attachment>,
    #[description = "Any notes (optional)."] notes: Option<String>,
) -> CommandResult {
    let fields = SubmissionFields {
        primary: Artifact::Attachment(screenshot.url),
        secondary: extra
            .map(|attachment| Artifact::Attachment(attachment.url))
            .unwrap_or_default(),
        notes: notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty()),
        ..Default::default()
    };
    submit_direct(ctx, SubmissionKind::Generic, fields).await
}

async fn submit_direct(
    ctx: ApplicationContext<'_>,
    kind: SubmissionKind,
    fields: SubmissionFields,
) -> CommandResult {
    let actor = Actor {
        id: ctx.author().id,
        display_name: ctx.author().tag(),
    };

    let plan = handle(
        &ctx.data.policy,
        IntakeEvent::DirectSubmission {
            kind,
            actor,
            fields,
        },
        OffsetDateTime::now_utc(),
    );

    let transport = InteractionTransport::new(ctx, ctx.data.transport.clone());
    run_plan(&transport, plan).await?;
    Ok(())
}
