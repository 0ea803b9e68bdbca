use time::OffsetDateTime;

use crate::{
    commands::{ApplicationContext, CommandResult},
    intake::{handle, Actor, IntakeEvent},
    transport::{run_plan, InteractionTransport},
};

/// Remove all registered slash commands. Use only when needed.
#[poise::command(slash_command, rename = "cleanupcommands")]
pub async fn cleanupcommands(ctx: ApplicationContext<'_>) -> CommandResult {
    let actor = Actor {
        id: ctx.author().id,
        display_name: ctx.author().tag(),
    };

    let plan = handle(
        &ctx.data.policy,
        IntakeEvent::CommandCleanup { actor },
        OffsetDateTime::now_utc(),
    );

    let transport = InteractionTransport::new(ctx, ctx.data.transport.clone());
    run_plan(&transport, plan).await?;
    Ok(())
}
