#![forbid(unsafe_code)]

mod commands;
mod event_handler;
mod intake;
mod poise_error_handler;
mod session_sweeper;
mod transport;
mod utils;

use std::{process::exit, sync::Arc};

use poise::{serenity_prelude::*, Framework};
use serde::Deserialize;
use tokio::{select, signal, sync::Notify};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake::{IntakePolicy, SessionStore};
use poise_error_handler::handle_error;
use session_sweeper::SessionSweeper;
use transport::{DiscordTransport, RegistrationScope};

#[derive(Debug, Deserialize)]
struct AppConfig {
    discord_bot_token: String,
    intake_channel_id: u64,
    review_channel_id: u64,
    admin_user_id: u64,
    register_commands_globally: Option<bool>,
    register_commands_in_guilds: Option<Vec<u64>>,
    /// Collect submission fields one prompt at a time instead of taking them
    /// as slash command options.
    conversational_commands: Option<bool>,
    /// Treat plain attachment messages in the intake channel as submissions.
    message_intake: Option<bool>,
}

pub struct BotState {
    pub policy: IntakePolicy,
    pub sessions: Arc<SessionStore>,
    pub transport: Arc<DiscordTransport>,
}

#[tracing::instrument]
#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "submission_relay_bot=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let policy = IntakePolicy {
        intake_channel: ChannelId::new(app_config.intake_channel_id),
        review_channel: ChannelId::new(app_config.review_channel_id),
        admin_user: UserId::new(app_config.admin_user_id),
        message_intake: app_config.message_intake.unwrap_or(true),
    };

    let register_globally = app_config.register_commands_globally.unwrap_or(false);
    let register_guilds: Vec<GuildId> = app_config
        .register_commands_in_guilds
        .unwrap_or_default()
        .into_iter()
        .map(GuildId::new)
        .collect();

    let registration_scope = if register_guilds.is_empty() {
        RegistrationScope::Global
    } else {
        RegistrationScope::Guilds(register_guilds.clone())
    };

    let command_set = if app_config.conversational_commands.unwrap_or(false) {
        commands::conversational_commands()
    } else {
        commands::direct_commands()
    };

    let shutdown_notify = Arc::new(Notify::new());
    let sweeper_shutdown = shutdown_notify.clone();

    let framework = Framework::builder()
        .options(poise::FrameworkOptions {
            commands: command_set,
            on_error: |error| Box::pin(handle_error(error)),
            event_handler: |ctx, event, framework, state| {
                Box::pin(event_handler::event_handler(ctx, event, framework, state))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(
                async move {
                    let commands = &framework.options().commands;

                    // Registration failures are logged but don't stop the bot
                    // from handling whatever is already registered.
                    if register_globally {
                        info!("Registering commands globally");
                        if let Err(err) = poise::builtins::register_globally(ctx, commands).await {
                            error!("Could not register commands globally: {err}");
                        }
                    }

                    for guild in &register_guilds {
                        let guild_name = ctx
                            .http
                            .get_guild(*guild)
                            .await
                            .map(|g| g.name)
                            .unwrap_or("???".to_string());

                        info!("Registering commands in guild {guild} ({guild_name})");

                        if let Err(err) =
                            poise::builtins::register_in_guild(ctx, commands, *guild).await
                        {
                            error!("Could not register commands in guild {guild}: {err}");
                        }
                    }

                    let transport = Arc::new(DiscordTransport::new(
                        ctx.http.clone(),
                        policy.review_channel,
                        registration_scope,
                    ));
                    let sessions = Arc::new(SessionStore::new());

                    SessionSweeper::create_and_start(
                        sweeper_shutdown,
                        transport.clone(),
                        sessions.clone(),
                    );

                    Ok(BotState {
                        policy,
                        sessions,
                        transport,
                    })
                }
                .instrument(info_span!("bot_setup")),
            )
        })
        .build();

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match ClientBuilder::new(app_config.discord_bot_token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to create the client: {err}");
            exit(255);
        }
    };

    select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            shutdown_notify.notify_waiters();
            client.shard_manager.shutdown_all().await;
        },

        result = client.start() => {
            if let Err(err) = result {
                error!("Failed to start the client: {err}");
            }
        },
    };
}
