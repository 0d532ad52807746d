//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the economy, including all slash
//! commands, autocomplete handlers, and bot context management. Commands translate
//! Discord input into core calls and core results into messages; they hold no game
//! logic of their own.

/// Discord command implementations (crime, bail, economy, preferences, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, error replies)
pub mod handlers;

use crate::{
    core::economy::Economy,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the economy service, which owns the database connection,
/// the configuration and the cooldown tracker.
pub struct BotData {
    /// Economy service for every state-changing operation
    pub economy: Arc<Economy>,
}

impl BotData {
    /// Creates a new `BotData` instance around the economy service.
    #[must_use]
    pub const fn new(economy: Arc<Economy>) -> Self {
        Self { economy }
    }
}

/// Poise context with our data and error types.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            handlers::errors::report_command_error(ctx, &error).await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::balance(),
        commands::work(),
        commands::donate(),
        commands::leaderboard(),
        commands::inventory(),
        commands::shop(),
        commands::attack(),
        commands::beatup(),
        commands::rob_bank(),
        commands::rob_business(),
        commands::heist(),
        commands::smuggle(),
        commands::dealer(),
        commands::use_item(),
        commands::equip(),
        commands::bodyguard(),
        commands::pet(),
        commands::crime_stats(),
        commands::arrest_status(),
        commands::bail(),
        commands::release(),
        commands::preferences(),
    ]
}

/// Prefix for text commands, alongside the slash commands.
pub const COMMAND_PREFIX: &str = "%";

/// Commands, prefix and error routing for the framework.
#[must_use]
pub fn framework_options() -> poise::FrameworkOptions<BotData, Error> {
    poise::FrameworkOptions {
        commands: all_commands(),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(COMMAND_PREFIX.to_string()),
            ..Default::default()
        },
        on_error: |error| Box::pin(on_error(error)),
        ..Default::default()
    }
}

/// Gateway intents; prefix commands need to read message content.
#[must_use]
pub fn gateway_intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT
}

/// Starts the Discord client and blocks until it stops.
#[instrument(skip(token, economy))]
pub async fn run_bot(token: String, economy: Arc<Economy>) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(framework_options())
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(economy))
            })
        })
        .build();

    let intents = gateway_intents();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_commands_can_fire() {
        let options = framework_options();
        assert_eq!(options.prefix_options.prefix.as_deref(), Some(COMMAND_PREFIX));
        assert!(gateway_intents().contains(serenity::GatewayIntents::MESSAGE_CONTENT));
        assert!(options.commands.iter().all(|c| c.prefix_action.is_some()));
    }

    #[test]
    fn test_command_names_are_unique() {
        let mut names: Vec<String> = all_commands().into_iter().map(|c| c.name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
