//! Preference Discord commands - show and set the per-user flags.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::utils::open_author, handlers::autocomplete},
        core::preferences,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Preference flags.
    #[poise::command(
        slash_command,
        prefix_command,
        subcommands("preferences_show", "preferences_set")
    )]
    pub async fn preferences(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Lists every flag and its current value.
    #[poise::command(slash_command, prefix_command, rename = "show")]
    pub async fn preferences_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let (user_id, _) = open_author(ctx).await?;
        let flags = preferences::get_all(ctx.data().economy.db(), &user_id).await?;

        let mut text = String::from("⚙️ **Your preferences**\n");
        for (key, enabled) in flags {
            let mark = if enabled { "✅" } else { "❌" };
            writeln!(&mut text, "{mark} `{key}`")?;
        }
        ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Turns a flag on or off.
    #[poise::command(slash_command, prefix_command, rename = "set")]
    pub async fn preferences_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Preference to change"]
        #[autocomplete = "autocomplete::autocomplete_preference"]
        key: String,
        #[description = "On or off"] enabled: bool,
    ) -> Result<()> {
        let (user_id, _) = open_author(ctx).await?;
        let key = preferences::update(ctx.data().economy.db(), &user_id, &key, enabled).await?;
        let state = if enabled { "on" } else { "off" };
        ctx.send(
            poise::CreateReply::default()
                .content(format!("⚙️ `{key}` is now **{state}**."))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
