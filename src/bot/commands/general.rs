//! General Discord commands - ping and help.
//! These commands don't touch the economy and provide basic bot functionality
//! and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Floof Economy Help**\n\
        Slash commands work everywhere, or type them with the `%` prefix.\n\
        Every crime can land you in jail. Jail blocks every risk action until you bail \
        out or serve your time.\n\n\
        **Money**\n\
        • `/balance [user]` - Coins and health.\n\
        • `/work` - Honest pay, short cooldown.\n\
        • `/donate <user> <amount>` - Give coins away.\n\
        • `/leaderboard` - The richest players.\n\
        • `/inventory` - What you carry.\n\
        • `/shop list|buy` - Weapons, ammo, armor and heist gear.\n\n\
        **Crime**\n\
        • `/attack <user>` - Hit someone with your equipped weapon and take coins.\n\
        • `/beatup <user>` - Mug someone for a share of their coins.\n\
        • `/rob_bank <bank>` / `/rob_business <business>` - Quick robberies.\n\
        • `/heist <target>` - Big scores that burn tools.\n\
        • `/smuggle <route> [contraband]` - Pay up front, sell at the other end.\n\
        • `/dealer <dealer> <drug> [quantity]` - Street-price drugs.\n\
        • `/use_item <item>` / `/equip <weapon>` - Gear up.\n\
        • `/bodyguard <tier>` / `/pet adopt|feed|status` - Protection.\n\
        • `/crime_stats [user]` - Level, record and NPC friendships.\n\n\
        **Jail**\n\
        • `/arrest_status [user]` - Time left and bail.\n\
        • `/bail self|npc|friend` - Three ways out. A friend has to accept before they pay.\n\n\
        **Settings**\n\
        • `/preferences show|set` - Opt in or out of being targeted.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
