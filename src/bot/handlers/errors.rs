//! User-facing error replies.
//!
//! Precondition failures are normal gameplay ("you're still in jail") and are shown
//! to the user as-is. Database and framework failures are logged and replaced with a
//! generic message.

use crate::{
    bot::Context,
    errors::{Error, ErrorKind, Precondition},
};
use tracing::{error, warn};

fn format_ms(ms: i64) -> String {
    let secs = (ms + 999) / 1000;
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

/// Message shown to the user for an error.
#[must_use]
pub fn user_message(error: &Error) -> String {
    match error {
        Error::Precondition(Precondition::Arrested { remaining_secs }) => format!(
            "🚔 You're behind bars for another {}. Try `/bail`.",
            format_ms(remaining_secs.saturating_mul(1000))
        ),
        Error::Precondition(Precondition::OnCooldown {
            command,
            remaining_ms,
        }) => format!(
            "⏳ `{command}` is on cooldown. Try again in {}.",
            format_ms(*remaining_ms)
        ),
        Error::Precondition(Precondition::InsufficientFunds { current, required }) => {
            format!("💸 You need **{required}** coins but only have **{current}**.")
        }
        Error::Precondition(other) => format!("❌ {}", capitalize(&other.to_string())),
        Error::NotFound { kind, id } => format!("❓ Unknown {kind} `{id}`."),
        Error::InvalidAmount { amount } => format!("❌ `{amount}` is not a valid amount."),
        Error::Unauthorized { .. } => "🚫 Only the bot owner can do that.".to_string(),
        _ => "⚠️ Something went wrong. Nothing was changed, please try again.".to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Logs a command error and replies to the user, privately when possible.
pub async fn report_command_error(ctx: Context<'_>, error: &Error) {
    match error.kind() {
        ErrorKind::Precondition | ErrorKind::NotFound | ErrorKind::Invalid => {
            warn!("`{}` rejected: {error}", ctx.command().name);
        }
        _ => error!("Error in command `{}`: {error:?}", ctx.command().name),
    }

    let reply = poise::CreateReply::default()
        .content(user_message(error))
        .ephemeral(true);
    if let Err(e) = ctx.send(reply).await {
        error!("Failed to send error message: {e}");
    }
}
