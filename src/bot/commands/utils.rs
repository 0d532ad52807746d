//! Helpers shared by the command modules.

use crate::{
    bot::Context,
    core::ledger,
    entities::account,
    errors::{Precondition, Result},
};
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

/// Opens (or refreshes) the author's account. Returns the author id and the clock
/// reading the rest of the command should use.
pub async fn open_author(ctx: Context<'_>) -> Result<(String, DateTime<Utc>)> {
    let now = Utc::now();
    let user_id = ctx.author().id.to_string();
    ctx.data().economy.open_account(&user_id, now).await?;
    Ok((user_id, now))
}

/// Makes sure a targeted user has an account, without marking them active.
///
/// Bots cannot play, and the author cannot target themselves.
pub async fn open_target(ctx: Context<'_>, target: &serenity::User) -> Result<account::Model> {
    if target.id == ctx.author().id {
        return Err(Precondition::SelfTarget.into());
    }
    if target.bot {
        return Err(crate::errors::Error::not_found("user", target.id.to_string()));
    }
    let economy = &ctx.data().economy;
    ledger::ensure_account(economy.db(), &target.id.to_string(), economy.config().starting_balance)
        .await
}

/// Formats a coin amount with thousands separators.
#[must_use]
pub fn coins(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped} 🪙")
    } else {
        format!("{grouped} 🪙")
    }
}

/// Renders a health bar like `[████████░░] 80/100`.
#[must_use]
pub fn health_bar(health: i32, max_health: i32) -> String {
    const WIDTH: i32 = 10;
    let filled = if max_health > 0 {
        (health.clamp(0, max_health) * WIDTH) / max_health
    } else {
        0
    };
    let filled = usize::try_from(filled).unwrap_or_default();
    let empty = usize::try_from(WIDTH).unwrap_or_default() - filled;
    format!("[{}{}] {health}/{max_health}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_grouping() {
        assert_eq!(coins(0), "0 🪙");
        assert_eq!(coins(950), "950 🪙");
        assert_eq!(coins(1_000), "1,000 🪙");
        assert_eq!(coins(1_234_567), "1,234,567 🪙");
        assert_eq!(coins(-2_500), "-2,500 🪙");
    }

    #[test]
    fn test_health_bar() {
        assert_eq!(health_bar(80, 100), "[████████░░] 80/100");
        assert_eq!(health_bar(0, 100), "[░░░░░░░░░░] 0/100");
        assert_eq!(health_bar(150, 100), "[██████████] 150/100");
    }
}
