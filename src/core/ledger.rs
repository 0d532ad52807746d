//! Balance ledger - coin balances, health and activity per user.
//!
//! Every mutation clamps the balance at zero. A subtraction larger than the balance
//! empties the account instead of driving it negative, and a transfer only moves what
//! the sender actually holds.

use crate::{
    entities::{Account, account},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::OnConflict};
use tracing::{debug, info, instrument};

/// Health every new account starts with.
pub const DEFAULT_MAX_HEALTH: i32 = 100;

/// Fetches an account without creating it.
pub async fn get_account<C>(db: &C, user_id: &str) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(user_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's balance, or 0 if the user has no account.
pub async fn get_balance<C>(db: &C, user_id: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    Ok(get_account(db, user_id)
        .await?
        .map_or(0, |account| account.balance))
}

/// True when the user holds at least `amount` coins.
pub async fn has_balance<C>(db: &C, user_id: &str, amount: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(get_balance(db, user_id).await? >= amount)
}

fn new_account(user_id: &str, balance: i64) -> account::ActiveModel {
    account::ActiveModel {
        user_id: Set(user_id.to_string()),
        balance: Set(balance.max(0)),
        health: Set(DEFAULT_MAX_HEALTH),
        max_health: Set(DEFAULT_MAX_HEALTH),
        equipped_weapon: Set(None),
        last_active_at: Set(None),
    }
}

async fn insert_account<C>(db: &C, user_id: &str, balance: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    new_account(user_id, balance)
        .insert(db)
        .await
        .map_err(Into::into)
}

/// Opens an account with `starting_balance` unless one already exists.
///
/// Two first contacts racing each other both end up with the same row: the insert
/// ignores a conflicting user id and the row is read back afterwards.
pub async fn ensure_account<C>(
    db: &C,
    user_id: &str,
    starting_balance: i64,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = get_account(db, user_id).await? {
        return Ok(existing);
    }
    let inserted = Account::insert(new_account(user_id, starting_balance))
        .on_conflict(
            OnConflict::column(account::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    let account = get_account(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("account", user_id))?;
    if inserted > 0 {
        info!("Opened account for {user_id} with {} coins", account.balance);
    }
    Ok(account)
}

async fn set_balance<C>(db: &C, user_id: &str, new_balance: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let new_balance = new_balance.max(0);
    match get_account(db, user_id).await? {
        Some(existing) => {
            let mut active: account::ActiveModel = existing.into();
            active.balance = Set(new_balance);
            active.update(db).await?;
        }
        None => {
            insert_account(db, user_id, new_balance).await?;
        }
    }
    Ok(new_balance)
}

/// Adds `amount` (which may be negative) and returns the clamped new balance.
#[instrument(skip(db))]
pub async fn add_balance<C>(db: &C, user_id: &str, amount: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let current = get_balance(db, user_id).await?;
    let new_balance = set_balance(db, user_id, current.saturating_add(amount)).await?;
    debug!("Balance of {user_id}: {current} -> {new_balance}");
    Ok(new_balance)
}

/// Subtracts a non-negative `amount`, flooring at zero.
#[instrument(skip(db))]
pub async fn subtract_balance<C>(db: &C, user_id: &str, amount: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    if amount < 0 {
        return Err(Error::InvalidAmount { amount });
    }
    let current = get_balance(db, user_id).await?;
    let new_balance = set_balance(db, user_id, current.saturating_sub(amount)).await?;
    debug!("Balance of {user_id}: {current} -> {new_balance}");
    Ok(new_balance)
}

/// Moves up to `amount` coins from one user to another and returns how much moved.
///
/// Only the sender's available balance is moved. Both sides are written through `db`, so
/// callers that pass a transaction get the debit and credit as one unit.
#[instrument(skip(db))]
pub async fn transfer<C>(db: &C, from: &str, to: &str, amount: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    if amount < 0 {
        return Err(Error::InvalidAmount { amount });
    }
    let available = get_balance(db, from).await?;
    let moved = amount.min(available);
    if moved == 0 {
        return Ok(0);
    }
    set_balance(db, from, available - moved).await?;
    add_balance(db, to, moved).await?;
    info!("Transferred {moved} coins from {from} to {to}");
    Ok(moved)
}

/// Lowers health by `damage`, flooring at 0, and returns the new health.
pub async fn apply_damage<C>(db: &C, user_id: &str, damage: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let existing = match get_account(db, user_id).await? {
        Some(account) => account,
        None => insert_account(db, user_id, 0).await?,
    };
    let damage = i32::try_from(damage.max(0)).unwrap_or(i32::MAX);
    let health = existing.health.saturating_sub(damage).max(0);
    let mut active: account::ActiveModel = existing.into();
    active.health = Set(health);
    active.update(db).await?;
    Ok(health)
}

/// Sets health to a fraction of max health, used after a knockout.
pub async fn restore_health<C>(db: &C, user_id: &str, fraction: f64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let existing = get_account(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("account", user_id))?;
    #[allow(clippy::cast_possible_truncation)]
    let health = (f64::from(existing.max_health) * fraction.clamp(0.0, 1.0)).floor() as i32;
    let mut active: account::ActiveModel = existing.into();
    active.health = Set(health);
    active.update(db).await?;
    Ok(health)
}

/// Records that the user just issued a command.
pub async fn touch_activity<C>(db: &C, user_id: &str, now: DateTime<Utc>) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(existing) = get_account(db, user_id).await? {
        let mut active: account::ActiveModel = existing.into();
        active.last_active_at = Set(Some(now));
        active.update(db).await?;
    }
    Ok(())
}

/// Sets or clears the user's equipped weapon.
pub async fn set_equipped_weapon<C>(db: &C, user_id: &str, weapon: Option<String>) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = get_account(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("account", user_id))?;
    let mut active: account::ActiveModel = existing.into();
    active.equipped_weapon = Set(weapon);
    active.update(db).await?;
    Ok(())
}

/// Richest accounts first.
pub async fn top_balances<C>(db: &C, limit: u64) -> Result<Vec<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .order_by_desc(account::Column::Balance)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_unknown_user_has_zero() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(get_balance(&db, "ghost").await?, 0);
        assert!(!has_balance(&db, "ghost", 1).await?);
        assert!(has_balance(&db, "ghost", 0).await?);
        // Reading does not create a row
        assert!(get_account(&db, "ghost").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_account_grants_once() -> Result<()> {
        let db = setup_test_db().await?;
        let first = ensure_account(&db, "u1", 1000).await?;
        assert_eq!(first.balance, 1000);
        assert_eq!(first.health, DEFAULT_MAX_HEALTH);

        subtract_balance(&db, "u1", 300).await?;
        let second = ensure_account(&db, "u1", 1000).await?;
        assert_eq!(second.balance, 700);
        Ok(())
    }

    #[tokio::test]
    async fn test_simultaneous_first_contact_opens_one_account() -> Result<()> {
        let db = setup_test_db().await?;
        let (first, second) = tokio::join!(
            ensure_account(&db, "u1", 1000),
            ensure_account(&db, "u1", 1000),
        );
        assert_eq!(first?.balance, 1000);
        assert_eq!(second?.balance, 1000);
        assert_eq!(top_balances(&db, 10).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_subtract_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 500).await?;

        assert_eq!(add_balance(&db, "u1", 250).await?, 750);
        assert_eq!(subtract_balance(&db, "u1", 250).await?, 500);
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_never_negative() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 100).await?;

        assert_eq!(subtract_balance(&db, "u1", 1_000).await?, 0);
        assert_eq!(add_balance(&db, "u1", -50).await?, 0);
        assert_eq!(add_balance(&db, "new_user", -50).await?, 0);
        assert_eq!(get_balance(&db, "new_user").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_subtract_rejects_negative_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let result = subtract_balance(&db, "u1", -5).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: -5 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_moves_only_available() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "a", 100).await?;
        create_test_account(&db, "b", 50).await?;

        let moved = transfer(&db, "b", "a", 200).await?;
        assert_eq!(moved, 50);
        assert_eq!(get_balance(&db, "a").await?, 150);
        assert_eq!(get_balance(&db, "b").await?, 0);

        assert_eq!(transfer(&db, "b", "a", 10).await?, 0);
        assert_eq!(get_balance(&db, "a").await?, 150);
        Ok(())
    }

    #[tokio::test]
    async fn test_damage_floors_and_restores() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 0).await?;

        assert_eq!(apply_damage(&db, "u1", 30).await?, 70);
        assert_eq!(apply_damage(&db, "u1", 500).await?, 0);
        assert_eq!(restore_health(&db, "u1", 0.5).await?, 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_top_balances_ordering() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "poor", 10).await?;
        create_test_account(&db, "rich", 10_000).await?;
        create_test_account(&db, "mid", 500).await?;

        let top = top_balances(&db, 2).await?;
        let ids: Vec<_> = top.iter().map(|a| a.user_id.as_str()).collect();
        assert_eq!(ids, vec!["rich", "mid"]);
        Ok(())
    }
}
