//! Arrest registry and bail flows.
//!
//! A user is either free or holds exactly one arrest record. Records past their
//! `arrested_until` are treated as absent and deleted the next time anyone asks.
//! Arrests end by expiry, by bail (self, another player, or an NPC friend) or by an
//! administrator.

use crate::{
    core::{
        catalog,
        dice::Dice,
        ledger,
        preferences::{self, PreferenceKey},
        profile,
    },
    entities::{Arrest, arrest},
    errors::{Error, Precondition, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Friendship gained when an NPC posts bail.
pub const NPC_BAIL_FRIENDSHIP_GAIN: i32 = 5;

/// Places a user under arrest, replacing any existing record.
#[instrument(skip(db))]
pub async fn arrest<C>(
    db: &C,
    user_id: &str,
    duration: Duration,
    reason: &str,
    bail_amount: i64,
    now: DateTime<Utc>,
) -> Result<arrest::Model>
where
    C: ConnectionTrait,
{
    Arrest::delete_by_id(user_id).exec(db).await?;
    let record = arrest::ActiveModel {
        user_id: Set(user_id.to_string()),
        arrested_until: Set(now + duration),
        reason: Set(reason.to_string()),
        bail_amount: Set(bail_amount.max(0)),
    }
    .insert(db)
    .await?;

    info!(
        "Arrested {user_id} until {} (bail {}): {reason}",
        record.arrested_until, record.bail_amount
    );
    Ok(record)
}

/// The active arrest record, purging it first if it has expired.
pub async fn get_arrest_info<C>(
    db: &C,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<arrest::Model>>
where
    C: ConnectionTrait,
{
    let Some(record) = Arrest::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };
    if now >= record.arrested_until {
        debug!("Arrest of {user_id} expired at {}", record.arrested_until);
        record.delete(db).await?;
        return Ok(None);
    }
    Ok(Some(record))
}

/// Whether the user is currently under arrest.
pub async fn is_arrested<C>(db: &C, user_id: &str, now: DateTime<Utc>) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(get_arrest_info(db, user_id, now).await?.is_some())
}

/// Whole seconds left on the arrest, rounded up; 0 when free.
pub async fn get_remaining_seconds<C>(db: &C, user_id: &str, now: DateTime<Utc>) -> Result<i64>
where
    C: ConnectionTrait,
{
    Ok(get_arrest_info(db, user_id, now)
        .await?
        .map_or(0, |record| remaining_seconds(&record, now)))
}

/// Seconds left on a record, rounded up.
#[must_use]
pub fn remaining_seconds(record: &arrest::Model, now: DateTime<Utc>) -> i64 {
    let ms = (record.arrested_until - now).num_milliseconds().max(0);
    (ms + 999) / 1000
}

/// Ends an arrest. Returns whether there was one to end.
pub async fn release<C>(db: &C, user_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let deleted = Arrest::delete_by_id(user_id).exec(db).await?;
    if deleted.rows_affected > 0 {
        info!("Released {user_id}");
    }
    Ok(deleted.rows_affected > 0)
}

async fn require_arrest<C>(db: &C, user_id: &str, now: DateTime<Utc>) -> Result<arrest::Model>
where
    C: ConnectionTrait,
{
    get_arrest_info(db, user_id, now)
        .await?
        .ok_or_else(|| Precondition::NotArrested.into())
}

async fn charge<C>(db: &C, payer_id: &str, amount: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let balance = ledger::get_balance(db, payer_id).await?;
    if balance < amount {
        return Err(Precondition::InsufficientFunds {
            current: balance,
            required: amount,
        }
        .into());
    }
    ledger::subtract_balance(db, payer_id, amount).await?;
    Ok(())
}

/// Pays one's own bail. Returns the amount paid.
#[instrument(skip(db))]
pub async fn pay_bail_self(db: &DatabaseConnection, user_id: &str, now: DateTime<Utc>) -> Result<i64> {
    let txn = db.begin().await?;
    let record = require_arrest(&txn, user_id, now).await?;
    charge(&txn, user_id, record.bail_amount).await?;
    release(&txn, user_id).await?;
    txn.commit().await?;

    info!("{user_id} paid their own bail of {}", record.bail_amount);
    Ok(record.bail_amount)
}

/// Checks that a third party may bail `arrested_id` out, without changing anything.
///
/// Used before asking the payer to confirm, so obviously doomed requests fail early.
pub async fn check_friend_bail<C>(
    db: &C,
    payer_id: &str,
    arrested_id: &str,
    now: DateTime<Utc>,
) -> Result<arrest::Model>
where
    C: ConnectionTrait,
{
    if payer_id == arrested_id {
        return Err(Precondition::SelfTarget.into());
    }
    let record = require_arrest(db, arrested_id, now).await?;
    if !preferences::get(db, arrested_id, PreferenceKey::AutoBailFriends).await? {
        return Err(Precondition::BailDeclinedByPreference.into());
    }
    let balance = ledger::get_balance(db, payer_id).await?;
    if balance < record.bail_amount {
        return Err(Precondition::InsufficientFunds {
            current: balance,
            required: record.bail_amount,
        }
        .into());
    }
    Ok(record)
}

/// Another player pays the bail. Returns the amount paid.
#[instrument(skip(db))]
pub async fn pay_bail_for_friend(
    db: &DatabaseConnection,
    payer_id: &str,
    arrested_id: &str,
    now: DateTime<Utc>,
) -> Result<i64> {
    let txn = db.begin().await?;
    let record = check_friend_bail(&txn, payer_id, arrested_id, now).await?;
    charge(&txn, payer_id, record.bail_amount).await?;
    release(&txn, arrested_id).await?;
    txn.commit().await?;

    info!(
        "{payer_id} paid bail of {} for {arrested_id}",
        record.bail_amount
    );
    Ok(record.bail_amount)
}

/// An NPC friend who paid a user's bail.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcBail {
    /// The friend who paid
    pub friend: catalog::NpcFriend,
    /// Bail covered
    pub amount: i64,
    /// Friendship level after the gain
    pub friendship_level: i32,
}

/// Asks NPC friends, in catalog order, to pay the bail.
///
/// A friend is eligible when the friendship is strong enough and the bail fits their
/// budget; each eligible friend then rolls `bail_chance`. The first yes wins.
#[instrument(skip(db, dice))]
pub async fn npc_bail(
    db: &DatabaseConnection,
    user_id: &str,
    dice: &mut dyn Dice,
    now: DateTime<Utc>,
) -> Result<NpcBail> {
    let txn = db.begin().await?;
    let record = require_arrest(&txn, user_id, now).await?;

    for friend in catalog::NPC_FRIENDS {
        let Some(friendship) = profile::get_friendship(&txn, user_id, friend.id).await? else {
            continue;
        };
        if friendship.level < friend.friendship_required || record.bail_amount > friend.max_bail {
            continue;
        }
        if !dice.chance(friend.bail_chance) {
            debug!("{} declined to bail out {user_id}", friend.id);
            continue;
        }

        release(&txn, user_id).await?;
        let updated =
            profile::increase_friendship(&txn, user_id, friend.id, NPC_BAIL_FRIENDSHIP_GAIN)
                .await?;
        txn.commit().await?;

        info!("{} bailed out {user_id} ({} coins)", friend.id, record.bail_amount);
        return Ok(NpcBail {
            friend: *friend,
            amount: record.bail_amount,
            friendship_level: updated.level,
        });
    }

    Err(Precondition::NoFriendAvailable.into())
}

/// Administrative release. Fails with `Unauthorized` unless `is_admin` is true.
#[instrument(skip(db))]
pub async fn force_release<C>(
    db: &C,
    actor_id: &str,
    is_admin: bool,
    user_id: &str,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    if !is_admin {
        warn!("{actor_id} attempted to force-release {user_id}");
        return Err(Error::Unauthorized {
            user_id: actor_id.to_string(),
        });
    }
    let released = release(db, user_id).await?;
    info!("Admin {actor_id} force-released {user_id} (was arrested: {released})");
    Ok(released)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_arrest_and_passive_expiry() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        arrest(&db, "u1", Duration::minutes(5), "robbery", 500, now).await?;

        assert!(is_arrested(&db, "u1", now).await?);
        assert_eq!(get_remaining_seconds(&db, "u1", now).await?, 300);

        let later = now + Duration::minutes(5);
        assert!(!is_arrested(&db, "u1", later).await?);
        assert_eq!(get_remaining_seconds(&db, "u1", later).await?, 0);
        // The expired record was purged
        assert!(Arrest::find_by_id("u1").one(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_arrest_overwrites_not_stacks() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        arrest(&db, "u1", Duration::minutes(60), "heist", 9_000, now).await?;
        arrest(&db, "u1", Duration::minutes(2), "rob", 200, now).await?;

        let info = get_arrest_info(&db, "u1", now).await?.unwrap();
        assert_eq!(info.bail_amount, 200);
        assert_eq!(info.reason, "rob");
        assert_eq!(remaining_seconds(&info, now), 120);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_user_not_arrested() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(!is_arrested(&db, "nobody", test_now()).await?);
        assert!(get_arrest_info(&db, "nobody", test_now()).await?.is_none());
        assert!(!release(&db, "nobody").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_remaining_seconds_rounds_up() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        arrest(&db, "u1", Duration::milliseconds(1_500), "x", 0, now).await?;
        assert_eq!(get_remaining_seconds(&db, "u1", now).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_bail_self() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        create_test_account(&db, "u1", 1_000).await?;
        arrest(&db, "u1", Duration::minutes(3), "rob", 600, now).await?;

        assert_eq!(pay_bail_self(&db, "u1", now).await?, 600);
        assert_eq!(ledger::get_balance(&db, "u1").await?, 400);
        assert!(!is_arrested(&db, "u1", now).await?);

        let again = pay_bail_self(&db, "u1", now).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::Precondition(Precondition::NotArrested)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_bail_self_insufficient_leaves_state() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        create_test_account(&db, "u1", 100).await?;
        arrest(&db, "u1", Duration::minutes(3), "rob", 600, now).await?;

        let result = pay_bail_self(&db, "u1", now).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Precondition(Precondition::InsufficientFunds { .. })
        ));
        assert_eq!(ledger::get_balance(&db, "u1").await?, 100);
        assert!(is_arrested(&db, "u1", now).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_friend_bail_respects_preference() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        create_test_account(&db, "payer", 5_000).await?;
        create_test_account(&db, "jailed", 0).await?;
        arrest(&db, "jailed", Duration::minutes(3), "rob", 1_000, now).await?;

        preferences::update(&db, "jailed", "auto_bail_friends", false).await?;
        let declined = pay_bail_for_friend(&db, "payer", "jailed", now).await;
        assert!(matches!(
            declined.unwrap_err(),
            Error::Precondition(Precondition::BailDeclinedByPreference)
        ));

        preferences::update(&db, "jailed", "auto_bail_friends", true).await?;
        assert_eq!(pay_bail_for_friend(&db, "payer", "jailed", now).await?, 1_000);
        assert_eq!(ledger::get_balance(&db, "payer").await?, 4_000);
        assert_eq!(ledger::get_balance(&db, "jailed").await?, 0);
        assert!(!is_arrested(&db, "jailed", now).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_npc_bail_eligibility_and_roll() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        // Larry (required 50, max 10k, chance 0.8) is eligible, Rachel is not
        profile::increase_friendship(&db, "u1", "loyal_larry", 50).await?;
        profile::increase_friendship(&db, "u1", "rich_rachel", 10).await?;
        arrest(&db, "u1", Duration::minutes(3), "rob", 2_000, now).await?;

        let mut unlucky = ScriptedDice::new(&[0.95]);
        let refused = npc_bail(&db, "u1", &mut unlucky, now).await;
        assert!(matches!(
            refused.unwrap_err(),
            Error::Precondition(Precondition::NoFriendAvailable)
        ));
        assert!(is_arrested(&db, "u1", now).await?);

        let mut lucky = ScriptedDice::new(&[0.1]);
        let bailed = npc_bail(&db, "u1", &mut lucky, now).await?;
        assert_eq!(bailed.friend.id, "loyal_larry");
        assert_eq!(bailed.amount, 2_000);
        assert_eq!(bailed.friendship_level, 55);
        assert!(!is_arrested(&db, "u1", now).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_npc_bail_respects_max_bail() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        profile::increase_friendship(&db, "u1", "loyal_larry", 100).await?;
        arrest(&db, "u1", Duration::minutes(90), "heist", 25_000, now).await?;

        let mut dice = ScriptedDice::new(&[0.0]);
        assert!(npc_bail(&db, "u1", &mut dice, now).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_force_release_requires_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        arrest(&db, "u1", Duration::minutes(3), "rob", 100, now).await?;

        let denied = force_release(&db, "rando", false, "u1").await;
        assert!(matches!(denied.unwrap_err(), Error::Unauthorized { .. }));
        assert!(is_arrested(&db, "u1", now).await?);

        assert!(force_release(&db, "owner", true, "u1").await?);
        assert!(!is_arrested(&db, "u1", now).await?);
        Ok(())
    }
}
