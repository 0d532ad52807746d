//! Economy service - the single entry point for state-changing turns.
//!
//! Turns that read and then write shared state (risk actions, bail, work, purchases,
//! item use, donations) run one at a time behind [`Economy`]'s turn lock. The lock also owns the
//! dice, so a turn's rolls can never interleave with another's. Read-only queries go
//! straight to the core modules through [`Economy::db`].

use crate::{
    config::{economy::EconomyConfig, owner},
    core::{
        arrest::{self, NpcBail},
        catalog::{self, BodyguardTier},
        cooldown::CooldownTracker,
        dice::{Dice, RandomDice},
        effects::{self, ItemUse},
        inventory::{self, Purchase},
        ledger, profile,
        resolver::{Action, ActionProfile, Outcome, Resolver},
    },
    entities::{account, arrest as arrest_entity, crime_profile, pet},
    errors::{Error, Precondition, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Cooldown namespace for legal work.
pub const WORK_COOLDOWN: &str = "work";

/// Cooldown namespace shared by every bail flow.
pub const BAIL_COOLDOWN: &str = "bail";

/// Result of one shift of legal work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkShift {
    /// What the user did
    pub job: catalog::Job,
    /// Coins earned
    pub pay: i64,
    /// Balance afterwards
    pub balance: i64,
}

/// Shared economy state handed to every command.
pub struct Economy {
    db: DatabaseConnection,
    config: Arc<EconomyConfig>,
    cooldowns: CooldownTracker,
    turn: Mutex<Box<dyn Dice>>,
}

impl Economy {
    /// Creates the service with entropy-seeded dice.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: Arc<EconomyConfig>) -> Self {
        Self::with_dice(db, config, Box::new(RandomDice::from_entropy()))
    }

    /// Creates the service with a specific dice source.
    #[must_use]
    pub fn with_dice(db: DatabaseConnection, config: Arc<EconomyConfig>, dice: Box<dyn Dice>) -> Self {
        Self {
            db,
            config,
            cooldowns: CooldownTracker::new(),
            turn: Mutex::new(dice),
        }
    }

    /// Database handle for read-only queries.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Cooldown tracker, for display.
    #[must_use]
    pub const fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Opens the user's account on first contact and records activity.
    pub async fn open_account(&self, user_id: &str, now: DateTime<Utc>) -> Result<account::Model> {
        let account = ledger::ensure_account(&self.db, user_id, self.config.starting_balance).await?;
        ledger::touch_activity(&self.db, user_id, now).await?;
        Ok(account)
    }

    /// Resolves one risk action.
    #[instrument(skip(self, action))]
    pub async fn attempt(&self, actor_id: &str, action: &Action, now: DateTime<Utc>) -> Result<Outcome> {
        let mut dice = self.turn.lock().await;
        let profile = ActionProfile::for_action(&self.db, actor_id, action).await?;
        Resolver::new(&self.db, &self.config, &self.cooldowns, &mut **dice)
            .attempt(actor_id, &profile, now)
            .await
    }

    /// One shift of legal work: a random job paying a random amount.
    #[instrument(skip(self))]
    pub async fn work(&self, user_id: &str, now: DateTime<Utc>) -> Result<WorkShift> {
        let mut dice = self.turn.lock().await;
        if let Some(record) = arrest::get_arrest_info(&self.db, user_id, now).await? {
            return Err(Precondition::Arrested {
                remaining_secs: arrest::remaining_seconds(&record, now),
            }
            .into());
        }
        let window = self.config.cooldowns.duration_for(WORK_COOLDOWN);
        let check = self.cooldowns.check_and_consume(WORK_COOLDOWN, user_id, window, now);
        if !check.allowed {
            return Err(Precondition::OnCooldown {
                command: WORK_COOLDOWN.to_string(),
                remaining_ms: check.remaining_ms,
            }
            .into());
        }

        let last = i64::try_from(catalog::JOBS.len()).unwrap_or(1) - 1;
        let index = usize::try_from(dice.between(0, last)).unwrap_or_default();
        let job = catalog::JOBS.get(index).copied().ok_or_else(|| Error::Config {
            message: "no jobs configured".to_string(),
        })?;
        let pay = dice.between(job.min_pay, job.max_pay);
        let balance = ledger::add_balance(&self.db, user_id, pay).await?;

        info!("{user_id} {} for {pay} coins", job.description);
        Ok(WorkShift { job, pay, balance })
    }

    fn check_bail_cooldown(&self, user_id: &str, now: DateTime<Utc>) -> Result<()> {
        let window = self.config.cooldowns.duration_for(BAIL_COOLDOWN);
        let check = self.cooldowns.check(BAIL_COOLDOWN, user_id, window, now);
        if check.allowed {
            Ok(())
        } else {
            Err(Precondition::OnCooldown {
                command: BAIL_COOLDOWN.to_string(),
                remaining_ms: check.remaining_ms,
            }
            .into())
        }
    }

    /// Pays the user's own bail.
    pub async fn bail_self(&self, user_id: &str, now: DateTime<Utc>) -> Result<i64> {
        let _turn = self.turn.lock().await;
        self.check_bail_cooldown(user_id, now)?;
        let paid = arrest::pay_bail_self(&self.db, user_id, now).await?;
        self.cooldowns.record(BAIL_COOLDOWN, user_id, now);
        Ok(paid)
    }

    /// Asks NPC friends to cover the user's bail.
    pub async fn bail_npc(&self, user_id: &str, now: DateTime<Utc>) -> Result<NpcBail> {
        let mut dice = self.turn.lock().await;
        self.check_bail_cooldown(user_id, now)?;
        let paid = arrest::npc_bail(&self.db, user_id, &mut **dice, now).await?;
        self.cooldowns.record(BAIL_COOLDOWN, user_id, now);
        Ok(paid)
    }

    /// Validates an arrested user's request for `payer_id` to bail them out, without
    /// changing anything. The bail cooldown belongs to the arrested requester.
    pub async fn check_friend_bail(
        &self,
        arrested_id: &str,
        payer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<arrest_entity::Model> {
        self.check_bail_cooldown(arrested_id, now)?;
        arrest::check_friend_bail(&self.db, payer_id, arrested_id, now).await
    }

    /// Charges the friend once they accepted the request.
    ///
    /// Everything is re-checked here; the arrest may have ended or the friend may have
    /// spent the money while the request was pending.
    pub async fn bail_friend(&self, arrested_id: &str, payer_id: &str, now: DateTime<Utc>) -> Result<i64> {
        let _turn = self.turn.lock().await;
        self.check_bail_cooldown(arrested_id, now)?;
        let paid = arrest::pay_bail_for_friend(&self.db, payer_id, arrested_id, now).await?;
        self.cooldowns.record(BAIL_COOLDOWN, arrested_id, now);
        Ok(paid)
    }

    /// Administrative release; only the configured owner may do this.
    pub async fn force_release(&self, actor_id: &str, user_id: &str) -> Result<bool> {
        let _turn = self.turn.lock().await;
        arrest::force_release(&self.db, actor_id, owner::is_admin(actor_id), user_id).await
    }

    /// Consumes one unit of a consumable.
    pub async fn use_item(&self, user_id: &str, item_id: &str, now: DateTime<Utc>) -> Result<ItemUse> {
        let _turn = self.turn.lock().await;
        effects::use_item(&self.db, &self.cooldowns, user_id, item_id, now).await
    }

    /// Buys from the shop.
    pub async fn buy(&self, user_id: &str, item_id: &str, quantity: i32) -> Result<Purchase> {
        let _turn = self.turn.lock().await;
        inventory::buy(&self.db, user_id, item_id, quantity).await
    }

    /// Hires one bodyguard of the given tier.
    pub async fn hire_bodyguard(&self, user_id: &str, tier: BodyguardTier) -> Result<crime_profile::Model> {
        let _turn = self.turn.lock().await;
        profile::hire_bodyguard(&self.db, user_id, tier).await
    }

    /// Buys a pet, replacing any current one.
    pub async fn adopt_pet(
        &self,
        user_id: &str,
        species: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<pet::Model> {
        let _turn = self.turn.lock().await;
        profile::adopt_pet(&self.db, user_id, species, name, now).await
    }

    /// Feeds the user's pet.
    pub async fn feed_pet(&self, user_id: &str, now: DateTime<Utc>) -> Result<pet::Model> {
        let _turn = self.turn.lock().await;
        profile::feed_pet(&self.db, user_id, now).await
    }

    /// Gives coins to another user. Returns the donor's new balance.
    #[instrument(skip(self))]
    pub async fn donate(&self, donor_id: &str, recipient_id: &str, amount: i64) -> Result<i64> {
        if amount <= 0 {
            return Err(Error::InvalidAmount { amount });
        }
        if donor_id == recipient_id {
            return Err(Precondition::SelfTarget.into());
        }
        let _turn = self.turn.lock().await;

        let txn = self.db.begin().await?;
        let balance = ledger::get_balance(&txn, donor_id).await?;
        if balance < amount {
            return Err(Precondition::InsufficientFunds {
                current: balance,
                required: amount,
            }
            .into());
        }
        ledger::ensure_account(&txn, recipient_id, self.config.starting_balance).await?;
        ledger::transfer(&txn, donor_id, recipient_id, amount).await?;
        let remaining = ledger::get_balance(&txn, donor_id).await?;
        txn.commit().await?;

        info!("{donor_id} donated {amount} to {recipient_id}");
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::resolver::Resolution;
    use crate::test_utils::*;
    use chrono::Duration;

    async fn economy(rolls: &[f64]) -> Result<Economy> {
        let db = setup_test_db().await?;
        Ok(Economy::with_dice(
            db,
            Arc::new(EconomyConfig::default()),
            Box::new(ScriptedDice::new(rolls)),
        ))
    }

    #[tokio::test]
    async fn test_open_account_grants_starting_balance_once() -> Result<()> {
        let economy = economy(&[0.5]).await?;
        let account = economy.open_account("u1", test_now()).await?;
        assert_eq!(account.balance, 1000);

        ledger::subtract_balance(economy.db(), "u1", 400).await?;
        let again = economy.open_account("u1", test_now()).await?;
        assert_eq!(again.balance, 600);
        Ok(())
    }

    #[tokio::test]
    async fn test_work_pays_and_cools_down() -> Result<()> {
        // Job index 0 (delivered packages), pay 50
        let economy = economy(&[0.0]).await?;
        create_test_account(economy.db(), "u1", 0).await?;

        let shift = economy.work("u1", test_now()).await?;
        assert_eq!(shift.job.description, "delivered packages");
        assert_eq!(shift.pay, 50);
        assert_eq!(shift.balance, 50);

        let again = economy.work("u1", test_now() + Duration::seconds(5)).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::Precondition(Precondition::OnCooldown { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_arrested_user_cannot_work() -> Result<()> {
        let economy = economy(&[0.0]).await?;
        create_test_account(economy.db(), "u1", 0).await?;
        arrest::arrest(economy.db(), "u1", Duration::minutes(2), "x", 100, test_now()).await?;

        let result = economy.work("u1", test_now()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Precondition(Precondition::Arrested { remaining_secs: 120 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_bail_self_starts_bail_cooldown() -> Result<()> {
        let economy = economy(&[0.5]).await?;
        create_test_account(economy.db(), "u1", 5_000).await?;
        arrest::arrest(economy.db(), "u1", Duration::minutes(5), "x", 600, test_now()).await?;

        assert_eq!(economy.bail_self("u1", test_now()).await?, 600);
        assert_eq!(ledger::get_balance(economy.db(), "u1").await?, 4_400);

        arrest::arrest(economy.db(), "u1", Duration::minutes(5), "x", 600, test_now()).await?;
        let again = economy.bail_self("u1", test_now()).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::Precondition(Precondition::OnCooldown { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_bail_does_not_start_cooldown() -> Result<()> {
        let economy = economy(&[0.5]).await?;
        create_test_account(economy.db(), "u1", 100).await?;
        arrest::arrest(economy.db(), "u1", Duration::minutes(5), "x", 600, test_now()).await?;

        assert!(economy.bail_self("u1", test_now()).await.is_err());
        ledger::add_balance(economy.db(), "u1", 500).await?;
        assert_eq!(economy.bail_self("u1", test_now()).await?, 600);
        Ok(())
    }

    #[tokio::test]
    async fn test_friend_bail_rechecks_at_payment() -> Result<()> {
        let economy = economy(&[0.5]).await?;
        create_test_account(economy.db(), "payer", 1_000).await?;
        create_test_account(economy.db(), "jailed", 0).await?;
        arrest::arrest(economy.db(), "jailed", Duration::minutes(5), "x", 800, test_now()).await?;

        economy.check_friend_bail("jailed", "payer", test_now()).await?;
        // The friend spends money while the request is pending
        ledger::subtract_balance(economy.db(), "payer", 500).await?;

        let result = economy.bail_friend("jailed", "payer", test_now()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Precondition(Precondition::InsufficientFunds { .. })
        ));
        assert!(arrest::is_arrested(economy.db(), "jailed", test_now()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_friend_bail_cooldown_belongs_to_requester() -> Result<()> {
        let economy = economy(&[0.5]).await?;
        create_test_account(economy.db(), "payer", 5_000).await?;
        create_test_account(economy.db(), "jailed", 0).await?;
        create_test_account(economy.db(), "other", 0).await?;
        arrest::arrest(economy.db(), "jailed", Duration::minutes(5), "x", 800, test_now()).await?;

        assert_eq!(economy.bail_friend("jailed", "payer", test_now()).await?, 800);
        assert_eq!(ledger::get_balance(economy.db(), "payer").await?, 4_200);
        assert!(!arrest::is_arrested(economy.db(), "jailed", test_now()).await?);

        // The friend who paid can still be asked by someone else right away
        arrest::arrest(economy.db(), "other", Duration::minutes(5), "x", 300, test_now()).await?;
        assert_eq!(economy.bail_friend("other", "payer", test_now()).await?, 300);

        // The requester is on the bail cooldown
        arrest::arrest(economy.db(), "jailed", Duration::minutes(5), "x", 800, test_now()).await?;
        let again = economy.check_friend_bail("jailed", "payer", test_now()).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::Precondition(Precondition::OnCooldown { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_force_release_requires_owner() -> Result<()> {
        let economy = economy(&[0.5]).await?;
        arrest::arrest(economy.db(), "u1", Duration::minutes(5), "x", 100, test_now()).await?;

        let result = economy.force_release("", "u1").await;
        assert!(matches!(result.unwrap_err(), Error::Unauthorized { .. }));
        assert!(arrest::is_arrested(economy.db(), "u1", test_now()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_bought_tools_unlock_a_heist() -> Result<()> {
        let economy = economy(&[0.99]).await?;
        create_test_account(economy.db(), "u1", 5_000).await?;
        let action = Action::Heist {
            target: "armored_truck".to_string(),
        };

        let without = economy.attempt("u1", &action, test_now()).await;
        assert!(matches!(
            without.unwrap_err(),
            Error::Precondition(Precondition::MissingItem { .. })
        ));

        let purchase = economy.buy("u1", "explosives", 1).await?;
        assert_eq!(purchase.balance, 1_000);
        let outcome = economy.attempt("u1", &action, test_now()).await?;
        assert_eq!(outcome.resolution, Resolution::Success);
        assert_eq!(inventory::item_count(economy.db(), "u1", "explosives").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_donate() -> Result<()> {
        let economy = economy(&[0.5]).await?;
        create_test_account(economy.db(), "a", 300).await?;
        create_test_account(economy.db(), "b", 0).await?;

        assert_eq!(economy.donate("a", "b", 200).await?, 100);
        assert_eq!(ledger::get_balance(economy.db(), "b").await?, 200);

        assert!(matches!(
            economy.donate("a", "b", 500).await.unwrap_err(),
            Error::Precondition(Precondition::InsufficientFunds { current: 100, .. })
        ));
        assert!(matches!(
            economy.donate("a", "b", 0).await.unwrap_err(),
            Error::InvalidAmount { amount: 0 }
        ));
        assert!(matches!(
            economy.donate("a", "a", 10).await.unwrap_err(),
            Error::Precondition(Precondition::SelfTarget)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_attempts_are_serialized() -> Result<()> {
        // Both runs would succeed on the roll, but only one may pass the cooldown check
        let economy = economy(&[0.9]).await?;
        create_test_account(economy.db(), "u1", 1_000).await?;
        let action = Action::Smuggle {
            route: "local_delivery".to_string(),
            contraband: None,
        };

        let (first, second) = tokio::join!(
            economy.attempt("u1", &action, test_now()),
            economy.attempt("u1", &action, test_now()),
        );
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(Error::Precondition(Precondition::OnCooldown { .. }))
        )));
        // One investment paid, one payout received
        let balance = ledger::get_balance(economy.db(), "u1").await?;
        assert!((1_300..=1_700).contains(&balance));
        Ok(())
    }
}
