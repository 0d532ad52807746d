//! Effect overlay - temporary per-user modifiers from drugs and drinks.
//!
//! Effects are stored with an absolute expiry and purged lazily: every read deletes
//! expired rows before aggregating, so an expired effect is never acted upon.

use crate::{
    core::{catalog, cooldown::CooldownTracker, inventory},
    entities::{Effect, effect},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Modifier values carried by one effect. Percentages are whole numbers (`15` = 15%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Lowers crime risk and raises coin payouts
    pub luck: f64,
    /// Cosmetic speed boost
    pub speed: f64,
    /// Shortens command cooldowns
    pub cooldown_reduction: f64,
    /// Raises outgoing combat damage
    pub attack: f64,
    /// Lowers incoming combat damage
    pub defense: f64,
    /// Lowers incoming combat damage
    pub damage_immunity: f64,
    /// Multiplies crime XP gained
    pub xp_multiplier: f64,
    /// Attacks ignore the target's armor
    pub pain_immunity: bool,
    /// Asleep: cannot act or be targeted
    pub sleep_protection: bool,
}

impl Modifiers {
    /// No modifiers at all.
    pub const NONE: Self = Self {
        luck: 0.0,
        speed: 0.0,
        cooldown_reduction: 0.0,
        attack: 0.0,
        defense: 0.0,
        damage_immunity: 0.0,
        xp_multiplier: 1.0,
        pain_immunity: false,
        sleep_protection: false,
    };
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Aggregate of every active effect on a user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveModifiers {
    /// Summed luck percentage
    pub luck: f64,
    /// Summed speed percentage
    pub speed: f64,
    /// Summed cooldown reduction percentage
    pub cooldown_reduction: f64,
    /// Summed attack boost percentage
    pub attack: f64,
    /// Summed defense percentage
    pub defense: f64,
    /// Summed damage immunity percentage
    pub damage_immunity: f64,
    /// Product of XP multipliers
    pub xp_multiplier: f64,
    /// Any effect grants pain immunity
    pub pain_immunity: bool,
    /// Any effect grants sleep protection
    pub sleep_protection: bool,
}

impl Default for ActiveModifiers {
    fn default() -> Self {
        Self {
            luck: 0.0,
            speed: 0.0,
            cooldown_reduction: 0.0,
            attack: 0.0,
            defense: 0.0,
            damage_immunity: 0.0,
            xp_multiplier: 1.0,
            pain_immunity: false,
            sleep_protection: false,
        }
    }
}

impl ActiveModifiers {
    /// Folds one effect's modifiers into the aggregate.
    fn absorb(&mut self, m: &Modifiers) {
        self.luck += m.luck;
        self.speed += m.speed;
        self.cooldown_reduction += m.cooldown_reduction;
        self.attack += m.attack;
        self.defense += m.defense;
        self.damage_immunity += m.damage_immunity;
        self.xp_multiplier *= m.xp_multiplier;
        self.pain_immunity |= m.pain_immunity;
        self.sleep_protection |= m.sleep_protection;
    }

    /// Additive bonus applied to outgoing damage, as a fraction.
    #[must_use]
    pub fn attack_bonus(&self) -> f64 {
        self.attack / 100.0
    }

    /// Fraction of incoming damage absorbed, capped below 1.
    #[must_use]
    pub fn damage_reduction(&self) -> f64 {
        ((self.damage_immunity + self.defense) / 100.0).clamp(0.0, 0.95)
    }

    /// Fraction by which cooldowns are shortened, capped at 90%.
    #[must_use]
    pub fn cooldown_factor(&self) -> f64 {
        1.0 - (self.cooldown_reduction / 100.0).clamp(0.0, 0.9)
    }
}

/// Outcome of consuming an item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemUse {
    /// A timed effect was applied
    Applied {
        /// Effect key
        effect_key: String,
        /// When it wears off
        expires_at: DateTime<Utc>,
    },
    /// All of the user's cooldowns were cleared
    CooldownsReset,
}

/// Stores an effect with an absolute expiry, replacing any active effect with the same key.
#[instrument(skip(db, modifiers))]
pub async fn apply_effect<C>(
    db: &C,
    user_id: &str,
    effect_key: &str,
    modifiers: &Modifiers,
    duration_minutes: i64,
    now: DateTime<Utc>,
) -> Result<effect::Model>
where
    C: ConnectionTrait,
{
    if duration_minutes <= 0 {
        return Err(Error::InvalidAmount {
            amount: duration_minutes,
        });
    }

    Effect::delete_many()
        .filter(effect::Column::UserId.eq(user_id))
        .filter(effect::Column::EffectKey.eq(effect_key))
        .exec(db)
        .await?;

    let expires_at = now + Duration::minutes(duration_minutes);
    let model = effect::ActiveModel {
        user_id: Set(user_id.to_string()),
        effect_key: Set(effect_key.to_string()),
        modifiers: Set(serde_json::to_value(modifiers)?),
        expires_at: Set(expires_at),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Applied effect '{effect_key}' to {user_id} until {expires_at}");
    Ok(model)
}

/// Deletes expired effects and returns the ones still active.
pub async fn get_active_effects<C>(
    db: &C,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<effect::Model>>
where
    C: ConnectionTrait,
{
    let purged = Effect::delete_many()
        .filter(effect::Column::UserId.eq(user_id))
        .filter(effect::Column::ExpiresAt.lte(now))
        .exec(db)
        .await?;
    if purged.rows_affected > 0 {
        debug!("Purged {} expired effects for {user_id}", purged.rows_affected);
    }

    Effect::find()
        .filter(effect::Column::UserId.eq(user_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Aggregates every active effect on a user into one set of modifiers.
pub async fn get_active_modifiers<C>(
    db: &C,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<ActiveModifiers>
where
    C: ConnectionTrait,
{
    let mut active = ActiveModifiers::default();
    for effect in get_active_effects(db, user_id, now).await? {
        let modifiers: Modifiers = serde_json::from_value(effect.modifiers)?;
        active.absorb(&modifiers);
    }
    Ok(active)
}

/// True while a sleep-protection effect is active.
pub async fn is_asleep<C>(db: &C, user_id: &str, now: DateTime<Utc>) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(get_active_modifiers(db, user_id, now)
        .await?
        .sleep_protection)
}

/// Consumes one unit of a consumable and applies what it does.
///
/// Timed consumables become effects keyed by the item id. Consumables that reset
/// cooldowns clear every entry the user has in `cooldowns`.
#[instrument(skip(db, cooldowns))]
pub async fn use_item(
    db: &DatabaseConnection,
    cooldowns: &CooldownTracker,
    user_id: &str,
    item_id: &str,
    now: DateTime<Utc>,
) -> Result<ItemUse> {
    let consumable =
        catalog::consumable(item_id).ok_or_else(|| Error::not_found("consumable", item_id))?;

    let txn = db.begin().await?;
    inventory::remove_item(&txn, user_id, item_id, 1).await?;

    let result = if let Some(minutes) = consumable.duration_minutes {
        let applied =
            apply_effect(&txn, user_id, item_id, &consumable.modifiers, minutes, now).await?;
        ItemUse::Applied {
            effect_key: applied.effect_key,
            expires_at: applied.expires_at,
        }
    } else {
        ItemUse::CooldownsReset
    };
    txn.commit().await?;

    if result == ItemUse::CooldownsReset {
        cooldowns.reset_user(user_id);
        info!("Reset all cooldowns for {user_id}");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::Precondition;
    use crate::test_utils::*;

    fn luck(amount: f64) -> Modifiers {
        Modifiers {
            luck: amount,
            ..Modifiers::NONE
        }
    }

    #[tokio::test]
    async fn test_effect_expires_passively() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        apply_effect(&db, "u1", "weed", &luck(15.0), 30, now).await?;

        let during = get_active_modifiers(&db, "u1", now + Duration::minutes(29)).await?;
        assert_eq!(during.luck, 15.0);

        let after = get_active_modifiers(&db, "u1", now + Duration::minutes(30)).await?;
        assert_eq!(after.luck, 0.0);

        // The expired row is gone, not just ignored
        assert!(Effect::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_overwrites_same_key() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        apply_effect(&db, "u1", "weed", &luck(15.0), 30, now).await?;
        apply_effect(&db, "u1", "weed", &luck(40.0), 30, now).await?;

        let active = get_active_modifiers(&db, "u1", now).await?;
        assert_eq!(active.luck, 40.0);
        assert_eq!(get_active_effects(&db, "u1", now).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_modifiers_aggregate_by_category() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        let steroids = catalog::consumable("steroids").unwrap();
        let whiskey = catalog::consumable("whiskey").unwrap();
        let lsd = catalog::consumable("lsd").unwrap();
        apply_effect(&db, "u1", "steroids", &steroids.modifiers, 30, now).await?;
        apply_effect(&db, "u1", "whiskey", &whiskey.modifiers, 60, now).await?;
        apply_effect(&db, "u1", "lsd", &lsd.modifiers, 45, now).await?;

        let active = get_active_modifiers(&db, "u1", now).await?;
        assert_eq!(active.attack, 70.0);
        assert_eq!(active.damage_immunity, 25.0);
        assert_eq!(active.xp_multiplier, 2.0);
        assert!(!active.sleep_protection);
        Ok(())
    }

    #[tokio::test]
    async fn test_is_asleep_window() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        let pills = catalog::consumable("sleeping_pills").unwrap();
        apply_effect(&db, "x", "sleeping_pills", &pills.modifiers, 60, now).await?;

        assert!(is_asleep(&db, "x", now + Duration::minutes(59)).await?);
        assert!(!is_asleep(&db, "x", now + Duration::minutes(60)).await?);
        assert!(!is_asleep(&db, "someone_else", now).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_use_item_consumes_and_applies() -> Result<()> {
        let db = setup_test_db().await?;
        let cooldowns = CooldownTracker::new();
        let now = test_now();
        give_item(&db, "u1", "cocaine", 2).await?;

        let result = use_item(&db, &cooldowns, "u1", "cocaine", now).await?;
        assert!(matches!(result, ItemUse::Applied { .. }));
        assert_eq!(inventory::item_count(&db, "u1", "cocaine").await?, 1);

        let active = get_active_modifiers(&db, "u1", now).await?;
        assert_eq!(active.cooldown_reduction, 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_beer_resets_cooldowns() -> Result<()> {
        let db = setup_test_db().await?;
        let cooldowns = CooldownTracker::new();
        let now = test_now();
        give_item(&db, "u1", "beer", 1).await?;
        let window = std::time::Duration::from_secs(60);
        assert!(cooldowns.check_and_consume("rob", "u1", window, now).allowed);
        assert!(!cooldowns.check_and_consume("rob", "u1", window, now).allowed);

        let result = use_item(&db, &cooldowns, "u1", "beer", now).await?;
        assert_eq!(result, ItemUse::CooldownsReset);
        assert!(cooldowns.check_and_consume("rob", "u1", window, now).allowed);
        Ok(())
    }

    #[tokio::test]
    async fn test_use_item_without_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let cooldowns = CooldownTracker::new();
        let result = use_item(&db, &cooldowns, "u1", "heroin", test_now()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Precondition(Precondition::MissingItem { .. })
        ));
        assert!(Effect::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_use_unknown_item() -> Result<()> {
        let db = setup_test_db().await?;
        let cooldowns = CooldownTracker::new();
        let result = use_item(&db, &cooldowns, "u1", "pistol", test_now()).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
