//! Crime profile - XP and level, attempt counters, NPC friendships, bodyguards and pets.
//!
//! Level is derived from XP as `xp / 100 + 1` and only ever goes up.

use crate::{
    core::{
        catalog::{self, BodyguardTier, MAX_BODYGUARD_PROTECTION},
        ledger,
    },
    entities::{CrimeProfile, NpcFriendship, Pet, crime_profile, npc_friendship, pet},
    errors::{Error, Precondition, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// XP needed per level.
pub const XP_PER_LEVEL: i64 = 100;

/// Pets below this hunger or happiness refuse to fight.
pub const PET_MOOD_THRESHOLD: i32 = 30;

/// Hunger lost per hour since the last meal.
pub const PET_HUNGER_DECAY_PER_HOUR: f64 = 2.0;

/// Happiness lost per hour since it was last topped up.
pub const PET_HAPPINESS_DECAY_PER_HOUR: f64 = 1.5;

/// Level for a given amount of XP.
#[must_use]
pub fn level_for_xp(xp: i64) -> i32 {
    i32::try_from(xp.max(0) / XP_PER_LEVEL + 1).unwrap_or(i32::MAX)
}

/// Risk reduction earned by experience: 1% per level above 1, at most 15%.
#[must_use]
pub fn skill_bonus(level: i32) -> f64 {
    (f64::from(level.max(1) - 1) * 0.01).min(0.15)
}

/// Combined protection of a profile's bodyguards, capped.
#[must_use]
pub fn bodyguard_protection(profile: &crime_profile::Model) -> f64 {
    let total = f64::from(profile.basic_bodyguards) * BodyguardTier::Basic.protection()
        + f64::from(profile.professional_bodyguards) * BodyguardTier::Professional.protection()
        + f64::from(profile.elite_bodyguards) * BodyguardTier::Elite.protection();
    total.min(MAX_BODYGUARD_PROTECTION)
}

fn decay(stored: i32, since: DateTime<Utc>, now: DateTime<Utc>, per_hour: f64) -> i32 {
    #[allow(clippy::cast_precision_loss)]
    let hours = (now - since).num_seconds().max(0) as f64 / 3600.0;
    #[allow(clippy::cast_possible_truncation)]
    let lost = (hours * per_hour).floor().min(f64::from(i32::MAX)) as i32;
    stored.saturating_sub(lost).max(0)
}

/// The pet as it is at `now`, with hunger and happiness worn down since they were stored.
#[must_use]
pub fn pet_at(mut pet: pet::Model, now: DateTime<Utc>) -> pet::Model {
    pet.hunger = decay(pet.hunger, pet.last_fed, now, PET_HUNGER_DECAY_PER_HOUR);
    pet.happiness = decay(pet.happiness, pet.last_played, now, PET_HAPPINESS_DECAY_PER_HOUR);
    pet
}

/// Chance a pet stops an attacker wielding a weapon of `weapon_damage`.
///
/// Zero when the pet is hungry or unhappy, otherwise clamped to `[0.1, 0.7]`.
#[must_use]
pub fn pet_defense_chance(pet: &pet::Model, weapon_damage: i64) -> f64 {
    if pet.hunger < PET_MOOD_THRESHOLD || pet.happiness < PET_MOOD_THRESHOLD {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = f64::from(pet.defense) + f64::from(pet.speed) + f64::from(pet.level) * 2.0
        - weapon_damage as f64 * 0.5;
    (score / 100.0).clamp(0.1, 0.7)
}

/// Fetches a profile without creating it.
pub async fn get_profile<C>(db: &C, user_id: &str) -> Result<Option<crime_profile::Model>>
where
    C: ConnectionTrait,
{
    CrimeProfile::find_by_id(user_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's profile, creating a fresh level 1 profile if needed.
pub async fn ensure_profile<C>(db: &C, user_id: &str) -> Result<crime_profile::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = get_profile(db, user_id).await? {
        return Ok(existing);
    }
    crime_profile::ActiveModel {
        user_id: Set(user_id.to_string()),
        crime_level: Set(1),
        crime_xp: Set(0),
        total_attempts: Set(0),
        successful_attempts: Set(0),
        times_arrested: Set(0),
        businesses_owned: Set(0),
        basic_bodyguards: Set(0),
        professional_bodyguards: Set(0),
        elite_bodyguards: Set(0),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Counts a successful attempt and grants XP. Returns the updated profile.
pub async fn record_success<C>(db: &C, user_id: &str, xp: i64) -> Result<crime_profile::Model>
where
    C: ConnectionTrait,
{
    let profile = ensure_profile(db, user_id).await?;
    let new_xp = profile.crime_xp.saturating_add(xp.max(0));
    let new_level = profile.crime_level.max(level_for_xp(new_xp));
    if new_level > profile.crime_level {
        info!("{user_id} reached crime level {new_level}");
    }

    let mut active: crime_profile::ActiveModel = profile.clone().into();
    active.crime_xp = Set(new_xp);
    active.crime_level = Set(new_level);
    active.total_attempts = Set(profile.total_attempts + 1);
    active.successful_attempts = Set(profile.successful_attempts + 1);
    active.update(db).await.map_err(Into::into)
}

/// Counts an attempt that ended in arrest.
pub async fn record_arrest<C>(db: &C, user_id: &str) -> Result<crime_profile::Model>
where
    C: ConnectionTrait,
{
    let profile = ensure_profile(db, user_id).await?;
    let mut active: crime_profile::ActiveModel = profile.clone().into();
    active.total_attempts = Set(profile.total_attempts + 1);
    active.times_arrested = Set(profile.times_arrested + 1);
    active.update(db).await.map_err(Into::into)
}

/// Counts an attempt that a defender blocked.
pub async fn record_blocked<C>(db: &C, user_id: &str) -> Result<crime_profile::Model>
where
    C: ConnectionTrait,
{
    let profile = ensure_profile(db, user_id).await?;
    let mut active: crime_profile::ActiveModel = profile.clone().into();
    active.total_attempts = Set(profile.total_attempts + 1);
    active.update(db).await.map_err(Into::into)
}

/// Friendship row between a user and an NPC, if any.
pub async fn get_friendship<C>(
    db: &C,
    user_id: &str,
    friend_id: &str,
) -> Result<Option<npc_friendship::Model>>
where
    C: ConnectionTrait,
{
    NpcFriendship::find()
        .filter(npc_friendship::Column::UserId.eq(user_id))
        .filter(npc_friendship::Column::FriendId.eq(friend_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All of a user's NPC friendships, strongest first.
pub async fn friendships<C>(db: &C, user_id: &str) -> Result<Vec<npc_friendship::Model>>
where
    C: ConnectionTrait,
{
    NpcFriendship::find()
        .filter(npc_friendship::Column::UserId.eq(user_id))
        .order_by_desc(npc_friendship::Column::Level)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Raises friendship with a catalog NPC. Unknown NPCs are `NotFound`.
pub async fn increase_friendship<C>(
    db: &C,
    user_id: &str,
    friend_id: &str,
    amount: i32,
) -> Result<npc_friendship::Model>
where
    C: ConnectionTrait,
{
    if catalog::npc_friend(friend_id).is_none() {
        return Err(Error::not_found("npc friend", friend_id));
    }
    ensure_profile(db, user_id).await?;

    match get_friendship(db, user_id, friend_id).await? {
        Some(existing) => {
            let level = existing.level.saturating_add(amount);
            let interactions = existing.interactions + 1;
            let mut active: npc_friendship::ActiveModel = existing.into();
            active.level = Set(level);
            active.interactions = Set(interactions);
            active.update(db).await.map_err(Into::into)
        }
        None => npc_friendship::ActiveModel {
            user_id: Set(user_id.to_string()),
            friend_id: Set(friend_id.to_string()),
            level: Set(amount),
            interactions: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(Into::into),
    }
}

/// Hires one bodyguard, paying the tier's cost up front.
#[instrument(skip(db))]
pub async fn hire_bodyguard(
    db: &DatabaseConnection,
    user_id: &str,
    tier: BodyguardTier,
) -> Result<crime_profile::Model> {
    let txn = db.begin().await?;
    let balance = ledger::get_balance(&txn, user_id).await?;
    if balance < tier.hire_cost() {
        return Err(Precondition::InsufficientFunds {
            current: balance,
            required: tier.hire_cost(),
        }
        .into());
    }
    ledger::subtract_balance(&txn, user_id, tier.hire_cost()).await?;

    let profile = ensure_profile(&txn, user_id).await?;
    let mut active: crime_profile::ActiveModel = profile.clone().into();
    match tier {
        BodyguardTier::Basic => active.basic_bodyguards = Set(profile.basic_bodyguards + 1),
        BodyguardTier::Professional => {
            active.professional_bodyguards = Set(profile.professional_bodyguards + 1);
        }
        BodyguardTier::Elite => active.elite_bodyguards = Set(profile.elite_bodyguards + 1),
    }
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("{user_id} hired a {} bodyguard", tier.id());
    Ok(updated)
}

/// The user's pet as of `now`, if they have one.
pub async fn get_pet<C>(db: &C, user_id: &str, now: DateTime<Utc>) -> Result<Option<pet::Model>>
where
    C: ConnectionTrait,
{
    Ok(Pet::find_by_id(user_id)
        .one(db)
        .await?
        .map(|pet| pet_at(pet, now)))
}

/// Buys a pet of the given species. A user keeps one pet; adopting replaces the old one.
#[instrument(skip(db))]
pub async fn adopt_pet(
    db: &DatabaseConnection,
    user_id: &str,
    species_id: &str,
    name: &str,
    now: DateTime<Utc>,
) -> Result<pet::Model> {
    let species =
        catalog::pet_species(species_id).ok_or_else(|| Error::not_found("pet", species_id))?;

    let txn = db.begin().await?;
    let balance = ledger::get_balance(&txn, user_id).await?;
    if balance < species.price {
        return Err(Precondition::InsufficientFunds {
            current: balance,
            required: species.price,
        }
        .into());
    }
    ledger::subtract_balance(&txn, user_id, species.price).await?;
    Pet::delete_by_id(user_id).exec(&txn).await?;

    let adopted = pet::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        species: Set(species.id.to_string()),
        level: Set(1),
        defense: Set(species.defense),
        speed: Set(species.speed),
        hunger: Set(100),
        happiness: Set(100),
        last_fed: Set(now),
        last_played: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!("{user_id} adopted {name} the {species_id}");
    Ok(adopted)
}

/// Price of one serving of pet food.
pub const PET_FOOD_PRICE: i64 = 50;

/// Feeds the user's pet, restoring hunger and some happiness.
///
/// Both stats are stored at their decayed values plus the meal, so decay restarts from `now`.
pub async fn feed_pet(
    db: &DatabaseConnection,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<pet::Model> {
    let txn = db.begin().await?;
    let existing = get_pet(&txn, user_id, now)
        .await?
        .ok_or_else(|| Error::not_found("pet", user_id))?;
    let balance = ledger::get_balance(&txn, user_id).await?;
    if balance < PET_FOOD_PRICE {
        return Err(Precondition::InsufficientFunds {
            current: balance,
            required: PET_FOOD_PRICE,
        }
        .into());
    }
    ledger::subtract_balance(&txn, user_id, PET_FOOD_PRICE).await?;

    let hunger = (existing.hunger + 30).min(100);
    let happiness = (existing.happiness + 10).min(100);
    let mut active: pet::ActiveModel = existing.into();
    active.hunger = Set(hunger);
    active.happiness = Set(happiness);
    active.last_fed = Set(now);
    active.last_played = Set(now);
    let fed = active.update(&txn).await?;
    txn.commit().await?;
    Ok(fed)
}

/// Summary of a user's criminal record.
#[derive(Debug, Clone, PartialEq)]
pub struct CrimeStats {
    /// Current level
    pub level: i32,
    /// Accumulated XP
    pub xp: i64,
    /// Every resolved attempt
    pub total_attempts: i32,
    /// Successful attempts
    pub successful_attempts: i32,
    /// Attempts that ended in arrest
    pub times_arrested: i32,
    /// Successful share of all attempts, 0 when there are none
    pub success_rate: f64,
    /// Current combined bodyguard protection
    pub bodyguard_protection: f64,
    /// `(friend_id, level)` for each NPC friend
    pub friendships: Vec<(String, i32)>,
}

/// Builds the display summary for a user's profile.
pub async fn stats<C>(db: &C, user_id: &str) -> Result<CrimeStats>
where
    C: ConnectionTrait,
{
    let profile = ensure_profile(db, user_id).await?;
    let friends = friendships(db, user_id).await?;
    let success_rate = if profile.total_attempts == 0 {
        0.0
    } else {
        f64::from(profile.successful_attempts) / f64::from(profile.total_attempts)
    };

    Ok(CrimeStats {
        level: profile.crime_level,
        xp: profile.crime_xp,
        total_attempts: profile.total_attempts,
        successful_attempts: profile.successful_attempts,
        times_arrested: profile.times_arrested,
        success_rate,
        bodyguard_protection: bodyguard_protection(&profile),
        friendships: friends.into_iter().map(|f| (f.friend_id, f.level)).collect(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[test]
    fn test_level_and_skill_bonus() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(skill_bonus(1), 0.0);
        assert!((skill_bonus(6) - 0.05).abs() < 1e-9);
        assert_eq!(skill_bonus(40), 0.15);
    }

    #[test]
    fn test_pet_defense_chance_bounds() {
        let mut pet = test_pet("x");
        pet.defense = 15;
        pet.speed = 15;
        pet.level = 5;
        // (15 + 15 + 10 - 25 * 0.5) / 100 = 0.275
        assert!((pet_defense_chance(&pet, 25) - 0.275).abs() < 1e-9);
        assert_eq!(pet_defense_chance(&pet, 200), 0.1);

        pet.defense = 200;
        assert_eq!(pet_defense_chance(&pet, 0), 0.7);

        pet.hunger = 29;
        assert_eq!(pet_defense_chance(&pet, 0), 0.0);
    }

    #[tokio::test]
    async fn test_level_never_decreases() -> Result<()> {
        let db = setup_test_db().await?;
        let profile = record_success(&db, "u1", 250).await?;
        assert_eq!(profile.crime_level, 3);
        assert_eq!(profile.successful_attempts, 1);

        let profile = record_arrest(&db, "u1").await?;
        assert_eq!(profile.crime_level, 3);
        assert_eq!(profile.total_attempts, 2);
        assert_eq!(profile.times_arrested, 1);

        let profile = record_blocked(&db, "u1").await?;
        assert_eq!(profile.total_attempts, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_increase_friendship() -> Result<()> {
        let db = setup_test_db().await?;
        increase_friendship(&db, "u1", "loyal_larry", 30).await?;
        let friendship = increase_friendship(&db, "u1", "loyal_larry", 25).await?;
        assert_eq!(friendship.level, 55);
        assert_eq!(friendship.interactions, 2);

        let result = increase_friendship(&db, "u1", "imaginary_ian", 5).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_hire_bodyguards_caps_protection() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 200_000).await?;

        hire_bodyguard(&db, "u1", BodyguardTier::Elite).await?;
        let profile = hire_bodyguard(&db, "u1", BodyguardTier::Professional).await?;
        assert_eq!(bodyguard_protection(&profile), MAX_BODYGUARD_PROTECTION);
        assert_eq!(ledger::get_balance(&db, "u1").await?, 135_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_hire_bodyguard_insufficient_funds() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 100).await?;

        let result = hire_bodyguard(&db, "u1", BodyguardTier::Basic).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Precondition(Precondition::InsufficientFunds { .. })
        ));
        assert_eq!(ledger::get_balance(&db, "u1").await?, 100);
        assert!(get_profile(&db, "u1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_adopt_and_feed_pet() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 10_000).await?;

        let pet = adopt_pet(&db, "u1", "dog", "Rex", test_now()).await?;
        assert_eq!(pet.defense, 15);
        assert_eq!(ledger::get_balance(&db, "u1").await?, 5_500);

        // Ten hours on: hunger 80 + 30 caps at 100, happiness 85 + 10
        let later = test_now() + Duration::hours(10);
        let fed = feed_pet(&db, "u1", later).await?;
        assert_eq!(fed.hunger, 100);
        assert_eq!(fed.happiness, 95);
        assert_eq!(fed.last_fed, later);
        assert_eq!(ledger::get_balance(&db, "u1").await?, 5_450);

        let read_back = get_pet(&db, "u1", later).await?.unwrap();
        assert_eq!((read_back.hunger, read_back.happiness), (100, 95));
        Ok(())
    }

    #[tokio::test]
    async fn test_pet_mood_decays_while_stored() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 10_000).await?;
        adopt_pet(&db, "u1", "dog", "Rex", test_now()).await?;

        let pet = get_pet(&db, "u1", test_now() + Duration::hours(20)).await?.unwrap();
        assert_eq!(pet.hunger, 60);
        assert_eq!(pet.happiness, 70);
        assert!(pet_defense_chance(&pet, 0) > 0.0);

        let neglected = get_pet(&db, "u1", test_now() + Duration::hours(48)).await?.unwrap();
        assert_eq!(neglected.hunger, 4);
        assert_eq!(neglected.happiness, 28);
        assert_eq!(pet_defense_chance(&neglected, 0), 0.0);

        let starved = get_pet(&db, "u1", test_now() + Duration::days(30)).await?.unwrap();
        assert_eq!((starved.hunger, starved.happiness), (0, 0));
        Ok(())
    }

    #[test]
    fn test_pet_at_ignores_clock_skew() {
        let pet = pet_at(test_pet("x"), test_now() - Duration::hours(3));
        assert_eq!((pet.hunger, pet.happiness), (100, 100));
    }

    #[tokio::test]
    async fn test_stats_success_rate() -> Result<()> {
        let db = setup_test_db().await?;
        record_success(&db, "u1", 10).await?;
        record_arrest(&db, "u1").await?;
        increase_friendship(&db, "u1", "rich_rachel", 80).await?;

        let stats = stats(&db, "u1").await?;
        assert_eq!(stats.success_rate, 0.5);
        assert_eq!(stats.friendships, vec![("rich_rachel".to_string(), 80)]);
        Ok(())
    }
}
