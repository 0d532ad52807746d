//! Crime resolver - turns an action attempt into a committed outcome.
//!
//! Every risk action (attack, beatup, robberies, heists, smuggling, dealer buys) is
//! described by an [`ActionProfile`] and resolved the same way:
//!
//! 1. Preconditions, in order: actor free, cooldown elapsed, actor awake, target valid
//!    (not self, not arrested, awake, opted in), weapon and items held, investment
//!    affordable. A failure here changes nothing.
//! 2. Items, ammo and investment are consumed.
//! 3. Defenders get a chance to intervene: bodyguards may intercept, an AFK owner's pet
//!    may drive the attacker off. Either ends the action as *blocked*.
//! 4. One risk roll decides success or arrest.
//!
//! Steps 2 to 4 are one database transaction. The cooldown is recorded once it commits.

use crate::{
    config::economy::EconomyConfig,
    core::{
        arrest,
        catalog::{self, Weapon},
        cooldown::CooldownTracker,
        dice::Dice,
        effects::{self, ActiveModifiers},
        inventory, ledger,
        preferences::{self, PreferenceKey},
        profile,
    },
    errors::{Error, Precondition, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::fmt;
use tracing::{debug, info, instrument};

/// Minutes without a command before a user counts as AFK for pet defense.
pub const AFK_MINUTES: i64 = 30;

/// Steal reduction after a pet tried and failed to defend.
pub const FAILED_PET_DEFENSE_PENALTY: f64 = 0.3;

/// Share of bodyguard protection that reduces steals that get through.
pub const BODYGUARD_STEAL_REDUCTION: f64 = 0.3;

/// Share of bodyguard protection added to the attacker's risk.
pub const BODYGUARD_RISK_FACTOR: f64 = 0.1;

/// Share of luck that comes off the risk.
pub const LUCK_RISK_FACTOR: f64 = 0.5;

/// Health fraction a knocked-out target wakes up with.
pub const KNOCKOUT_RECOVERY: f64 = 0.5;

/// Risk cap specific to smuggling runs.
pub const SMUGGLE_RISK_CAP: f64 = 0.8;

/// Friendship every NPC friend gains after a successful dealer buy.
pub const DEALER_FRIENDSHIP_GAIN: i32 = 1;

/// The kind of risk action, which selects its cooldown namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Armed attack on another user
    Attack,
    /// Unarmed mugging of another user
    Beatup,
    /// Bank robbery
    RobBank,
    /// Business robbery
    RobBusiness,
    /// Planned heist
    Heist,
    /// Smuggling run
    Smuggle,
    /// Purchase from a street dealer
    DealerBuy,
}

impl ActionKind {
    /// Cooldown namespace. Both robbery kinds share one.
    #[must_use]
    pub const fn cooldown_key(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Beatup => "beatup",
            Self::RobBank | Self::RobBusiness => "rob",
            Self::Heist => "heist",
            Self::Smuggle => "smuggle",
            Self::DealerBuy => "dealer",
        }
    }

    /// Stable name used in narrative tags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Beatup => "beatup",
            Self::RobBank => "rob_bank",
            Self::RobBusiness => "rob_business",
            Self::Heist => "heist",
            Self::Smuggle => "smuggle",
            Self::DealerBuy => "dealer_buy",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a user asked to do, by catalog id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Attack another user with the equipped weapon
    Attack {
        /// Target user id
        target: String,
    },
    /// Mug another user
    Beatup {
        /// Target user id
        target: String,
    },
    /// Rob a bank
    RobBank {
        /// Bank id
        bank: String,
    },
    /// Rob a business
    RobBusiness {
        /// Business id
        business: String,
    },
    /// Pull a heist
    Heist {
        /// Heist target id
        target: String,
    },
    /// Run a smuggling route
    Smuggle {
        /// Route id
        route: String,
        /// Optional contraband id
        contraband: Option<String>,
    },
    /// Buy drugs from a dealer
    DealerBuy {
        /// Dealer id
        dealer: String,
        /// Consumable id
        item: String,
        /// Units to buy
        quantity: i32,
    },
}

/// How a successful attempt pays out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payout {
    /// Uniform draw paid by the environment
    Range {
        /// Smallest take
        min: i64,
        /// Largest take
        max: i64,
    },
    /// Coins proportional to combat damage, taken from the target
    Combat {
        /// The attacker's weapon, if any
        weapon: Option<Weapon>,
    },
    /// A share of the target's balance
    Steal {
        /// Share of the target's balance
        fraction: f64,
        /// Floor on the take before clamping to the target's balance
        minimum: i64,
    },
    /// Nothing but the reward items
    Goods,
}

/// How bail is set after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BailFormula {
    /// `minutes × 100 × rate`
    PerMinute {
        /// Multiplier on 100 coins per minute
        rate: f64,
    },
    /// A share of the payout range's maximum
    MaxPayoutShare {
        /// Share of the maximum
        share: f64,
    },
    /// A share of a payout rolled at arrest time
    RolledPayoutShare {
        /// Share of the rolled payout
        share: f64,
    },
}

/// Static description of one risk action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionProfile {
    /// Which action this is
    pub kind: ActionKind,
    /// Arrest reason
    pub reason: String,
    /// Targeted user, for attacks and beatups
    pub target_id: Option<String>,
    /// Preference the target must have enabled
    pub target_preference: Option<PreferenceKey>,
    /// Chance of failure before modifiers
    pub base_risk: f64,
    /// Upper bound on effective risk (never above the configured maximum)
    pub risk_cap: f64,
    /// Payout on success
    pub payout: Payout,
    /// Multiplier on the base payout (contraband)
    pub payout_multiplier: f64,
    /// Arrest duration range in minutes, inclusive
    pub arrest_minutes: (i64, i64),
    /// Bail on arrest
    pub bail: BailFormula,
    /// `(item_id, quantity)` consumed on every attempt
    pub required_items: Vec<(String, i32)>,
    /// Coins paid up front, lost on failure
    pub investment: i64,
    /// XP on success, before multipliers
    pub xp_reward: i64,
    /// `(item_id, quantity)` granted on success
    pub reward_items: Vec<(String, i32)>,
}

fn owned_items(items: &[&str]) -> Vec<(String, i32)> {
    items.iter().map(|item| ((*item).to_string(), 1)).collect()
}

impl ActionProfile {
    /// Resolves an [`Action`] against the catalog. Unknown ids are `NotFound`.
    pub async fn for_action<C>(db: &C, actor_id: &str, action: &Action) -> Result<Self>
    where
        C: sea_orm::ConnectionTrait,
    {
        let profile = match action {
            Action::Attack { target } => {
                let weapon = inventory::equipped_weapon(db, actor_id).await?;
                Self {
                    kind: ActionKind::Attack,
                    reason: "Assault with a deadly weapon".to_string(),
                    target_id: Some(target.clone()),
                    target_preference: Some(PreferenceKey::AllowAttacks),
                    base_risk: 0.0,
                    risk_cap: 1.0,
                    payout: Payout::Combat { weapon },
                    payout_multiplier: 1.0,
                    arrest_minutes: (10, 20),
                    bail: BailFormula::PerMinute { rate: 1.0 },
                    required_items: weapon
                        .map(|w| vec![(w.ammo.to_string(), 1)])
                        .unwrap_or_default(),
                    investment: 0,
                    xp_reward: 15,
                    reward_items: Vec::new(),
                }
            }
            Action::Beatup { target } => Self {
                kind: ActionKind::Beatup,
                reason: "Assault and robbery".to_string(),
                target_id: Some(target.clone()),
                target_preference: Some(PreferenceKey::AllowAttacks),
                base_risk: 0.2,
                risk_cap: 1.0,
                payout: Payout::Steal {
                    fraction: 0.3,
                    minimum: 50,
                },
                payout_multiplier: 1.0,
                arrest_minutes: (10, 20),
                bail: BailFormula::PerMinute { rate: 1.0 },
                required_items: Vec::new(),
                investment: 0,
                xp_reward: 10,
                reward_items: Vec::new(),
            },
            Action::RobBank { bank } => {
                let bank = catalog::bank(bank).ok_or_else(|| Error::not_found("bank", bank))?;
                Self::robbery(ActionKind::RobBank, bank, 2.0, 50)
            }
            Action::RobBusiness { business } => {
                let business = catalog::business(business)
                    .ok_or_else(|| Error::not_found("business", business))?;
                Self::robbery(ActionKind::RobBusiness, business, 1.0, 25)
            }
            Action::Heist { target } => {
                let heist =
                    catalog::heist(target).ok_or_else(|| Error::not_found("heist", target))?;
                Self {
                    kind: ActionKind::Heist,
                    reason: format!("Heist at {}", heist.name),
                    target_id: None,
                    target_preference: None,
                    base_risk: heist.risk,
                    risk_cap: 1.0,
                    payout: Payout::Range {
                        min: heist.min_payout,
                        max: heist.max_payout,
                    },
                    payout_multiplier: 1.0,
                    arrest_minutes: (45, 120),
                    bail: BailFormula::MaxPayoutShare { share: 0.5 },
                    required_items: owned_items(heist.required_items),
                    investment: 0,
                    xp_reward: 75,
                    reward_items: Vec::new(),
                }
            }
            Action::Smuggle { route, contraband } => {
                let route = catalog::smuggle_route(route)
                    .ok_or_else(|| Error::not_found("smuggling route", route))?;
                let cargo = contraband
                    .as_deref()
                    .map(|id| catalog::contraband(id).ok_or_else(|| Error::not_found("contraband", id)))
                    .transpose()?;
                Self {
                    kind: ActionKind::Smuggle,
                    reason: format!("Smuggling on the {} route", route.name),
                    target_id: None,
                    target_preference: None,
                    base_risk: route.risk + cargo.map_or(0.0, |c| c.risk_increase),
                    risk_cap: SMUGGLE_RISK_CAP,
                    payout: Payout::Range {
                        min: route.min_payout,
                        max: route.max_payout,
                    },
                    payout_multiplier: cargo.map_or(1.0, |c| c.value_multiplier),
                    arrest_minutes: (30, 120),
                    bail: BailFormula::RolledPayoutShare { share: 0.8 },
                    required_items: owned_items(route.required_items),
                    investment: route.investment,
                    xp_reward: 40,
                    reward_items: Vec::new(),
                }
            }
            Action::DealerBuy {
                dealer,
                item,
                quantity,
            } => {
                let dealer =
                    catalog::dealer(dealer).ok_or_else(|| Error::not_found("dealer", dealer))?;
                let drug =
                    catalog::consumable(item).ok_or_else(|| Error::not_found("consumable", item))?;
                if *quantity <= 0 {
                    return Err(Error::InvalidAmount {
                        amount: i64::from(*quantity),
                    });
                }
                let discount = dealer.discount_for(item).ok_or_else(|| Precondition::NotInStock {
                    item: item.clone(),
                })?;
                #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                let unit_price = (drug.price as f64 * discount).floor() as i64;
                Self {
                    kind: ActionKind::DealerBuy,
                    reason: format!("Buying {} from {}", drug.name, dealer.name),
                    target_id: None,
                    target_preference: None,
                    base_risk: dealer.risk,
                    risk_cap: 1.0,
                    payout: Payout::Goods,
                    payout_multiplier: 1.0,
                    arrest_minutes: (1, 5),
                    bail: BailFormula::PerMinute { rate: 0.7 },
                    required_items: Vec::new(),
                    investment: unit_price.saturating_mul(i64::from(*quantity)),
                    xp_reward: 10,
                    reward_items: vec![(drug.id.to_string(), *quantity)],
                }
            }
        };
        Ok(profile)
    }

    fn robbery(kind: ActionKind, target: catalog::RobTarget, bail_rate: f64, xp: i64) -> Self {
        Self {
            kind,
            reason: format!("Robbery at {}", target.name),
            target_id: None,
            target_preference: None,
            base_risk: target.risk,
            risk_cap: 1.0,
            payout: Payout::Range {
                min: target.min_payout,
                max: target.max_payout,
            },
            payout_multiplier: 1.0,
            arrest_minutes: (1, 5),
            bail: BailFormula::PerMinute { rate: bail_rate },
            required_items: Vec::new(),
            investment: 0,
            xp_reward: xp,
            reward_items: Vec::new(),
        }
    }
}

/// Who stopped a blocked action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defender {
    /// The target's bodyguards intercepted
    Bodyguards,
    /// The target's pet drove the attacker off
    Pet {
        /// The pet's name
        name: String,
    },
}

/// How the attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The action paid out
    Success,
    /// The actor was caught
    Arrested {
        /// Sentence length
        minutes: i64,
        /// Bail set
        bail_amount: i64,
        /// Release time
        until: DateTime<Utc>,
    },
    /// A defender stopped the action before any risk was taken
    Blocked(Defender),
}

/// Damage report for combat actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatReport {
    /// Damage after all modifiers
    pub damage: i64,
    /// Damage actually taken off the target's health
    pub damage_dealt: i64,
    /// Target health after the hit (after recovery if knocked out)
    pub target_health: i32,
    /// Target was brought to 0 health
    pub knocked_out: bool,
}

/// Structured result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Which action resolved
    pub kind: ActionKind,
    /// How it ended
    pub resolution: Resolution,
    /// Coins credited to the actor
    pub payout: i64,
    /// Coins paid up front
    pub investment: i64,
    /// Risk used for the roll (0 when blocked before the roll)
    pub effective_risk: f64,
    /// XP gained
    pub xp_gained: i64,
    /// Combat details for attacks
    pub combat: Option<CombatReport>,
    /// Items granted
    pub items_gained: Vec<(String, i32)>,
    /// A pet tried to defend and failed
    pub pet_defense_failed: bool,
}

impl Outcome {
    /// Tag the presentation layer uses to pick flavor text, e.g. `heist:arrested`.
    #[must_use]
    pub fn narrative_tag(&self) -> String {
        let result = match &self.resolution {
            Resolution::Success => "success",
            Resolution::Arrested { .. } => "arrested",
            Resolution::Blocked(Defender::Bodyguards) => "blocked_by_bodyguards",
            Resolution::Blocked(Defender::Pet { .. }) => "blocked_by_pet",
        };
        format!("{}:{result}", self.kind)
    }

    fn new(kind: ActionKind, investment: i64, resolution: Resolution) -> Self {
        Self {
            kind,
            resolution,
            payout: 0,
            investment,
            effective_risk: 0.0,
            xp_gained: 0,
            combat: None,
            items_gained: Vec::new(),
            pet_defense_failed: false,
        }
    }
}

/// Final damage of one hit.
///
/// Weapon damage is boosted by the attacker's attack bonus, reduced by armor unless the
/// attacker feels no pain, then reduced by the target's immunity and defense. Never
/// below 1.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn combat_damage(
    weapon_damage: i64,
    attacker: &ActiveModifiers,
    target_armor: i64,
    target: &ActiveModifiers,
) -> i64 {
    let mut damage = (weapon_damage as f64 * (1.0 + attacker.attack_bonus())).floor() as i64;
    if !attacker.pain_immunity {
        damage = (damage - target_armor).max(1);
    }
    let reduced = (damage as f64 * (1.0 - target.damage_reduction())).floor() as i64;
    reduced.max(1)
}

/// `clamp(base - skill + situational, 0, cap)`.
#[must_use]
pub fn effective_risk(base: f64, skill_bonus: f64, situational: f64, cap: f64) -> f64 {
    (base - skill_bonus + situational).clamp(0.0, cap.max(0.0))
}

/// Bail for a sentence of `minutes`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn bail_amount(formula: BailFormula, minutes: i64, max_payout: i64, rolled_payout: i64) -> i64 {
    let amount = match formula {
        BailFormula::PerMinute { rate } => minutes as f64 * 100.0 * rate,
        BailFormula::MaxPayoutShare { share } => max_payout as f64 * share,
        BailFormula::RolledPayoutShare { share } => rolled_payout as f64 * share,
    };
    amount.floor().max(0.0) as i64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale(amount: i64, factor: f64) -> i64 {
    (amount as f64 * factor).floor().max(0.0) as i64
}

/// What the defenders did before the roll.
struct Defense {
    protection: f64,
    pet_penalty: f64,
}

/// One resolver run over shared state.
pub struct Resolver<'a> {
    db: &'a DatabaseConnection,
    config: &'a EconomyConfig,
    cooldowns: &'a CooldownTracker,
    dice: &'a mut dyn Dice,
}

impl<'a> Resolver<'a> {
    /// Borrows everything a resolution needs.
    pub fn new(
        db: &'a DatabaseConnection,
        config: &'a EconomyConfig,
        cooldowns: &'a CooldownTracker,
        dice: &'a mut dyn Dice,
    ) -> Self {
        Self {
            db,
            config,
            cooldowns,
            dice,
        }
    }

    fn cooldown_for(&self, kind: ActionKind, modifiers: &ActiveModifiers) -> std::time::Duration {
        self.config
            .cooldowns
            .duration_for(kind.cooldown_key())
            .mul_f64(modifiers.cooldown_factor())
    }

    /// Resolves one attempt by `actor_id`.
    ///
    /// Precondition failures return `Err(Error::Precondition(..))` and leave every piece
    /// of state untouched. An arrest is not an error: it is a committed [`Outcome`].
    #[instrument(skip(self, profile), fields(kind = %profile.kind))]
    pub async fn attempt(
        &mut self,
        actor_id: &str,
        profile: &ActionProfile,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let db = self.db;

        // 1. Preconditions. Nothing below this block runs unless all of them pass.
        if let Some(record) = arrest::get_arrest_info(db, actor_id, now).await? {
            return Err(Precondition::Arrested {
                remaining_secs: arrest::remaining_seconds(&record, now),
            }
            .into());
        }
        let actor_mods = effects::get_active_modifiers(db, actor_id, now).await?;
        let cooldown = self.cooldown_for(profile.kind, &actor_mods);
        let check = self
            .cooldowns
            .check(profile.kind.cooldown_key(), actor_id, cooldown, now);
        if !check.allowed {
            return Err(Precondition::OnCooldown {
                command: profile.kind.cooldown_key().to_string(),
                remaining_ms: check.remaining_ms,
            }
            .into());
        }
        if actor_mods.sleep_protection {
            return Err(Precondition::ActorAsleep.into());
        }

        let target_mods = match &profile.target_id {
            Some(target_id) => Some(self.check_target(actor_id, target_id, profile, now).await?),
            None => None,
        };

        if let Payout::Combat { weapon: None } = profile.payout {
            return Err(Precondition::NoWeapon.into());
        }
        for (item, quantity) in &profile.required_items {
            if !inventory::has_item(db, actor_id, item, *quantity).await? {
                return Err(Precondition::MissingItem {
                    item: item.clone(),
                    required: *quantity,
                }
                .into());
            }
        }
        let balance = ledger::get_balance(db, actor_id).await?;
        if balance < profile.investment {
            return Err(Precondition::InsufficientFunds {
                current: balance,
                required: profile.investment,
            }
            .into());
        }

        // 2. Sunk costs.
        let txn = db.begin().await?;
        for (item, quantity) in &profile.required_items {
            inventory::remove_item(&txn, actor_id, item, *quantity).await?;
        }
        if profile.investment > 0 {
            ledger::subtract_balance(&txn, actor_id, profile.investment).await?;
        }
        ledger::touch_activity(&txn, actor_id, now).await?;

        // 3. Defender interventions.
        let mut defense = Defense {
            protection: 0.0,
            pet_penalty: 0.0,
        };
        if let Some(target_id) = &profile.target_id {
            match self.defend(&txn, target_id, profile, now).await? {
                Ok(found) => defense = found,
                Err(defender) => {
                    profile::record_blocked(&txn, actor_id).await?;
                    txn.commit().await?;
                    self.cooldowns
                        .record(profile.kind.cooldown_key(), actor_id, now);
                    info!("{} by {actor_id} blocked by {defender:?}", profile.kind);
                    return Ok(Outcome::new(
                        profile.kind,
                        profile.investment,
                        Resolution::Blocked(defender),
                    ));
                }
            }
        }

        // 4. Risk roll.
        let situational = -actor_mods.luck / 100.0 * LUCK_RISK_FACTOR
            + defense.protection * BODYGUARD_RISK_FACTOR;
        let actor_profile = profile::ensure_profile(&txn, actor_id).await?;
        let risk = effective_risk(
            profile.base_risk,
            profile::skill_bonus(actor_profile.crime_level),
            situational,
            profile.risk_cap.min(self.config.max_risk),
        );
        let roll = self.dice.roll();
        debug!("{} by {actor_id}: risk {risk:.3}, roll {roll:.3}", profile.kind);

        let mut outcome = if roll < risk {
            self.fail(&txn, actor_id, profile, now).await?
        } else {
            self.succeed(&txn, actor_id, profile, &actor_mods, target_mods.as_ref(), &defense)
                .await?
        };
        outcome.effective_risk = risk;
        outcome.pet_defense_failed = defense.pet_penalty > 0.0;

        txn.commit().await?;
        self.cooldowns
            .record(profile.kind.cooldown_key(), actor_id, now);
        info!(
            "{actor_id} resolved {} -> payout {}",
            outcome.narrative_tag(),
            outcome.payout
        );
        Ok(outcome)
    }

    async fn check_target(
        &self,
        actor_id: &str,
        target_id: &str,
        profile: &ActionProfile,
        now: DateTime<Utc>,
    ) -> Result<ActiveModifiers> {
        let db = self.db;
        if target_id == actor_id {
            return Err(Precondition::SelfTarget.into());
        }
        let target = ledger::get_account(db, target_id)
            .await?
            .ok_or_else(|| Error::not_found("user", target_id))?;
        if arrest::is_arrested(db, target_id, now).await? {
            return Err(Precondition::TargetArrested.into());
        }
        let target_mods = effects::get_active_modifiers(db, target_id, now).await?;
        if target_mods.sleep_protection {
            return Err(Precondition::TargetAsleep.into());
        }
        if let Some(key) = profile.target_preference {
            if !preferences::can_target(db, target_id, key).await? {
                return Err(Precondition::TargetOptedOut {
                    preference: key.as_str().to_string(),
                }
                .into());
            }
        }
        if matches!(profile.payout, Payout::Steal { .. }) && target.balance == 0 {
            return Err(Precondition::TargetBroke.into());
        }
        Ok(target_mods)
    }

    /// Bodyguards first, then the pet. `Err(defender)` means the action was blocked.
    async fn defend<C>(
        &mut self,
        db: &C,
        target_id: &str,
        profile: &ActionProfile,
        now: DateTime<Utc>,
    ) -> Result<std::result::Result<Defense, Defender>>
    where
        C: sea_orm::ConnectionTrait,
    {
        let protection = profile::get_profile(db, target_id)
            .await?
            .map_or(0.0, |p| profile::bodyguard_protection(&p));
        if protection > 0.0
            && preferences::get(db, target_id, PreferenceKey::BodyguardProtection).await?
            && self.dice.chance(protection)
        {
            return Ok(Err(Defender::Bodyguards));
        }

        let mut pet_penalty = 0.0;
        if let Some(pet) = profile::get_pet(db, target_id, now).await? {
            let afk = ledger::get_account(db, target_id)
                .await?
                .and_then(|account| account.last_active_at)
                .is_none_or(|last| now - last >= Duration::minutes(AFK_MINUTES));
            let weapon_damage = match profile.payout {
                Payout::Combat { weapon: Some(w) } => w.damage,
                _ => 0,
            };
            let chance = profile::pet_defense_chance(&pet, weapon_damage);
            if afk
                && chance > 0.0
                && preferences::get(db, target_id, PreferenceKey::PetDefense).await?
            {
                if self.dice.chance(chance) {
                    return Ok(Err(Defender::Pet { name: pet.name }));
                }
                pet_penalty = FAILED_PET_DEFENSE_PENALTY;
            }
        }

        Ok(Ok(Defense {
            protection,
            pet_penalty,
        }))
    }

    async fn fail<C>(
        &mut self,
        db: &C,
        actor_id: &str,
        profile: &ActionProfile,
        now: DateTime<Utc>,
    ) -> Result<Outcome>
    where
        C: sea_orm::ConnectionTrait,
    {
        let (min_minutes, max_minutes) = profile.arrest_minutes;
        let minutes = self.dice.between(min_minutes, max_minutes);
        let (max_payout, rolled) = match (profile.payout, profile.bail) {
            (Payout::Range { min, max }, BailFormula::RolledPayoutShare { .. }) => {
                let rolled = scale(self.dice.between(min, max), profile.payout_multiplier);
                (max, rolled)
            }
            (Payout::Range { max, .. }, _) => (max, 0),
            _ => (0, 0),
        };
        let bail = bail_amount(profile.bail, minutes, max_payout, rolled);

        let record = arrest::arrest(
            db,
            actor_id,
            Duration::minutes(minutes),
            &profile.reason,
            bail,
            now,
        )
        .await?;
        profile::record_arrest(db, actor_id).await?;

        Ok(Outcome::new(
            profile.kind,
            profile.investment,
            Resolution::Arrested {
                minutes,
                bail_amount: record.bail_amount,
                until: record.arrested_until,
            },
        ))
    }

    async fn succeed<C>(
        &mut self,
        db: &C,
        actor_id: &str,
        profile: &ActionProfile,
        actor_mods: &ActiveModifiers,
        target_mods: Option<&ActiveModifiers>,
        defense: &Defense,
    ) -> Result<Outcome>
    where
        C: sea_orm::ConnectionTrait,
    {
        let mut outcome = Outcome::new(profile.kind, profile.investment, Resolution::Success);
        let target_id = profile.target_id.as_deref();

        // base amount
        let base = match (profile.payout, target_id) {
            (Payout::Range { min, max }, _) => {
                scale(self.dice.between(min, max), profile.payout_multiplier)
            }
            (Payout::Combat { weapon: Some(weapon) }, Some(target_id)) => {
                let none = ActiveModifiers::default();
                let armor = inventory::armor_total(db, target_id).await?;
                let damage =
                    combat_damage(weapon.damage, actor_mods, armor, target_mods.unwrap_or(&none));
                let report = self.hit(db, target_id, damage).await?;
                outcome.combat = Some(report);
                scale(report.damage_dealt, self.config.coins_per_damage)
            }
            (Payout::Steal { fraction, minimum }, Some(target_id)) => {
                let balance = ledger::get_balance(db, target_id).await?;
                scale(balance, fraction).max(minimum)
            }
            _ => 0,
        };

        // drug multiplier, then bodyguard reduction, then failed pet defense
        let mut amount = scale(base, 1.0 + actor_mods.luck / 100.0);
        if defense.protection > 0.0 {
            amount = scale(amount, 1.0 - defense.protection * BODYGUARD_STEAL_REDUCTION);
        }
        if defense.pet_penalty > 0.0 {
            amount = scale(amount, 1.0 - defense.pet_penalty);
        }

        outcome.payout = match target_id {
            Some(target_id) => ledger::transfer(db, target_id, actor_id, amount).await?,
            None if amount > 0 => {
                ledger::add_balance(db, actor_id, amount).await?;
                amount
            }
            None => 0,
        };

        for (item, quantity) in &profile.reward_items {
            inventory::add_item(db, actor_id, item, *quantity).await?;
            outcome.items_gained.push((item.clone(), *quantity));
        }
        if profile.kind == ActionKind::DealerBuy {
            for friend in catalog::NPC_FRIENDS {
                profile::increase_friendship(db, actor_id, friend.id, DEALER_FRIENDSHIP_GAIN)
                    .await?;
            }
        }

        let xp = scale(profile.xp_reward, actor_mods.xp_multiplier);
        profile::record_success(db, actor_id, xp).await?;
        outcome.xp_gained = xp;
        Ok(outcome)
    }

    async fn hit<C>(&self, db: &C, target_id: &str, damage: i64) -> Result<CombatReport>
    where
        C: sea_orm::ConnectionTrait,
    {
        let before = ledger::get_account(db, target_id)
            .await?
            .map_or(0, |account| account.health);
        let after = ledger::apply_damage(db, target_id, damage).await?;
        let knocked_out = after == 0;
        let target_health = if knocked_out {
            ledger::restore_health(db, target_id, KNOCKOUT_RECOVERY).await?
        } else {
            after
        };
        Ok(CombatReport {
            damage,
            damage_dealt: i64::from(before - after),
            target_health,
            knocked_out,
        })
    }
}
