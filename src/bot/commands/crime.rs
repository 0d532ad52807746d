//! Crime Discord commands - the risk actions and the gear that feeds them.
//!
//! Every risk action goes through [`crate::core::economy::Economy::attempt`]; the
//! commands here only build the [`Action`] and turn the [`Outcome`] into text.

use crate::core::resolver::{Action, ActionKind, Defender, Outcome, Resolution};
use crate::bot::commands::utils::coins;

fn success_line(kind: ActionKind, target: Option<&str>) -> String {
    let target = target.unwrap_or("them");
    match kind {
        ActionKind::Attack => format!("⚔️ You attacked **{target}**"),
        ActionKind::Beatup => format!("👊 You beat up **{target}**"),
        ActionKind::RobBank => "🏦 The vault door swung open".to_string(),
        ActionKind::RobBusiness => "🏪 You emptied the register".to_string(),
        ActionKind::Heist => "💎 The heist went off without a hitch".to_string(),
        ActionKind::Smuggle => "🚚 The shipment made it through".to_string(),
        ActionKind::DealerBuy => "💊 The deal went smoothly".to_string(),
    }
}

/// Turns a resolved action into the message shown in the channel.
#[must_use]
pub fn describe(outcome: &Outcome, target: Option<&str>) -> String {
    let mut text = match &outcome.resolution {
        Resolution::Success => {
            let mut text = success_line(outcome.kind, target);
            if let Some(combat) = outcome.combat {
                text.push_str(&format!(" for **{}** damage", combat.damage));
                if combat.knocked_out {
                    text.push_str(" and knocked them out cold");
                }
            }
            if outcome.payout > 0 {
                text.push_str(&format!(". You got away with **{}**", coins(outcome.payout)));
            }
            for (item, quantity) in &outcome.items_gained {
                text.push_str(&format!(". You picked up `{item}` × {quantity}"));
            }
            text.push_str(&format!(". (+{} XP)", outcome.xp_gained));
            if outcome.pet_defense_failed {
                text.push_str("\n🐾 Their pet tried to stop you and lost some of the loot.");
            }
            text
        }
        Resolution::Arrested {
            minutes,
            bail_amount,
            ..
        } => format!(
            "🚔 Busted! You're locked up for **{minutes} minutes**. Bail is set at **{}**. Use `/bail`.",
            coins(*bail_amount)
        ),
        Resolution::Blocked(Defender::Bodyguards) => format!(
            "🛡️ **{}**'s bodyguards stepped in and threw you out.",
            target.unwrap_or("Their")
        ),
        Resolution::Blocked(Defender::Pet { name }) => {
            format!("🐾 **{name}** chased you off!")
        }
    };
    if outcome.investment > 0 && !matches!(outcome.resolution, Resolution::Success) {
        text.push_str(&format!("\nYou lost your {} investment.", coins(outcome.investment)));
    }
    text
}

/// Builds the `Action` for a smuggling command argument pair.
#[must_use]
pub fn smuggle_action(route: String, contraband: Option<String>) -> Action {
    Action::Smuggle {
        route,
        contraband: contraband.filter(|c| !c.trim().is_empty() && c != "none"),
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{describe, smuggle_action};
    use crate::{
        bot::{
            BotData,
            commands::utils::{coins, open_author, open_target},
            handlers::autocomplete,
        },
        core::{
            catalog::{self, BodyguardTier},
            effects::ItemUse,
            inventory, profile,
            resolver::Action,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    async fn run_action(
        ctx: poise::Context<'_, BotData, Error>,
        action: Action,
        target: Option<&serenity::User>,
    ) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        if let Some(target) = target {
            open_target(ctx, target).await?;
        }
        let outcome = ctx.data().economy.attempt(&user_id, &action, now).await?;
        ctx.say(describe(&outcome, target.map(|t| t.name.as_str())))
            .await?;
        Ok(())
    }

    /// Attacks a user with your equipped weapon and takes coins per point of damage.
    #[poise::command(slash_command, prefix_command)]
    pub async fn attack(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who to attack"] target: serenity::User,
    ) -> Result<()> {
        let action = Action::Attack {
            target: target.id.to_string(),
        };
        run_action(ctx, action, Some(&target)).await
    }

    /// Mugs a user for a share of their coins.
    #[poise::command(slash_command, prefix_command)]
    pub async fn beatup(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who to mug"] target: serenity::User,
    ) -> Result<()> {
        let action = Action::Beatup {
            target: target.id.to_string(),
        };
        run_action(ctx, action, Some(&target)).await
    }

    /// Robs a bank.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rob_bank(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Bank to rob"]
        #[autocomplete = "autocomplete::autocomplete_bank"]
        bank: String,
    ) -> Result<()> {
        run_action(ctx, Action::RobBank { bank }, None).await
    }

    /// Robs a business.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rob_business(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Business to rob"]
        #[autocomplete = "autocomplete::autocomplete_business"]
        business: String,
    ) -> Result<()> {
        run_action(ctx, Action::RobBusiness { business }, None).await
    }

    /// Pulls a heist. Required tools are used up whatever happens.
    #[poise::command(slash_command, prefix_command)]
    pub async fn heist(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Heist target"]
        #[autocomplete = "autocomplete::autocomplete_heist"]
        target: String,
    ) -> Result<()> {
        run_action(ctx, Action::Heist { target }, None).await
    }

    /// Runs a smuggling route. The investment is lost if you're caught.
    #[poise::command(slash_command, prefix_command)]
    pub async fn smuggle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Route to run"]
        #[autocomplete = "autocomplete::autocomplete_route"]
        route: String,
        #[description = "Extra cargo: more money, more risk"]
        #[autocomplete = "autocomplete::autocomplete_contraband"]
        contraband: Option<String>,
    ) -> Result<()> {
        run_action(ctx, smuggle_action(route, contraband), None).await
    }

    /// Buys drugs from a street dealer.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dealer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Dealer to visit"]
        #[autocomplete = "autocomplete::autocomplete_dealer"]
        dealer: String,
        #[description = "What to buy"]
        #[autocomplete = "autocomplete::autocomplete_drug"]
        item: String,
        #[description = "How many (default 1)"]
        #[min = 1]
        #[max = 10]
        quantity: Option<i32>,
    ) -> Result<()> {
        let action = Action::DealerBuy {
            dealer,
            item,
            quantity: quantity.unwrap_or(1),
        };
        run_action(ctx, action, None).await
    }

    /// Takes a drug or drink from your inventory.
    #[poise::command(slash_command, prefix_command)]
    pub async fn use_item(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Item to use"]
        #[autocomplete = "autocomplete::autocomplete_owned_consumable"]
        item: String,
    ) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        let used = ctx.data().economy.use_item(&user_id, &item, now).await?;
        let text = match used {
            ItemUse::Applied { expires_at, .. } => format!(
                "💊 You used `{item}`. It wears off <t:{}:R>.",
                expires_at.timestamp()
            ),
            ItemUse::CooldownsReset => {
                format!("🍺 You downed a `{item}`. Every cooldown is reset.")
            }
        };
        ctx.say(text).await?;
        Ok(())
    }

    /// Equips a weapon you own.
    #[poise::command(slash_command, prefix_command)]
    pub async fn equip(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Weapon to equip"]
        #[autocomplete = "autocomplete::autocomplete_weapon"]
        weapon: String,
    ) -> Result<()> {
        let (user_id, _) = open_author(ctx).await?;
        let weapon = inventory::equip_weapon(ctx.data().economy.db(), &user_id, &weapon).await?;
        ctx.say(format!(
            "🔫 Equipped `{}` ({} damage, uses `{}`).",
            weapon.id, weapon.damage, weapon.ammo
        ))
        .await?;
        Ok(())
    }

    /// Hires a bodyguard.
    #[poise::command(slash_command, prefix_command)]
    pub async fn bodyguard(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Bodyguard tier"]
        #[autocomplete = "autocomplete::autocomplete_bodyguard"]
        tier: String,
    ) -> Result<()> {
        let Some(tier) = BodyguardTier::from_id(&tier) else {
            return Err(Error::not_found("bodyguard tier", tier));
        };
        let (user_id, _) = open_author(ctx).await?;
        let updated = ctx.data().economy.hire_bodyguard(&user_id, tier).await?;
        ctx.say(format!(
            "🛡️ Hired a {} bodyguard for {}. Total protection: {:.0}%.",
            tier.id(),
            coins(tier.hire_cost()),
            profile::bodyguard_protection(&updated) * 100.0
        ))
        .await?;
        Ok(())
    }

    /// Pet commands.
    #[poise::command(
        slash_command,
        prefix_command,
        subcommands("pet_adopt", "pet_feed", "pet_status")
    )]
    pub async fn pet(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Adopts a pet. It guards your coins while you're away.
    #[poise::command(slash_command, prefix_command, rename = "adopt")]
    pub async fn pet_adopt(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Species"]
        #[autocomplete = "autocomplete::autocomplete_species"]
        species: String,
        #[description = "Name your pet"] name: String,
    ) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        let pet = ctx
            .data()
            .economy
            .adopt_pet(&user_id, &species, &name, now)
            .await?;
        ctx.say(format!("🐾 Meet **{}** the {}!", pet.name, pet.species))
            .await?;
        Ok(())
    }

    /// Feeds your pet.
    #[poise::command(slash_command, prefix_command, rename = "feed")]
    pub async fn pet_feed(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        let pet = ctx.data().economy.feed_pet(&user_id, now).await?;
        ctx.say(format!(
            "🍖 **{}** munches happily. Hunger {}/100, happiness {}/100.",
            pet.name, pet.hunger, pet.happiness
        ))
        .await?;
        Ok(())
    }

    /// Shows your pet.
    #[poise::command(slash_command, prefix_command, rename = "status")]
    pub async fn pet_status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        let Some(pet) = profile::get_pet(ctx.data().economy.db(), &user_id, now).await? else {
            ctx.say("You don't have a pet. Try `/pet adopt`.").await?;
            return Ok(());
        };
        let mood = if pet.hunger < profile::PET_MOOD_THRESHOLD
            || pet.happiness < profile::PET_MOOD_THRESHOLD
        {
            "too grumpy to fight"
        } else {
            "ready to defend you"
        };
        ctx.say(format!(
            "🐾 **{}** the {} (level {})\nDefense {} · Speed {}\nHunger {}/100 · Happiness {}/100\nCurrently {mood}.",
            pet.name, pet.species, pet.level, pet.defense, pet.speed, pet.hunger, pet.happiness
        ))
        .await?;
        Ok(())
    }

    /// Shows crime level, record and NPC friendships.
    #[poise::command(slash_command, prefix_command)]
    pub async fn crime_stats(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to look up (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let (author_id, _) = open_author(ctx).await?;
        let (name, user_id) = match &user {
            Some(user) => (user.name.clone(), user.id.to_string()),
            None => (ctx.author().name.clone(), author_id),
        };
        let stats = profile::stats(ctx.data().economy.db(), &user_id).await?;

        let mut text = format!("🕵️ **{name}** · level {} ({} XP)\n", stats.level, stats.xp);
        writeln!(
            &mut text,
            "Crimes: {} attempted, {} successful ({:.0}%)",
            stats.total_attempts,
            stats.successful_attempts,
            stats.success_rate * 100.0
        )?;
        writeln!(&mut text, "Arrests: {}", stats.times_arrested)?;
        if stats.bodyguard_protection > 0.0 {
            writeln!(
                &mut text,
                "Bodyguards: {:.0}% protection",
                stats.bodyguard_protection * 100.0
            )?;
        }
        for (friend_id, level) in &stats.friendships {
            let name = catalog::npc_friend(friend_id).map_or(friend_id.as_str(), |f| f.name);
            writeln!(&mut text, "🤝 {name}: {level}")?;
        }
        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::CombatReport;
    use chrono::Utc;

    fn outcome(kind: ActionKind, resolution: Resolution) -> Outcome {
        Outcome {
            kind,
            resolution,
            payout: 0,
            investment: 0,
            effective_risk: 0.1,
            xp_gained: 0,
            combat: None,
            items_gained: Vec::new(),
            pet_defense_failed: false,
        }
    }

    #[test]
    fn test_describe_attack_success() {
        let mut result = outcome(ActionKind::Attack, Resolution::Success);
        result.payout = 150;
        result.xp_gained = 15;
        result.combat = Some(CombatReport {
            damage: 15,
            damage_dealt: 15,
            target_health: 85,
            knocked_out: false,
        });
        let text = describe(&result, Some("bob"));
        assert!(text.contains("**bob**"));
        assert!(text.contains("**15** damage"));
        assert!(text.contains("150 🪙"));
        assert!(text.contains("+15 XP"));
    }

    #[test]
    fn test_describe_arrest_mentions_lost_investment() {
        let mut result = outcome(
            ActionKind::Smuggle,
            Resolution::Arrested {
                minutes: 45,
                bail_amount: 800,
                until: Utc::now(),
            },
        );
        result.investment = 500;
        let text = describe(&result, None);
        assert!(text.contains("45 minutes"));
        assert!(text.contains("800 🪙"));
        assert!(text.contains("lost your 500 🪙"));
    }

    #[test]
    fn test_describe_success_lists_loot_in_order() {
        let mut result = outcome(ActionKind::DealerBuy, Resolution::Success);
        result.items_gained = vec![("weed".to_string(), 2)];
        result.xp_gained = 10;
        result.pet_defense_failed = true;
        assert_eq!(
            describe(&result, None),
            "💊 The deal went smoothly. You picked up `weed` × 2. (+10 XP)\n🐾 Their pet tried to stop you and lost some of the loot."
        );
    }

    #[test]
    fn test_describe_pet_block() {
        let result = outcome(
            ActionKind::Beatup,
            Resolution::Blocked(Defender::Pet {
                name: "Rex".to_string(),
            }),
        );
        assert!(describe(&result, Some("bob")).contains("**Rex**"));
    }

    #[test]
    fn test_smuggle_action_ignores_empty_contraband() {
        assert_eq!(
            smuggle_action("local_delivery".to_string(), Some("none".to_string())),
            Action::Smuggle {
                route: "local_delivery".to_string(),
                contraband: None
            }
        );
    }
}
