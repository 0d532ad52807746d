//! Economy Discord commands - balance, work, donate, leaderboard, inventory and the shop.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{coins, health_bar, open_author, open_target},
            handlers::autocomplete,
        },
        core::{
            catalog::{self, ShopCategory},
            inventory, ledger,
            preferences::{self, PreferenceKey},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    const LEADERBOARD_SIZE: u64 = 10;

    /// Shows a balance and health.
    #[poise::command(slash_command, prefix_command)]
    pub async fn balance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to look up (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let (author_id, _) = open_author(ctx).await?;
        let db = ctx.data().economy.db();

        let (name, user_id) = match &user {
            Some(user) => (user.name.clone(), user.id.to_string()),
            None => (ctx.author().name.clone(), author_id),
        };
        let Some(account) = ledger::get_account(db, &user_id).await? else {
            ctx.say(format!("**{name}** hasn't played yet.")).await?;
            return Ok(());
        };

        ctx.say(format!(
            "💰 **{name}**: {}\n❤️ {}",
            coins(account.balance),
            health_bar(account.health, account.max_health)
        ))
        .await?;
        Ok(())
    }

    /// Works an honest shift for a few coins.
    #[poise::command(slash_command, prefix_command)]
    pub async fn work(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        let shift = ctx.data().economy.work(&user_id, now).await?;
        ctx.say(format!(
            "💼 You {} and earned **{}**. Balance: {}",
            shift.job.description,
            coins(shift.pay),
            coins(shift.balance)
        ))
        .await?;
        Ok(())
    }

    /// Gives coins to another user.
    #[poise::command(slash_command, prefix_command)]
    pub async fn donate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who gets the coins"] user: serenity::User,
        #[description = "How many coins"]
        #[min = 1]
        amount: i64,
    ) -> Result<()> {
        let (donor_id, _) = open_author(ctx).await?;
        open_target(ctx, &user).await?;
        let remaining = ctx
            .data()
            .economy
            .donate(&donor_id, &user.id.to_string(), amount)
            .await?;
        ctx.say(format!(
            "🎁 You gave **{}** to **{}**. You have {} left.",
            coins(amount),
            user.name,
            coins(remaining)
        ))
        .await?;
        Ok(())
    }

    /// Lists the richest players who chose to be listed.
    #[poise::command(slash_command, prefix_command)]
    pub async fn leaderboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = ctx.data().economy.db();
        let top = ledger::top_balances(db, LEADERBOARD_SIZE * 2).await?;

        let mut text = String::from("🏆 **Leaderboard**\n");
        let mut rank = 0;
        for account in top {
            if !preferences::get(db, &account.user_id, PreferenceKey::ShowInLeaderboards).await? {
                continue;
            }
            rank += 1;
            writeln!(
                &mut text,
                "{rank}. <@{}> - {}",
                account.user_id,
                coins(account.balance)
            )?;
            if rank >= LEADERBOARD_SIZE {
                break;
            }
        }
        if rank == 0 {
            text.push_str("Nobody yet. Be the first!");
        }

        ctx.send(
            poise::CreateReply::default()
                .content(text)
                .allowed_mentions(serenity::CreateAllowedMentions::new()),
        )
        .await?;
        Ok(())
    }

    /// Lists everything you carry.
    #[poise::command(slash_command, prefix_command)]
    pub async fn inventory(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let (user_id, _) = open_author(ctx).await?;
        let db = ctx.data().economy.db();
        let items = inventory::list_items(db, &user_id).await?;

        if items.is_empty() {
            ctx.say("🎒 Your inventory is empty.").await?;
            return Ok(());
        }
        let mut text = String::from("🎒 **Inventory**\n");
        for item in items {
            writeln!(&mut text, "• `{}` × {}", item.item_id, item.quantity)?;
        }
        if let Some(weapon) = inventory::equipped_weapon(db, &user_id).await? {
            writeln!(&mut text, "\nEquipped: `{}` ({} dmg)", weapon.id, weapon.damage)?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Weapons, ammo, armor and gear.
    #[poise::command(slash_command, prefix_command, subcommands("shop_list", "shop_buy"))]
    pub async fn shop(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Shows everything for sale.
    #[poise::command(slash_command, prefix_command, rename = "list")]
    pub async fn shop_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let mut text = String::from("🛒 **Shop**");
        let aisles = [
            (ShopCategory::Weapon, "🔫 Weapons"),
            (ShopCategory::Ammo, "🔸 Ammunition"),
            (ShopCategory::Armor, "🛡️ Protection"),
            (ShopCategory::Consumable, "🍺 Drinks"),
            (ShopCategory::Tool, "🔧 Tools"),
        ];
        for (category, heading) in aisles {
            write!(&mut text, "\n\n**{heading}**")?;
            for item in catalog::SHOP.iter().filter(|i| i.category == category) {
                write!(&mut text, "\n`{}` {} · {}", item.id, item.name, coins(item.price))?;
                if item.bundle > 1 {
                    write!(&mut text, " for {}", item.bundle)?;
                }
            }
        }
        ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Buys something from the shop.
    #[poise::command(slash_command, prefix_command, rename = "buy")]
    pub async fn shop_buy(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Item to buy"]
        #[autocomplete = "autocomplete::autocomplete_shop_item"]
        item: String,
        #[description = "How many (default 1)"]
        #[min = 1]
        #[max = 100]
        quantity: Option<i32>,
    ) -> Result<()> {
        let (user_id, _) = open_author(ctx).await?;
        let purchase = ctx
            .data()
            .economy
            .buy(&user_id, &item, quantity.unwrap_or(1))
            .await?;
        ctx.say(format!(
            "🛒 You bought **{}** × {} for {}. Balance: {}",
            purchase.item.name,
            purchase.received,
            coins(purchase.cost),
            coins(purchase.balance)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
