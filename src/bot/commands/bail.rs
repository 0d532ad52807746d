//! Bail Discord commands - arrest status, the three bail flows and the admin release.
//!
//! Friend bail is asked for by the arrested user, naming who should pay. The request
//! posts buttons only that friend can press. Nothing is charged until they accept, and
//! everything is checked again at that moment.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{coins, open_author, open_target},
            handlers::errors::user_message,
        },
        core::arrest,
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use std::time::Duration;
    use tracing::{info, warn};

    /// Shows whether a user is locked up, for how long and for how much.
    #[poise::command(slash_command, prefix_command)]
    pub async fn arrest_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to look up (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let (author_id, now) = open_author(ctx).await?;
        let (name, user_id) = match &user {
            Some(user) => (user.name.clone(), user.id.to_string()),
            None => (ctx.author().name.clone(), author_id),
        };

        let text = match arrest::get_arrest_info(ctx.data().economy.db(), &user_id, now).await? {
            Some(record) => format!(
                "🚔 **{name}** is locked up for *{}*.\nReleased <t:{}:R> · bail {}",
                record.reason,
                record.arrested_until.timestamp(),
                coins(record.bail_amount)
            ),
            None => format!("🕊️ **{name}** is a free citizen."),
        };
        ctx.say(text).await?;
        Ok(())
    }

    /// Ways out of jail.
    #[poise::command(
        slash_command,
        prefix_command,
        subcommands("bail_self", "bail_npc", "bail_friend")
    )]
    pub async fn bail(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Pays your own bail.
    #[poise::command(slash_command, prefix_command, rename = "self")]
    pub async fn bail_self(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        let paid = ctx.data().economy.bail_self(&user_id, now).await?;
        ctx.say(format!("🔓 You paid {} and walked out a free person.", coins(paid)))
            .await?;
        Ok(())
    }

    /// Asks your NPC friends to pay your bail.
    #[poise::command(slash_command, prefix_command, rename = "npc")]
    pub async fn bail_npc(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let (user_id, now) = open_author(ctx).await?;
        let bail = ctx.data().economy.bail_npc(&user_id, now).await?;
        ctx.say(format!(
            "🤝 **{}** covered your {} bail. Friendship is now {}.",
            bail.friend.name,
            coins(bail.amount),
            bail.friendship_level
        ))
        .await?;
        Ok(())
    }

    /// Asks a friend to pay your bail. They have to accept.
    #[poise::command(slash_command, prefix_command, rename = "friend")]
    pub async fn bail_friend(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who should pay"] friend: serenity::User,
    ) -> Result<()> {
        let (arrested_id, now) = open_author(ctx).await?;
        open_target(ctx, &friend).await?;
        let payer_id = friend.id.to_string();
        let economy = &ctx.data().economy;
        let record = economy.check_friend_bail(&arrested_id, &payer_id, now).await?;

        let ctx_id = ctx.id();
        let accept_id = format!("{ctx_id}accept");
        let decline_id = format!("{ctx_id}decline");
        let buttons = serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(&accept_id)
                .label("Pay bail")
                .style(serenity::ButtonStyle::Success),
            serenity::CreateButton::new(&decline_id)
                .label("Decline")
                .style(serenity::ButtonStyle::Danger),
        ]);
        let timeout_secs = economy.config().bail_request_timeout_secs;
        let handle = ctx
            .send(
                poise::CreateReply::default()
                    .content(format!(
                        "<@{payer_id}>, **{}** is locked up and asks you to pay their {} bail. Answer within {timeout_secs}s.",
                        ctx.author().name,
                        coins(record.bail_amount)
                    ))
                    .components(vec![buttons]),
            )
            .await?;

        let press = serenity::ComponentInteractionCollector::new(ctx)
            .author_id(friend.id)
            .channel_id(ctx.channel_id())
            .timeout(Duration::from_secs(timeout_secs))
            .filter(move |press| press.data.custom_id.starts_with(&ctx_id.to_string()))
            .await;

        let text = match press {
            Some(press) => {
                press
                    .create_response(ctx, serenity::CreateInteractionResponse::Acknowledge)
                    .await?;
                if press.data.custom_id == accept_id {
                    match economy.bail_friend(&arrested_id, &payer_id, Utc::now()).await {
                        Ok(paid) => {
                            info!("{payer_id} bailed out {arrested_id} for {paid}");
                            format!(
                                "🔓 **{}** paid {} and <@{arrested_id}> is free!",
                                friend.name,
                                coins(paid)
                            )
                        }
                        Err(e) => {
                            warn!("Friend bail for {arrested_id} failed at payment: {e}");
                            format!("Bail could not be paid. {}", user_message(&e))
                        }
                    }
                } else {
                    format!("**{}** won't pay your bail this time.", friend.name)
                }
            }
            None => format!("⌛ **{}** didn't answer in time.", friend.name),
        };

        handle
            .edit(
                ctx,
                poise::CreateReply::default().content(text).components(vec![]),
            )
            .await?;
        Ok(())
    }

    /// Releases a user from jail. Owner only.
    #[poise::command(slash_command, prefix_command)]
    pub async fn release(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to release"] user: serenity::User,
    ) -> Result<()> {
        let actor_id = ctx.author().id.to_string();
        let released = ctx
            .data()
            .economy
            .force_release(&actor_id, &user.id.to_string())
            .await?;
        let text = if released {
            format!("🔓 **{}** has been released.", user.name)
        } else {
            format!("**{}** wasn't locked up.", user.name)
        };
        ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
