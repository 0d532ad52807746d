//! Inventory - item counts per user, weapon equipping and armor totals.

use crate::{
    core::{catalog, ledger},
    entities::{InventoryItem, inventory_item},
    errors::{Error, Precondition, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

async fn find_row<C>(db: &C, user_id: &str, item_id: &str) -> Result<Option<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .filter(inventory_item::Column::ItemId.eq(item_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Units of `item_id` the user holds.
pub async fn item_count<C>(db: &C, user_id: &str, item_id: &str) -> Result<i32>
where
    C: ConnectionTrait,
{
    Ok(find_row(db, user_id, item_id)
        .await?
        .map_or(0, |row| row.quantity))
}

/// True when the user holds at least `quantity` units.
pub async fn has_item<C>(db: &C, user_id: &str, item_id: &str, quantity: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(item_count(db, user_id, item_id).await? >= quantity)
}

/// Every item the user holds, alphabetically.
pub async fn list_items<C>(db: &C, user_id: &str) -> Result<Vec<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .filter(inventory_item::Column::Quantity.gt(0))
        .order_by_asc(inventory_item::Column::ItemId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds units of an item and returns the new count.
pub async fn add_item<C>(db: &C, user_id: &str, item_id: &str, quantity: i32) -> Result<i32>
where
    C: ConnectionTrait,
{
    if quantity <= 0 {
        return Err(Error::InvalidAmount {
            amount: i64::from(quantity),
        });
    }
    let total = match find_row(db, user_id, item_id).await? {
        Some(row) => {
            let total = row.quantity.saturating_add(quantity);
            let mut active: inventory_item::ActiveModel = row.into();
            active.quantity = Set(total);
            active.update(db).await?;
            total
        }
        None => {
            inventory_item::ActiveModel {
                user_id: Set(user_id.to_string()),
                item_id: Set(item_id.to_string()),
                quantity: Set(quantity),
                ..Default::default()
            }
            .insert(db)
            .await?;
            quantity
        }
    };
    debug!("{user_id} now holds {total} x {item_id}");
    Ok(total)
}

/// Removes units of an item; fails with `MissingItem` if the user holds too few.
pub async fn remove_item<C>(db: &C, user_id: &str, item_id: &str, quantity: i32) -> Result<i32>
where
    C: ConnectionTrait,
{
    let missing = || Precondition::MissingItem {
        item: item_id.to_string(),
        required: quantity,
    };
    let row = find_row(db, user_id, item_id).await?.ok_or_else(missing)?;
    if row.quantity < quantity {
        return Err(missing().into());
    }

    let remaining = row.quantity - quantity;
    if remaining == 0 {
        row.delete(db).await?;
    } else {
        let mut active: inventory_item::ActiveModel = row.into();
        active.quantity = Set(remaining);
        active.update(db).await?;
    }
    debug!("{user_id} used {quantity} x {item_id}, {remaining} left");
    Ok(remaining)
}

/// Equips a catalog weapon the user owns.
pub async fn equip_weapon<C>(db: &C, user_id: &str, weapon_id: &str) -> Result<catalog::Weapon>
where
    C: ConnectionTrait,
{
    let weapon = catalog::weapon(weapon_id).ok_or_else(|| Error::not_found("weapon", weapon_id))?;
    if !has_item(db, user_id, weapon_id, 1).await? {
        return Err(Precondition::MissingItem {
            item: weapon_id.to_string(),
            required: 1,
        }
        .into());
    }
    ledger::set_equipped_weapon(db, user_id, Some(weapon_id.to_string())).await?;
    info!("{user_id} equipped {weapon_id}");
    Ok(weapon)
}

/// The user's equipped weapon, if it is still owned.
pub async fn equipped_weapon<C>(db: &C, user_id: &str) -> Result<Option<catalog::Weapon>>
where
    C: ConnectionTrait,
{
    let Some(weapon_id) = ledger::get_account(db, user_id)
        .await?
        .and_then(|account| account.equipped_weapon)
    else {
        return Ok(None);
    };
    if !has_item(db, user_id, &weapon_id, 1).await? {
        return Ok(None);
    }
    Ok(catalog::weapon(&weapon_id))
}

/// Sum of the defense of every armor piece the user owns.
pub async fn armor_total<C>(db: &C, user_id: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    let mut total = 0;
    for piece in catalog::ARMOR {
        if has_item(db, user_id, piece.id, 1).await? {
            total += piece.defense;
        }
    }
    Ok(total)
}

/// What a shop purchase delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    /// The listing that was bought
    pub item: catalog::ShopItem,
    /// Items added to the inventory (units × bundle size)
    pub received: i32,
    /// Coins paid
    pub cost: i64,
    /// Balance afterwards
    pub balance: i64,
}

/// Buys `quantity` units of a shop listing, debiting and delivering in one transaction.
///
/// Weapons are limited to one of each, bought one at a time.
#[instrument(skip(db))]
pub async fn buy(db: &DatabaseConnection, user_id: &str, item_id: &str, quantity: i32) -> Result<Purchase> {
    let item = catalog::shop_item(item_id).ok_or_else(|| Error::not_found("shop item", item_id))?;
    if quantity <= 0 || (item.category == catalog::ShopCategory::Weapon && quantity > 1) {
        return Err(Error::InvalidAmount {
            amount: i64::from(quantity),
        });
    }
    let cost = item.price.saturating_mul(i64::from(quantity));
    let received = quantity.saturating_mul(item.bundle);

    let txn = db.begin().await?;
    if item.category == catalog::ShopCategory::Weapon && has_item(&txn, user_id, item_id, 1).await? {
        return Err(Precondition::AlreadyOwned {
            item: item_id.to_string(),
        }
        .into());
    }
    let current = ledger::get_balance(&txn, user_id).await?;
    if current < cost {
        return Err(Precondition::InsufficientFunds {
            current,
            required: cost,
        }
        .into());
    }
    let balance = ledger::subtract_balance(&txn, user_id, cost).await?;
    add_item(&txn, user_id, item_id, received).await?;
    txn.commit().await?;

    info!("{user_id} bought {received} x {item_id} for {cost}");
    Ok(Purchase {
        item,
        received,
        cost,
        balance,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_and_remove() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(add_item(&db, "u1", "bullets", 5).await?, 5);
        assert_eq!(add_item(&db, "u1", "bullets", 3).await?, 8);
        assert_eq!(remove_item(&db, "u1", "bullets", 8).await?, 0);

        // Empty rows are removed entirely
        assert!(list_items(&db, "u1").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_too_many_is_precondition() -> Result<()> {
        let db = setup_test_db().await?;
        add_item(&db, "u1", "lockpicks", 1).await?;

        let result = remove_item(&db, "u1", "lockpicks", 2).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Precondition(Precondition::MissingItem { required: 2, .. })
        ));
        assert_eq!(item_count(&db, "u1", "lockpicks").await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_equip_requires_ownership() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 0).await?;

        assert!(equip_weapon(&db, "u1", "rifle").await.is_err());
        assert!(matches!(
            equip_weapon(&db, "u1", "banana").await.unwrap_err(),
            Error::NotFound { kind: "weapon", .. }
        ));

        add_item(&db, "u1", "rifle", 1).await?;
        equip_weapon(&db, "u1", "rifle").await?;
        assert_eq!(equipped_weapon(&db, "u1").await?.unwrap().damage, 45);

        // Losing the weapon unequips it in effect
        remove_item(&db, "u1", "rifle", 1).await?;
        assert!(equipped_weapon(&db, "u1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_buy_ammo_bundle() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 1_000).await?;

        let purchase = buy(&db, "u1", "bullets", 2).await?;
        assert_eq!(purchase.cost, 100);
        assert_eq!(purchase.received, 50);
        assert_eq!(purchase.balance, 900);
        assert_eq!(item_count(&db, "u1", "bullets").await?, 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_buy_weapon_once() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 10_000).await?;

        assert!(matches!(
            buy(&db, "u1", "pistol", 2).await.unwrap_err(),
            Error::InvalidAmount { amount: 2 }
        ));
        buy(&db, "u1", "pistol", 1).await?;
        assert!(matches!(
            buy(&db, "u1", "pistol", 1).await.unwrap_err(),
            Error::Precondition(Precondition::AlreadyOwned { .. })
        ));
        assert_eq!(ledger::get_balance(&db, "u1").await?, 7_500);

        // A bought weapon can be equipped
        assert_eq!(equip_weapon(&db, "u1", "pistol").await?.damage, 25);
        Ok(())
    }

    #[tokio::test]
    async fn test_buy_without_funds_changes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, "u1", 1_000).await?;

        let result = buy(&db, "u1", "explosives", 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Precondition(Precondition::InsufficientFunds { current: 1_000, required: 4_000 })
        ));
        assert_eq!(ledger::get_balance(&db, "u1").await?, 1_000);
        assert_eq!(item_count(&db, "u1", "explosives").await?, 0);

        assert!(matches!(
            buy(&db, "u1", "moon_rock", 1).await.unwrap_err(),
            Error::NotFound { kind: "shop item", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_armor_stacks() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(armor_total(&db, "u1").await?, 0);
        add_item(&db, "u1", "helmet", 1).await?;
        add_item(&db, "u1", "shield", 2).await?;
        assert_eq!(armor_total(&db, "u1").await?, 50);
        Ok(())
    }
}
