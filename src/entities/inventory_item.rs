//! Inventory item entity - Quantity of one catalog item held by a user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory row database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user id
    pub user_id: String,
    /// Catalog item id
    pub item_id: String,
    /// Units held, rows at 0 are deleted
    pub quantity: i32,
}

/// `InventoryItem` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
