//! Account entity - A user's coin balance and combat vitals.
//!
//! Accounts are keyed by the external (Discord) user id and created lazily the first
//! time a user interacts with the economy. Balances are never negative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Discord user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Coin balance, always >= 0
    pub balance: i64,
    /// Current health points, floored at 0
    pub health: i32,
    /// Maximum health points
    pub max_health: i32,
    /// Weapon item id used for attacks
    pub equipped_weapon: Option<String>,
    /// Last time the user initiated a command; drives AFK pet defense
    pub last_active_at: Option<DateTimeUtc>,
}

/// Accounts have no relations; every per-user record is keyed by the same user id
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
