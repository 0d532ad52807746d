//! Pet entity - A user's active pet, which may defend an AFK owner.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    /// Owner's Discord user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Catalog species id
    pub species: String,
    /// Pet level
    pub level: i32,
    /// Defense stat
    pub defense: i32,
    /// Speed stat
    pub speed: i32,
    /// Hunger as of `last_fed`, 0-100
    pub hunger: i32,
    /// Happiness as of `last_played`, 0-100
    pub happiness: i32,
    /// When `hunger` was last written
    pub last_fed: DateTimeUtc,
    /// When `happiness` was last written
    pub last_played: DateTimeUtc,
}

/// `Pet` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
