//! Arrest entity - At most one active jail record per user.
//!
//! A record whose `arrested_until` is in the past is logically absent and is purged
//! the next time it is queried.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Arrest database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "arrests")]
pub struct Model {
    /// Discord user id of the arrested user
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Absolute release time
    pub arrested_until: DateTimeUtc,
    /// Free-text reason shown to the user
    pub reason: String,
    /// Coins required to post bail
    pub bail_amount: i64,
}

/// `Arrest` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
