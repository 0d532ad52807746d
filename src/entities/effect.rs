//! Effect entity - A temporary modifier from a consumed drug or drink.
//!
//! `modifiers` holds a serialized [`crate::core::effects::Modifiers`]. An effect is active
//! only while `now < expires_at`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Active effect database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "effects")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user id
    pub user_id: String,
    /// Effect key (usually the consumable's item id)
    pub effect_key: String,
    /// JSON-encoded modifiers
    pub modifiers: Json,
    /// Absolute expiry
    pub expires_at: DateTimeUtc,
}

/// `Effect` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
