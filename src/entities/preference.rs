//! Preference entity - One explicitly set boolean flag per row.
//!
//! Flags that were never set have no row and resolve to their documented default.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preference database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preferences")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user id
    pub user_id: String,
    /// Preference key, e.g. `"allow_attacks"`
    pub key: String,
    /// Stored value
    pub enabled: bool,
}

/// `Preference` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
