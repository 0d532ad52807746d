//! Crime profile entity - Per-user criminal record and protection.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Crime profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crime_profiles")]
pub struct Model {
    /// Discord user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Derived from `crime_xp`, never decreases
    pub crime_level: i32,
    /// Accumulated experience from successful crimes
    pub crime_xp: i64,
    /// Every resolved attempt, successful or not
    pub total_attempts: i32,
    /// Attempts that paid out
    pub successful_attempts: i32,
    /// Attempts that ended in arrest
    pub times_arrested: i32,
    /// Number of businesses owned
    pub businesses_owned: i32,
    /// Hired basic bodyguards
    pub basic_bodyguards: i32,
    /// Hired professional bodyguards
    pub professional_bodyguards: i32,
    /// Hired elite bodyguards
    pub elite_bodyguards: i32,
}

/// One profile has many NPC friendships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// NPC friends of this user
    #[sea_orm(has_many = "super::npc_friendship::Entity")]
    NpcFriendships,
}

impl Related<super::npc_friendship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NpcFriendships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
