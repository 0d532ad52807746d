//! NPC friendship entity - How much an NPC likes a user; gates NPC bail.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// NPC friendship database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "npc_friendships")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user id
    pub user_id: String,
    /// Catalog id of the NPC friend
    pub friend_id: String,
    /// Friendship level
    pub level: i32,
    /// Number of times the friendship changed
    pub interactions: i32,
}

/// Each friendship belongs to one crime profile
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning profile
    #[sea_orm(
        belongs_to = "super::crime_profile::Entity",
        from = "Column::UserId",
        to = "super::crime_profile::Column::UserId"
    )]
    CrimeProfile,
}

impl Related<super::crime_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrimeProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
