//! Entity module - Contains all SeaORM entity definitions for the database.
//! Every table is keyed (directly or through a `user_id` column) by the external
//! user identity; no record owns another.

pub mod account;
pub mod arrest;
pub mod crime_profile;
pub mod effect;
pub mod inventory_item;
pub mod npc_friendship;
pub mod pet;
pub mod preference;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use arrest::{Column as ArrestColumn, Entity as Arrest, Model as ArrestModel};
pub use crime_profile::{
    Column as CrimeProfileColumn, Entity as CrimeProfile, Model as CrimeProfileModel,
};
pub use effect::{Column as EffectColumn, Entity as Effect, Model as EffectModel};
pub use inventory_item::{
    Column as InventoryItemColumn, Entity as InventoryItem, Model as InventoryItemModel,
};
pub use npc_friendship::{
    Column as NpcFriendshipColumn, Entity as NpcFriendship, Model as NpcFriendshipModel,
};
pub use pet::{Column as PetColumn, Entity as Pet, Model as PetModel};
pub use preference::{Column as PreferenceColumn, Entity as Preference, Model as PreferenceModel};
