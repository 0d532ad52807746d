//! Core business logic - framework-agnostic economy, crime and bail operations.
//!
//! Nothing in here knows about Discord. Every operation takes a database connection
//! (or transaction) and, where time matters, an explicit `now`.

/// Arrest records and the bail flows
pub mod arrest;
/// Static game tables
pub mod catalog;
/// In-memory per-command cooldowns
pub mod cooldown;
/// Injectable randomness
pub mod dice;
/// Serialized entry point for state-changing turns
pub mod economy;
/// Timed drug and drink effects
pub mod effects;
/// Item counts, weapons and armor
pub mod inventory;
/// Balances and health
pub mod ledger;
/// Per-user boolean preferences
pub mod preferences;
/// Crime profiles, NPC friendships, bodyguards and pets
pub mod profile;
/// Risk action resolution
pub mod resolver;
