//! Administrator identity loaded from the environment.
//!
//! The bot owner is the only user allowed to run administrative overrides such as
//! force-releasing an arrested user. The id comes from `OWNER_ID` in the `.env` file.

/// Gets the configured owner id, if any.
#[must_use]
pub fn get_owner_id() -> Option<String> {
    std::env::var("OWNER_ID").ok().filter(|id| !id.trim().is_empty())
}

/// Returns true if `user_id` is the configured owner.
///
/// With no `OWNER_ID` configured nobody is an administrator.
#[must_use]
pub fn is_admin(user_id: &str) -> bool {
    get_owner_id().is_some_and(|owner| owner == user_id)
}
