//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Bail flows, arrest status and the admin release
pub mod bail;

/// Risk actions and the gear that feeds them
pub mod crime;

/// Balances, work, donations and the leaderboard
pub mod economy;

/// General utility commands
pub mod general;

/// Preference flags
pub mod preferences;

/// Helpers shared by the command modules
pub mod utils;

// Export commands
pub use bail::*;
pub use crime::*;
pub use economy::*;
pub use general::*;
pub use preferences::*;
