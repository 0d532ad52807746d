//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions that are not commands
//! themselves: autocomplete suggestions and the error replies shown to users.

/// Autocomplete handlers for catalog ids (banks, routes, items, preferences)
pub mod autocomplete;
/// Turns core errors into user-facing replies
pub mod errors;
