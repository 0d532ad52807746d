//! Unified error types for the economy core and the bot layer.
//!
//! Every failure the core can report falls into one of the kinds in [`ErrorKind`].
//! Precondition failures are deterministic and are always raised before any state
//! is mutated; database failures are transient and abort the surrounding transaction.

use thiserror::Error;

/// Reason an action was rejected before touching any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Precondition {
    /// The acting user is under arrest.
    #[error("you are under arrest for another {remaining_secs} seconds")]
    Arrested {
        /// Seconds until the arrest expires
        remaining_secs: i64,
    },

    /// The command is still cooling down for this user.
    #[error("command `{command}` is on cooldown for another {remaining_ms} ms")]
    OnCooldown {
        /// Command namespace of the cooldown
        command: String,
        /// Milliseconds left in the window
        remaining_ms: i64,
    },

    /// The user cannot cover the required amount.
    #[error("insufficient funds: have {current}, need {required}")]
    InsufficientFunds {
        /// Current balance
        current: i64,
        /// Amount the action needs
        required: i64,
    },

    /// A required item is missing from the inventory.
    #[error("missing item `{item}` (need {required})")]
    MissingItem {
        /// Item identifier
        item: String,
        /// Quantity needed
        required: i32,
    },

    /// Combat actions need an equipped weapon.
    #[error("no weapon equipped")]
    NoWeapon,

    /// The actor is asleep and cannot start risk actions.
    #[error("you are asleep")]
    ActorAsleep,

    /// The target is asleep and protected.
    #[error("target is asleep")]
    TargetAsleep,

    /// The target's preferences forbid this action.
    #[error("target has disabled `{preference}`")]
    TargetOptedOut {
        /// The preference that blocked the action
        preference: String,
    },

    /// The target is in jail.
    #[error("target is under arrest")]
    TargetArrested,

    /// Actor and target are the same user.
    #[error("cannot target yourself")]
    SelfTarget,

    /// The target has nothing to steal.
    #[error("target has no coins")]
    TargetBroke,

    /// A bail flow was requested for a user who is free.
    #[error("user is not arrested")]
    NotArrested,

    /// The arrested user disabled third-party bail.
    #[error("user has disabled friend bail")]
    BailDeclinedByPreference,

    /// The dealer does not sell the requested item.
    #[error("`{item}` is not sold here")]
    NotInStock {
        /// Requested item
        item: String,
    },

    /// No NPC friend was able or willing to pay.
    #[error("no NPC friend could pay the bail")]
    NoFriendAvailable,

    /// Weapons are limited to one of each.
    #[error("you already own `{item}`")]
    AlreadyOwned {
        /// The weapon in question
        item: String,
    },
}

/// Coarse classification used by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Deterministic rejection; nothing was mutated
    Precondition,
    /// Unknown action, target or identifier
    NotFound,
    /// Persistence failure; the operation was rolled back
    Transient,
    /// Administrative operation by a non-admin
    Unauthorized,
    /// Malformed argument
    Invalid,
    /// Configuration, framework or I/O failure
    Internal,
}

/// Application error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Action rejected by a precondition
    #[error(transparent)]
    Precondition(#[from] Precondition),

    /// Unknown identifier
    #[error("{kind} `{id}` not found")]
    NotFound {
        /// What kind of thing was looked up
        kind: &'static str,
        /// The identifier that did not resolve
        id: String,
    },

    /// Non-admin attempted an admin operation
    #[error("user {user_id} is not allowed to do that")]
    Unauthorized {
        /// Offending user
        user_id: String,
    },

    /// Amount argument out of range
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Configuration problem
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Database error from sea-orm
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// String formatting failed
    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Stored JSON could not be decoded
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Serenity/poise failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Classifies this error for the caller.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Database(_) => ErrorKind::Transient,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidAmount { .. } => ErrorKind::Invalid,
            Self::Config { .. }
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Format(_)
            | Self::Json(_)
            | Self::Framework(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::from(Precondition::NoWeapon).kind(),
            ErrorKind::Precondition
        );
        assert_eq!(Error::not_found("bank", "moon").kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::from(sea_orm::DbErr::Custom("disk full".to_string())).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            Error::Unauthorized {
                user_id: "1".to_string()
            }
            .kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_precondition_messages() {
        let err = Error::from(Precondition::InsufficientFunds {
            current: 1000,
            required: 10_000,
        });
        assert_eq!(err.to_string(), "insufficient funds: have 1000, need 10000");
    }
}
