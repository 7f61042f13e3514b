//! Unified error types for the LabEats settlement core.
//!
//! The taxonomy follows the boundaries of the engine: `Validation` for
//! malformed input rejected before any computation, `Conflict` for illegal
//! group-order state transitions (including the loser of a commit/revert
//! race), and `InsufficientBalance` for account-backing failures. Failed
//! atomic commits surface as `Database` errors; SeaORM rolls the transaction
//! back on drop, so partial state is never observable.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input to a computation; rejected before anything is applied.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of what was malformed
        message: String,
    },

    /// Illegal state-transition attempt on a group order.
    ///
    /// Carries enough context (group id, attempted transition, current
    /// status) for an audit trail; never swallowed by the core.
    #[error("group order {group_order_id}: cannot {attempted} while {status}")]
    Conflict {
        /// The group order the transition was attempted on
        group_order_id: i64,
        /// The transition that was attempted (e.g. "settle")
        attempted: &'static str,
        /// The group order's current status
        status: &'static str,
    },

    /// An account-backing check failed and the account disallows overdraw.
    #[error("insufficient balance for user {user_id}: {current} ct available, {required} ct required")]
    InsufficientBalance {
        /// The user whose balance lacks backing
        user_id: i64,
        /// Current balance in cents
        current: i64,
        /// Amount in cents the operation would have withdrawn
        required: i64,
    },

    /// A referenced record does not exist (or is soft-deleted).
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. "user" or "group order"
        entity: &'static str,
        /// Primary key that failed to resolve
        id: i64,
    },

    /// A non-admin user attempted an administrative operation.
    #[error("user {user_id} is not permitted to perform administrative operations")]
    Forbidden {
        /// The offending user
        user_id: i64,
    },

    /// Configuration error (missing file, bad TOML, invalid seed values).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Underlying persistence failure; an uncommitted transaction is rolled
    /// back before this propagates.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (configuration loading).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
