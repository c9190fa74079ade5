//! Shared Diesel error classification.
//!
//! Repositories classify a [`diesel::result::Error`] once and then pick the
//! port error variant for each class, so constraint and lock handling stays
//! consistent across adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse class of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// A `first`/`get_result` found no row.
    NotFound,
    /// The connection dropped or the transaction manager is unusable.
    Connection(String),
    /// A row lock was not granted within `lock_timeout`, or a deadlock was
    /// broken by the server.
    LockTimeout(String),
    /// A `CHECK` constraint rejected the write.
    CheckViolation { constraint: Option<String> },
    /// A `UNIQUE` constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key rejected the write or delete.
    ForeignKeyViolation { constraint: Option<String> },
    /// A value did not fit its column type (SQLSTATE 22003).
    OutOfRange(String),
    /// Anything else.
    Query(String),
}

fn is_lock_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("lock timeout")
        || lower.contains("could not obtain lock")
        || lower.contains("deadlock detected")
}

fn is_out_of_range(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("numeric field overflow") || lower.contains("out of range")
}

/// Classify a Diesel error, logging the underlying cause at debug level.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::NotFound,
        DieselError::BrokenTransactionManager => {
            DieselFailure::Connection("transaction manager is broken".to_owned())
        }
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection closed".to_owned())
                }
                DatabaseErrorKind::CheckViolation => DieselFailure::CheckViolation { constraint },
                DatabaseErrorKind::UniqueViolation => {
                    DieselFailure::UniqueViolation { constraint }
                }
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation { constraint }
                }
                DatabaseErrorKind::SerializationFailure => {
                    DieselFailure::LockTimeout(info.message().to_owned())
                }
                _ if is_lock_failure(info.message()) => {
                    DieselFailure::LockTimeout(info.message().to_owned())
                }
                _ if is_out_of_range(info.message()) => {
                    DieselFailure::OutOfRange(info.message().to_owned())
                }
                _ => DieselFailure::Query("database error".to_owned()),
            }
        }
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".to_owned()),
        _ => DieselFailure::Query("database error".to_owned()),
    }
}
