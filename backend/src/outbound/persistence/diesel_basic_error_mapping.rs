//! Shared Diesel error mapping for the aggregate repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::RowCodecError;
use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Constructors a repository error type offers for Diesel failures.
pub(crate) struct DieselErrorMapping<Q, C, D> {
    pub query: Q,
    pub connection: C,
    /// Receives the violated constraint name, or `None` when unknown.
    pub duplicate: D,
}

/// Map Diesel failures onto query, connection and duplicate constructors.
pub(crate) fn map_basic_diesel_error<E, Q, C, D>(
    error: DieselError,
    mapping: DieselErrorMapping<Q, C, D>,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    D: FnOnce(Option<&str>) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => (mapping.query)("record not found"),
        DieselError::QueryBuilderError(_) => (mapping.query)("database query error"),
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            (mapping.query)("stored record could not be converted")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            (mapping.connection)("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            (mapping.duplicate)(info.constraint_name())
        }
        _ => (mapping.query)("database error"),
    }
}

/// Log a row conversion failure and hand back its message.
pub(crate) fn describe_codec_error(error: &RowCodecError) -> String {
    debug!(%error, "row conversion failed");
    error.to_string()
}

/// Wrap a row conversion failure so it can abort a Diesel transaction.
pub(crate) fn codec_to_diesel(error: RowCodecError) -> DieselError {
    DieselError::DeserializationError(Box::new(error))
}
