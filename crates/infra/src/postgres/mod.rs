//! Postgres-backed repository adapters.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StorageError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StorageError | Scenario |
//! |------------|----------------------|--------------|----------|
//! | Database (integrity constraint) | `23***` | `Constraint` | Check/unique/foreign key violation (e.g. negative stock) |
//! | Database (serialization failure) | `40001` | `Aborted` | Concurrent transaction conflict |
//! | Database (deadlock detected) | `40P01` | `Aborted` | Deadlock between writers |
//! | Database (query canceled) | `57014` | `Unavailable` | `statement_timeout` or caller deadline |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | Io / Tls / PoolTimedOut / PoolClosed / WorkerCrashed | N/A | `Unavailable` | Connectivity |
//! | ColumnDecode / Decode / ColumnNotFound | N/A | `Corrupt` | Row does not match the schema |
//! | Other | N/A | `Backend` | Anything else |
//!
//! ## Transactions
//!
//! Multi-statement writes run inside one transaction. [`finish`] commits on
//! success and rolls back on every error path; a transaction dropped without
//! either (e.g. because the caller's future was cancelled) is rolled back by
//! SQLx when the connection returns to the pool.

mod category_repository;
mod order_repository;
mod product_repository;

pub use category_repository::PgCategoryRepository;
pub use order_repository::PgOrderRepository;
pub use product_repository::PgProductRepository;

use sqlx::{Postgres, Transaction};

use storefront_core::{StorageError, StorageResult};

/// Map SQLx errors to StorageError.
pub fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some(code) if code.starts_with("23") => StorageError::Constraint(msg),
                Some("40001") | Some("40P01") => StorageError::Aborted(msg),
                Some("57014") => StorageError::Unavailable(msg),
                _ => StorageError::Backend(msg),
            }
        }
        sqlx::Error::Io(e) => {
            StorageError::Unavailable(format!("io error in {}: {}", operation, e))
        }
        sqlx::Error::Tls(e) => {
            StorageError::Unavailable(format!("tls error in {}: {}", operation, e))
        }
        sqlx::Error::PoolTimedOut => {
            StorageError::Unavailable(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            StorageError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::WorkerCrashed => {
            StorageError::Unavailable(format!("connection worker crashed in {}", operation))
        }
        err @ (sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)) => {
            StorageError::Corrupt(format!("failed to decode row in {}: {}", operation, err))
        }
        _ => StorageError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Commit `tx` if `result` is `Ok`, roll it back otherwise.
///
/// The error in `result` is always the one returned; a failed rollback is only logged.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    operation: &str,
    result: StorageResult<T>,
) -> StorageResult<T> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| map_sqlx_error(operation, e))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    operation,
                    error = %rollback_err,
                    "rollback failed; connection will be discarded"
                );
            }
            Err(err)
        }
    }
}
