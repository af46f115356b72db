//! A tiny module to run SQL transactions with the right configuration.

use sea_orm::{AccessMode, DatabaseTransaction, DbErr, IsolationLevel, TransactionTrait};

/// Wraps the call of the provided function with an SQL transaction with the provided mode.
///
/// The transaction is committed if the function returns `Ok`, and rolled back otherwise, so a
/// failure in the middle of a cascade never leaves it partially applied.
///
/// If you get some weird errors, try wrapping the call using the
/// [`assert_future_send`](crate::assert_future_send) function.
pub async fn transaction_with_config<F, C, T, E>(
    conn: &C,
    isolation_level: Option<IsolationLevel>,
    access_mode: Option<AccessMode>,
    f: F,
) -> Result<T, E>
where
    F: for<'a> AsyncFnOnce(&'a DatabaseTransaction) -> Result<T, E>,
    E: From<DbErr>,
    C: TransactionTrait,
{
    let txn = conn.begin_with_config(isolation_level, access_mode).await?;

    match f(&txn).await {
        Ok(ret) => {
            txn.commit().await?;
            Ok(ret)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Wraps the call of the provided function with a read-write SQL transaction.
///
/// Every mutation of the core goes through this function.
pub async fn transaction<F, C, T, E>(conn: &C, f: F) -> Result<T, E>
where
    F: for<'a> AsyncFnOnce(&'a DatabaseTransaction) -> Result<T, E>,
    E: From<DbErr>,
    C: TransactionTrait,
{
    transaction_with_config(conn, None, None, f).await
}

/// Wraps the call of the provided function with a read-only, repeatable-read transaction.
///
/// Everything read inside the function observes the same version of the data, which is what
/// the scoring and the role synchronization need.
pub async fn read_snapshot<F, C, T, E>(conn: &C, f: F) -> Result<T, E>
where
    F: for<'a> AsyncFnOnce(&'a DatabaseTransaction) -> Result<T, E>,
    E: From<DbErr>,
    C: TransactionTrait,
{
    transaction_with_config(
        conn,
        Some(IsolationLevel::RepeatableRead),
        Some(AccessMode::ReadOnly),
        f,
    )
    .await
}
