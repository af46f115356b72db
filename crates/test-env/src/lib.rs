use std::panic;

use anyhow::Context as _;
use futures::FutureExt as _;
use maplist_lib::Database;
use migration::MigratorTrait as _;
use sea_orm::ConnectOptions;
use tracing_subscriber::fmt::TestWriter;

pub trait IntoResult {
    type Out;

    fn into_result(self) -> anyhow::Result<Self::Out>;
}

impl IntoResult for () {
    type Out = ();

    fn into_result(self) -> anyhow::Result<Self::Out> {
        Ok(())
    }
}

impl<T, E> IntoResult for Result<T, E>
where
    anyhow::Error: From<E>,
{
    type Out = T;

    fn into_result(self) -> anyhow::Result<Self::Out> {
        self.map_err(From::from)
    }
}

pub fn init_env() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => return Err(err).context("cannot retrieve .env files"),
        _ => (),
    }

    let _ = tracing_subscriber::fmt()
        .with_writer(TestWriter::new())
        .try_init();

    Ok(())
}

/// Runs the test against a fresh, migrated in-memory database.
///
/// The pool holds a single connection, otherwise each connection would see its own database.
pub async fn wrap<F, R>(test: F) -> anyhow::Result<<R as IntoResult>::Out>
where
    F: AsyncFnOnce(Database) -> R,
    R: IntoResult,
{
    init_env()?;

    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = sea_orm::Database::connect(options)
        .await
        .context("cannot open the test database")?;

    migration::Migrator::up(&db, None).await?;
    tracing::debug!("Migrated test database");

    let r = panic::AssertUnwindSafe(test(Database::from_db_conn(db)))
        .catch_unwind()
        .await;

    match r {
        Ok(r) => r.into_result(),
        Err(e) => {
            tracing::info!("Test failed");
            panic::resume_unwind(e)
        }
    }
}
