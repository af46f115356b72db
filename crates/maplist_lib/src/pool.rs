//! Contains the type representing the database of the Maplist.

use sea_orm::DbConn;

/// Represents the database of the Maplist.
#[derive(Clone)]
pub struct Database {
    /// The SQL database connection pool.
    pub sql_conn: DbConn,
}

impl Database {
    /// Wraps an existing connection.
    pub fn from_db_conn(sql_conn: DbConn) -> Self {
        Self { sql_conn }
    }

    /// Returns the database from its URL.
    pub async fn from_db_url(db_url: String) -> Result<Self, sea_orm::DbErr> {
        let sql_conn = sea_orm::Database::connect(db_url).await?;
        Ok(Self::from_db_conn(sql_conn))
    }
}
