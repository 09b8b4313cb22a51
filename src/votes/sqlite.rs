use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use regex::Regex;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::OnceCell;

use super::model::VoteRecord;
use super::store::{StoreError, VoteStore};

/// Vote store backed by a single SQLite table.
///
/// The pool connects lazily and the table is created on first use, so an
/// unreachable database surfaces as a failed store call rather than at startup.
pub struct SqliteVoteStore {
    pool: SqlitePool,
    table: String,
    schema: OnceCell<()>,
}

static SQL_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

/// Whether `name` can be spliced into SQL text as a table name.
pub fn is_sql_identifier(name: &str) -> bool {
    SQL_IDENTIFIER.is_match(name)
}

impl SqliteVoteStore {
    /// Configure a store for `db_url`. Nothing is opened until the first call;
    /// the database file and the vote table are created then if missing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(db_url: &str, table: &str, max_connections: u32) -> Result<Self, StoreError> {
        // The table name is spliced into SQL text; only plain identifiers are accepted.
        if !is_sql_identifier(table) {
            return Err(StoreError::InvalidTable(table.to_string()));
        }

        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);
        info!("Vote store {} (table {})", db_url, table);

        Ok(Self {
            pool,
            table: table.to_string(),
            schema: OnceCell::new(),
        })
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the vote table once. A failed attempt is retried by the next call.
    async fn ready(&self) -> Result<(), StoreError> {
        self.schema
            .get_or_try_init(|| self.init_schema())
            .await
            .map(|_| ())
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                track_number INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl VoteStore for SqliteVoteStore {
    async fn insert(&self, record: VoteRecord) -> Result<(), StoreError> {
        self.ready().await?;
        sqlx::query(&format!(
            "INSERT INTO {} (track_number) VALUES (?)",
            self.table
        ))
        .bind(record.track_number)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<VoteRecord>, StoreError> {
        self.ready().await?;
        let rows = sqlx::query(&format!("SELECT track_number FROM {}", self.table))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| VoteRecord {
                track_number: row.get::<i64, _>("track_number"),
            })
            .collect();

        Ok(rows)
    }
}
