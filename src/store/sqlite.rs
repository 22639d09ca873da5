//! SQLite account store
//!
//! Handles all database interactions for account records.

use super::{AccountStore, StoreError, TransferOutcome};
use crate::account::{Account, NewAccount};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, number, encrypted_password, balance, created_at";

/// Account store backed by a SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    /// Open (creating if missing) the database and run migrations
    ///
    /// # Arguments
    /// * `db_url` - SQLite path or `sqlite:` connection string
    /// * `max_connections` - Pool size
    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let connection_string = if db_url.starts_with("sqlite:") {
            db_url.to_string()
        } else {
            if let Some(parent) = PathBuf::from(db_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Database(sqlx::Error::Io(e))
                    })?;
                }
            }
            format!("sqlite:{}", db_url)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        info!("Connected to SQLite database at: {}", db_url);

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Private in-memory database
    ///
    /// Pinned to one connection that is never recycled, since each SQLite
    /// memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), StoreError> {
        debug!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_accounts.sql");

        // Strip comment lines and trailing comments, then split on `;`
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            let without_comments = match trimmed.find("--") {
                Some(comment_pos) => &trimmed[..comment_pos],
                None => trimmed,
            };
            cleaned_sql.push_str(without_comments.trim());
            cleaned_sql.push(' ');
        }

        for statement in cleaned_sql
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        debug!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn map_insert_error(err: sqlx::Error, number: i64) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(format!("account number {} already exists", number))
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let result = sqlx::query(
            "INSERT INTO account (first_name, last_name, number, encrypted_password, balance, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.number)
        .bind(&account.encrypted_password)
        .bind(account.balance)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, account.number))?;

        let id = result.last_insert_rowid();
        debug!(account_id = id, "Inserted account row");
        Ok(account.into_account(id))
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM account ORDER BY id",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM account WHERE id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("account {} not found", id)))
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM account WHERE number = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("account with number [{}] not found", number)))
    }

    async fn delete_account(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM account WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("no account found with id {}", id)));
        }

        debug!(account_id = id, "Deleted account row");
        Ok(())
    }

    async fn transfer(
        &self,
        from_number: i64,
        to_number: i64,
        amount: i64,
    ) -> Result<TransferOutcome, StoreError> {
        // Dropping `tx` before commit rolls back both updates.
        let mut tx = self.pool.begin().await?;

        let debited = sqlx::query(
            "UPDATE account SET balance = balance - ? WHERE number = ? AND balance >= ?",
        )
        .bind(amount)
        .bind(from_number)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT balance FROM account WHERE number = ?")
                    .bind(from_number)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match exists {
                Some(_) => StoreError::InsufficientFunds,
                None => StoreError::NotFound(format!(
                    "account with number [{}] not found",
                    from_number
                )),
            });
        }

        let credited = sqlx::query("UPDATE account SET balance = balance + ? WHERE number = ?")
            .bind(amount)
            .bind(to_number)
            .execute(&mut *tx)
            .await?;

        if credited.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "account with number [{}] not found",
                to_number
            )));
        }

        let from_balance: i64 = sqlx::query_scalar("SELECT balance FROM account WHERE number = ?")
            .bind(from_number)
            .fetch_one(&mut *tx)
            .await?;
        let to_balance: i64 = sqlx::query_scalar("SELECT balance FROM account WHERE number = ?")
            .bind(to_number)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(TransferOutcome {
            from_balance,
            to_balance,
        })
    }
}
