use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{
    AccountSummary, BalanceError, Cents, NewTransaction, Transaction, TransactionId,
    TransactionType, next_balance,
};

use super::MIGRATION_001_INITIAL;

const TRANSACTION_COLUMNS: &str =
    "id, account_no, holder_name, transaction_type, amount_cents, balance_cents, date";

/// Repository for persisting and querying ledger transactions.
///
/// Owns a pool capped at a single connection, so every statement issued
/// through it is serialized.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database {}", database_url))?;
        Ok(Self::new(pool))
    }

    /// Create the schema if it does not exist yet. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Connect and migrate.
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Balance queries
    // ========================

    /// Snapshot balance of the latest row for an account, or 0 when it has none.
    pub async fn latest_balance(&self, account_no: &str) -> Result<Cents> {
        let balance: Option<Cents> = sqlx::query_scalar(
            r#"
            SELECT balance_cents
            FROM transactions
            WHERE account_no = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(account_no)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch latest balance")?;

        Ok(balance.unwrap_or(0))
    }

    /// One summary per distinct account, taken from its latest row.
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT t.account_no, t.holder_name, t.balance_cents, latest.transaction_count
            FROM transactions t
            JOIN (
                SELECT account_no, MAX(id) AS latest_id, COUNT(*) AS transaction_count
                FROM transactions
                GROUP BY account_no
            ) latest ON t.id = latest.latest_id
            ORDER BY t.account_no
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        Ok(rows
            .iter()
            .map(|row| AccountSummary {
                account_no: row.get("account_no"),
                holder_name: row.get("holder_name"),
                balance_cents: row.get("balance_cents"),
                transaction_count: row.get("transaction_count"),
            })
            .collect())
    }

    // ========================
    // Transaction operations
    // ========================

    /// Append a row whose balance follows the account's latest snapshot.
    ///
    /// The balance read and the insert share one SQLite transaction. The outer
    /// error is a storage failure; the inner one is a rejected withdrawal or a
    /// balance that would not fit, in which case nothing is written.
    pub async fn append_transaction(
        &self,
        new: &NewTransaction,
        transaction_type: TransactionType,
    ) -> Result<std::result::Result<Transaction, BalanceError>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let current: Option<Cents> = sqlx::query_scalar(
            "SELECT balance_cents FROM transactions WHERE account_no = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(&new.account_no)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch latest balance")?;

        let balance = match next_balance(current.unwrap_or(0), transaction_type, new.amount_cents)
        {
            Ok(balance) => balance,
            Err(rejected) => {
                tx.rollback().await.context("Failed to roll back")?;
                return Ok(Err(rejected));
            }
        };

        let id = sqlx::query(
            r#"
            INSERT INTO transactions
                (account_no, holder_name, transaction_type, amount_cents, balance_cents, date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.account_no)
        .bind(&new.holder_name)
        .bind(transaction_type.as_str())
        .bind(new.amount_cents)
        .bind(balance)
        .bind(&new.date)
        .execute(&mut *tx)
        .await
        .context("Failed to save transaction")?
        .last_insert_rowid();

        tx.commit().await.context("Failed to commit transaction")?;

        Ok(Ok(Transaction {
            id,
            account_no: new.account_no.clone(),
            holder_name: new.holder_name.clone(),
            transaction_type,
            amount_cents: new.amount_cents,
            balance_cents: balance,
            date: new.date.clone(),
        }))
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let query = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// List all transactions, most recent first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let query = format!(
            "SELECT {} FROM transactions ORDER BY id DESC",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List all transactions in insertion order.
    pub async fn list_transactions_chronological(&self) -> Result<Vec<Transaction>> {
        let query = format!("SELECT {} FROM transactions ORDER BY id", TRANSACTION_COLUMNS);
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Overwrite type, amount and date of a row. Returns false when no row has `id`.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        transaction_type: TransactionType,
        amount_cents: Cents,
        date: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET transaction_type = ?, amount_cents = ?, date = ?
            WHERE id = ?
            "#,
        )
        .bind(transaction_type.as_str())
        .bind(amount_cents)
        .bind(date)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update transaction")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a row. Returns false when no row has `id`.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let type_str: String = row.get("transaction_type");

        Ok(Transaction {
            id: row.get("id"),
            account_no: row.get("account_no"),
            holder_name: row.get("holder_name"),
            transaction_type: type_str
                .parse()
                .with_context(|| format!("Invalid transaction type: {}", type_str))?,
            amount_cents: row.get("amount_cents"),
            balance_cents: row.get("balance_cents"),
            date: row.get("date"),
        })
    }
}
