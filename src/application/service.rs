use tracing::{debug, info, warn};

use crate::domain::{
    AccountSummary, BalanceError, Cents, IntegrityReport, Transaction, TransactionId,
    TransactionRequest, TransactionType, build_integrity_report, format_cents,
    parse_positive_amount,
};
use crate::storage::Repository;

use super::AppError;

/// The ledger store: every read and write of transactions goes through here.
/// This is the primary interface for any client (CLI, interactive shell, tests).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating file and schema if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        debug!(database = database_path, "ledger opened");
        Ok(Self::new(repo))
    }

    // ========================
    // Balances
    // ========================

    /// Balance of the latest transaction for `account_no`, or 0 if it has none.
    pub async fn get_current_balance(&self, account_no: &str) -> Result<Cents, AppError> {
        let account_no = account_no.trim();
        if account_no.is_empty() {
            return Err(AppError::Validation(
                "account number is required".to_string(),
            ));
        }

        let balance = self.repo.latest_balance(account_no).await?;
        debug!(account_no, balance, "balance lookup");
        Ok(balance)
    }

    /// One entry per account that has at least one transaction.
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    // ========================
    // Recording
    // ========================

    /// Record a deposit on top of the account's current balance.
    pub async fn record_deposit(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, AppError> {
        self.record(request, TransactionType::Deposit).await
    }

    /// Record a withdrawal. Fails without writing anything when the amount
    /// exceeds the account's current balance.
    pub async fn record_withdrawal(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, AppError> {
        self.record(request, TransactionType::Withdrawal).await
    }

    async fn record(
        &self,
        request: &TransactionRequest,
        transaction_type: TransactionType,
    ) -> Result<Transaction, AppError> {
        let new = request.validate()?;

        match self.repo.append_transaction(&new, transaction_type).await? {
            Ok(transaction) => {
                info!(
                    id = transaction.id,
                    account_no = %transaction.account_no,
                    kind = %transaction_type,
                    amount = %format_cents(transaction.amount_cents),
                    balance = %format_cents(transaction.balance_cents),
                    "transaction recorded"
                );
                Ok(transaction)
            }
            Err(BalanceError::InsufficientFunds { balance, requested }) => {
                warn!(
                    account_no = %new.account_no,
                    balance = %format_cents(balance),
                    requested = %format_cents(requested),
                    "withdrawal rejected"
                );
                Err(AppError::InsufficientFunds {
                    account_no: new.account_no,
                    balance,
                    requested,
                })
            }
            Err(BalanceError::Overflow { balance, amount }) => {
                warn!(
                    account_no = %new.account_no,
                    balance = %format_cents(balance),
                    amount = %format_cents(amount),
                    "deposit rejected, balance too large"
                );
                Err(AppError::Validation(format!(
                    "resulting balance is too large (current balance {}, amount {})",
                    format_cents(balance),
                    format_cents(amount)
                )))
            }
        }
    }

    // ========================
    // Listing and editing
    // ========================

    /// All transactions, most recent first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    /// All transactions in the order they were recorded.
    pub async fn list_transactions_chronological(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions_chronological().await?)
    }

    /// Get a single transaction.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        self.repo
            .get_transaction(id)
            .await?
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// Overwrite type, amount and date of an existing transaction.
    ///
    /// Account, holder and the balance snapshot are left as they were, and no
    /// other row is recomputed. Run [`LedgerService::check_integrity`] to see
    /// the drift this may introduce.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        transaction_type: TransactionType,
        amount: &str,
        date: &str,
    ) -> Result<Transaction, AppError> {
        let mut transaction = self.get_transaction(id).await?;
        let amount_cents = parse_positive_amount(amount)?;

        if !self
            .repo
            .update_transaction(id, transaction_type, amount_cents, date)
            .await?
        {
            return Err(AppError::TransactionNotFound(id));
        }

        transaction.transaction_type = transaction_type;
        transaction.amount_cents = amount_cents;
        transaction.date = date.to_string();

        info!(
            id,
            kind = %transaction_type,
            amount = %format_cents(amount_cents),
            "transaction updated"
        );
        Ok(transaction)
    }

    /// Permanently remove a transaction and return what was removed.
    /// Balances of the remaining rows are not touched.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        let transaction = self.get_transaction(id).await?;

        if !self.repo.delete_transaction(id).await? {
            return Err(AppError::TransactionNotFound(id));
        }

        info!(id, account_no = %transaction.account_no, "transaction deleted");
        Ok(transaction)
    }

    // ========================
    // Integrity
    // ========================

    /// Replay the ledger and report rows whose balance snapshot has drifted.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let transactions = self.repo.list_transactions_chronological().await?;
        let report = build_integrity_report(&transactions);
        if !report.is_ok() {
            warn!(
                drifts = report.drifts.len(),
                invalid_amounts = report.invalid_amounts.len(),
                overdrawn = report.overdrawn_accounts.len(),
                "ledger inconsistencies found"
            );
        }
        Ok(report)
    }
}
