use serde::Serialize;
use std::collections::BTreeMap;

use super::{Cents, Transaction, TransactionId, TransactionType};

/// Compute the balance that follows applying a transaction to `current`.
/// Withdrawals may not take the balance below zero, and the result must fit in `Cents`.
pub fn next_balance(
    current: Cents,
    transaction_type: TransactionType,
    amount: Cents,
) -> Result<Cents, BalanceError> {
    if transaction_type == TransactionType::Withdrawal && amount > current {
        return Err(BalanceError::InsufficientFunds {
            balance: current,
            requested: amount,
        });
    }
    current
        .checked_add(transaction_type.signed(amount))
        .ok_or(BalanceError::Overflow {
            balance: current,
            amount,
        })
}

/// Why a deposit or withdrawal could not be applied to the current balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceError {
    InsufficientFunds { balance: Cents, requested: Cents },
    Overflow { balance: Cents, amount: Cents },
}

impl std::fmt::Display for BalanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceError::InsufficientFunds { balance, requested } => write!(
                f,
                "Withdrawal of {} cents exceeds balance of {} cents",
                requested, balance
            ),
            BalanceError::Overflow { balance, amount } => write!(
                f,
                "Adding {} cents to a balance of {} cents is too large",
                amount, balance
            ),
        }
    }
}

impl std::error::Error for BalanceError {}

/// A row whose stored snapshot no longer matches a replay of its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    pub id: TransactionId,
    pub account_no: String,
    pub stored: Cents,
    pub expected: Cents,
}

/// Result of replaying the ledger against the stored balance snapshots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub transaction_count: usize,
    pub account_count: usize,
    pub drifts: Vec<BalanceDrift>,
    pub invalid_amounts: Vec<TransactionId>,
    /// Accounts whose replayed balance dips below zero at some row
    pub overdrawn_accounts: Vec<String>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.drifts.is_empty()
            && self.invalid_amounts.is_empty()
            && self.overdrawn_accounts.is_empty()
    }
}

/// Replay every account in id order and compare each row's snapshot with the
/// running sum of signed amounts. Input order does not matter.
pub fn build_integrity_report(transactions: &[Transaction]) -> IntegrityReport {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| t.id);

    let mut running: BTreeMap<&str, Cents> = BTreeMap::new();
    let mut report = IntegrityReport {
        transaction_count: transactions.len(),
        ..Default::default()
    };

    for transaction in ordered {
        if transaction.amount_cents <= 0 {
            report.invalid_amounts.push(transaction.id);
        }

        let signed = transaction.transaction_type.signed(transaction.amount_cents);
        let balance = running.entry(transaction.account_no.as_str()).or_insert(0);
        *balance = balance.saturating_add(signed);

        if *balance < 0 && !report.overdrawn_accounts.contains(&transaction.account_no) {
            report.overdrawn_accounts.push(transaction.account_no.clone());
        }

        if transaction.balance_cents != *balance {
            report.drifts.push(BalanceDrift {
                id: transaction.id,
                account_no: transaction.account_no.clone(),
                stored: transaction.balance_cents,
                expected: *balance,
            });
        }
    }

    report.account_count = running.len();
    report
}
