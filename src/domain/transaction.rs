use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Cents, ParseAmountError, parse_cents};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money paid into the account
    Deposit,
    /// Money taken out of the account
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
        }
    }

    /// Signed effect of `amount` on the running balance.
    pub fn signed(&self, amount: Cents) -> Cents {
        match self {
            TransactionType::Deposit => amount,
            TransactionType::Withdrawal => -amount,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" | "d" => Ok(TransactionType::Deposit),
            "withdrawal" | "withdraw" | "w" => Ok(TransactionType::Withdrawal),
            _ => Err(ParseTransactionTypeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTransactionTypeError(pub String);

impl fmt::Display for ParseTransactionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown transaction type '{}' (expected Deposit or Withdrawal)",
            self.0
        )
    }
}

impl std::error::Error for ParseTransactionTypeError {}

/// A single deposit or withdrawal row.
///
/// `balance_cents` is the account's running balance right after this row was
/// recorded. It is a snapshot: later edits or deletes of sibling rows never
/// touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_no: String,
    /// Informational only, never checked against `account_no`
    pub holder_name: String,
    pub transaction_type: TransactionType,
    /// Always positive
    pub amount_cents: Cents,
    pub balance_cents: Cents,
    /// Free-form, not parsed as a calendar date
    pub date: String,
}

/// Raw form input for a deposit or withdrawal, exactly as the user typed it.
#[derive(Debug, Clone, Default)]
pub struct TransactionRequest {
    pub account_no: String,
    pub holder_name: String,
    pub amount: String,
    pub date: String,
}

impl TransactionRequest {
    pub fn new(
        account_no: impl Into<String>,
        holder_name: impl Into<String>,
        amount: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            account_no: account_no.into(),
            holder_name: holder_name.into(),
            amount: amount.into(),
            date: date.into(),
        }
    }

    /// Check required fields and parse the amount.
    pub fn validate(&self) -> Result<NewTransaction, RequestError> {
        let account_no = required("account number", &self.account_no)?;
        let holder_name = required("account holder name", &self.holder_name)?;
        let amount = required("amount", &self.amount)?;
        let date = required("date", &self.date)?;

        let amount_cents = parse_positive_amount(&amount)?;

        Ok(NewTransaction {
            account_no,
            holder_name,
            amount_cents,
            date,
        })
    }
}

/// A request that passed validation; the balance is still to be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub account_no: String,
    pub holder_name: String,
    pub amount_cents: Cents,
    pub date: String,
}

/// Parse an amount that must be strictly positive.
pub fn parse_positive_amount(input: &str) -> Result<Cents, RequestError> {
    let cents = parse_cents(input).map_err(RequestError::InvalidAmount)?;
    if cents <= 0 {
        return Err(RequestError::NonPositiveAmount(input.trim().to_string()));
    }
    Ok(cents)
}

fn required(field: &'static str, value: &str) -> Result<String, RequestError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RequestError::MissingField(field));
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    MissingField(&'static str),
    InvalidAmount(ParseAmountError),
    NonPositiveAmount(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingField(field) => write!(f, "{} is required", field),
            RequestError::InvalidAmount(e) => write!(f, "amount must be numeric: {}", e),
            RequestError::NonPositiveAmount(s) => {
                write!(f, "amount must be greater than zero (got {})", s)
            }
        }
    }
}

impl std::error::Error for RequestError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_parsing() {
        assert_eq!("Deposit".parse(), Ok(TransactionType::Deposit));
        assert_eq!("withdrawal".parse(), Ok(TransactionType::Withdrawal));
        assert_eq!(" W ".parse(), Ok(TransactionType::Withdrawal));
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(TransactionType::Deposit.signed(500), 500);
        assert_eq!(TransactionType::Withdrawal.signed(500), -500);
    }

    #[test]
    fn test_validate_trims_and_parses() {
        let request = TransactionRequest::new(" 001 ", "Alice", "500", "2024-01-01");
        let new = request.validate().unwrap();
        assert_eq!(new.account_no, "001");
        assert_eq!(new.amount_cents, 50000);
        assert_eq!(new.date, "2024-01-01");
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let request = TransactionRequest::new("001", "  ", "", "2024-01-01");
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingField("account holder name"))
        );
    }

    #[test]
    fn test_validate_rejects_non_numeric_amount() {
        let request = TransactionRequest::new("001", "Alice", "five hundred", "today");
        assert!(matches!(
            request.validate(),
            Err(RequestError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_and_negative() {
        for amount in ["0", "0.00", "-10"] {
            let request = TransactionRequest::new("001", "Alice", amount, "today");
            assert!(matches!(
                request.validate(),
                Err(RequestError::NonPositiveAmount(_))
            ));
        }
    }

    #[test]
    fn test_date_is_free_form() {
        let request = TransactionRequest::new("001", "Alice", "1", "sometime next week");
        assert_eq!(request.validate().unwrap().date, "sometime next week");
    }
}
