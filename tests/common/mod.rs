// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use bankease::application::LedgerService;
use bankease::domain::{Transaction, TransactionRequest};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Build a request with a fixed holder name
pub fn request(account: &str, amount: &str, date: &str) -> TransactionRequest {
    TransactionRequest::new(account, "Alice", amount, date)
}

/// Test fixture: the opening scenario used across tests
pub struct StandardLedger;

impl StandardLedger {
    /// Account 001: deposit 500 then withdraw 200 (balance 300).
    /// Account 002: deposit 1000 (balance 1000).
    pub async fn create(service: &LedgerService) -> Result<Vec<Transaction>> {
        let first = service
            .record_deposit(&request("001", "500", "2024-01-01"))
            .await?;
        let second = service
            .record_deposit(&TransactionRequest::new("002", "Bob", "1000", "2024-01-01"))
            .await?;
        let third = service
            .record_withdrawal(&request("001", "200", "2024-01-02"))
            .await?;
        Ok(vec![first, second, third])
    }
}
