mod common;

use anyhow::Result;
use bankease::application::{AppError, LedgerService};
use bankease::domain::{TransactionRequest, TransactionType};
use common::{StandardLedger, request, test_service};

#[tokio::test]
async fn test_deposit_withdraw_and_rejected_withdrawal() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let deposit = service
        .record_deposit(&request("001", "500", "2024-01-01"))
        .await?;
    assert_eq!(deposit.balance_cents, 50000);
    assert_eq!(deposit.transaction_type, TransactionType::Deposit);

    let withdrawal = service
        .record_withdrawal(&request("001", "200", "2024-01-02"))
        .await?;
    assert_eq!(withdrawal.balance_cents, 30000);
    assert_eq!(withdrawal.transaction_type, TransactionType::Withdrawal);

    let result = service
        .record_withdrawal(&request("001", "1000", "2024-01-03"))
        .await;
    match result {
        Err(AppError::InsufficientFunds {
            account_no,
            balance,
            requested,
        }) => {
            assert_eq!(account_no, "001");
            assert_eq!(balance, 30000);
            assert_eq!(requested, 100000);
        }
        other => panic!("expected insufficient funds, got {:?}", other),
    }

    assert_eq!(service.get_current_balance("001").await?, 30000);
    assert_eq!(service.list_transactions().await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_unseen_account_starts_at_zero() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert_eq!(service.get_current_balance("999").await?, 0);

    let deposit = service
        .record_deposit(&request("999", "100", "2024-03-01"))
        .await?;
    assert_eq!(deposit.balance_cents, 10000);

    Ok(())
}

#[tokio::test]
async fn test_withdrawal_on_empty_account_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .record_withdrawal(&request("404", "0.01", "2024-01-01"))
        .await;
    assert!(matches!(
        result,
        Err(AppError::InsufficientFunds { balance: 0, .. })
    ));
    assert!(service.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_withdrawing_full_balance_is_allowed() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .record_deposit(&request("001", "250.50", "2024-01-01"))
        .await?;
    let withdrawal = service
        .record_withdrawal(&request("001", "250.50", "2024-01-02"))
        .await?;

    assert_eq!(withdrawal.balance_cents, 0);
    assert_eq!(service.get_current_balance("001").await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_latest_balance_equals_signed_sum() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let steps = [
        (TransactionType::Deposit, "100.25"),
        (TransactionType::Deposit, "49.75"),
        (TransactionType::Withdrawal, "30"),
        (TransactionType::Deposit, "0.10"),
        (TransactionType::Withdrawal, "120.10"),
        (TransactionType::Deposit, "7"),
    ];

    let mut expected = 0;
    for (kind, amount) in steps {
        let req = request("001", amount, "2024-01-01");
        let transaction = match kind {
            TransactionType::Deposit => service.record_deposit(&req).await?,
            TransactionType::Withdrawal => service.record_withdrawal(&req).await?,
        };
        expected += kind.signed(transaction.amount_cents);
        assert_eq!(transaction.balance_cents, expected);
    }

    assert_eq!(expected, 700);
    assert_eq!(service.get_current_balance("001").await?, expected);

    Ok(())
}

#[tokio::test]
async fn test_accounts_are_independent() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardLedger::create(&service).await?;

    assert_eq!(service.get_current_balance("001").await?, 30000);
    assert_eq!(service.get_current_balance("002").await?, 100000);

    // Account 002 has money, account 001 does not have enough
    let result = service
        .record_withdrawal(&request("001", "500", "2024-01-05"))
        .await;
    assert!(matches!(result, Err(AppError::InsufficientFunds { .. })));

    Ok(())
}

#[tokio::test]
async fn test_missing_fields_are_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let cases = [
        TransactionRequest::new("", "Alice", "10", "2024-01-01"),
        TransactionRequest::new("001", "", "10", "2024-01-01"),
        TransactionRequest::new("001", "Alice", "", "2024-01-01"),
        TransactionRequest::new("001", "Alice", "10", "   "),
    ];

    for req in &cases {
        let result = service.record_deposit(req).await;
        assert!(
            matches!(result, Err(AppError::Validation(_))),
            "expected validation error for {:?}",
            req
        );
    }
    assert!(service.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_non_numeric_amount_is_format_error() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .record_deposit(&request("001", "ten", "2024-01-01"))
        .await;
    assert!(matches!(result, Err(AppError::Format(_))));

    let result = service
        .record_withdrawal(&request("001", "1,000", "2024-01-01"))
        .await;
    assert!(matches!(result, Err(AppError::Format(_))));

    Ok(())
}

#[tokio::test]
async fn test_non_positive_amount_is_validation_error() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .record_deposit(&request("001", "-50", "2024-01-01"))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn test_blank_account_balance_query_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.get_current_balance("  ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn test_list_is_most_recent_first_with_increasing_ids() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let recorded = StandardLedger::create(&service).await?;

    assert!(recorded[0].id < recorded[1].id);
    assert!(recorded[1].id < recorded[2].id);

    let listed = service.list_transactions().await?;
    let ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![recorded[2].id, recorded[1].id, recorded[0].id]);
    assert_eq!(listed[0], recorded[2]);

    Ok(())
}

#[tokio::test]
async fn test_date_is_stored_verbatim() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let transaction = service
        .record_deposit(&request("001", "5", "31st of Feb"))
        .await?;
    assert_eq!(service.get_transaction(transaction.id).await?.date, "31st of Feb");

    Ok(())
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let first = service
        .record_deposit(&request("001", "10", "2024-01-01"))
        .await?;
    service.delete_transaction(first.id).await?;

    let second = service
        .record_deposit(&request("001", "10", "2024-01-02"))
        .await?;
    assert!(second.id > first.id);

    Ok(())
}

#[tokio::test]
async fn test_ledger_persists_across_reopen() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("bank.db");
    let path = db_path.to_str().unwrap();

    {
        let service = LedgerService::init(path).await?;
        service
            .record_deposit(&request("001", "500", "2024-01-01"))
            .await?;
    }

    let service = LedgerService::init(path).await?;
    assert_eq!(service.get_current_balance("001").await?, 50000);
    assert_eq!(service.list_transactions().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_list_accounts_uses_latest_row() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardLedger::create(&service).await?;
    service
        .record_deposit(&TransactionRequest::new("001", "Alice Smith", "1", "2024-01-03"))
        .await?;

    let accounts = service.list_accounts().await?;
    assert_eq!(accounts.len(), 2);

    assert_eq!(accounts[0].account_no, "001");
    assert_eq!(accounts[0].holder_name, "Alice Smith");
    assert_eq!(accounts[0].balance_cents, 30100);
    assert_eq!(accounts[0].transaction_count, 3);

    assert_eq!(accounts[1].account_no, "002");
    assert_eq!(accounts[1].holder_name, "Bob");
    assert_eq!(accounts[1].balance_cents, 100000);
    assert_eq!(accounts[1].transaction_count, 1);

    Ok(())
}

#[tokio::test]
async fn test_deposit_that_would_overflow_balance_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let deposit = service
        .record_deposit(&request("001", "92233720368547758", "2024-01-01"))
        .await?;
    assert_eq!(deposit.balance_cents, 9223372036854775800);

    let result = service
        .record_deposit(&request("001", "1", "2024-01-02"))
        .await;
    match result {
        Err(AppError::Validation(message)) => assert!(message.contains("too large")),
        other => panic!("expected validation error, got {:?}", other),
    }

    assert_eq!(service.get_current_balance("001").await?, 9223372036854775800);
    assert_eq!(service.list_transactions().await?.len(), 1);
    assert!(service.check_integrity().await?.is_ok());

    Ok(())
}
