use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

use crate::application::LedgerService;
use crate::domain::{Transaction, format_cents};

/// Output formats supported by `export`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", s),
        }
    }
}

/// Full ledger dump used by the JSON export.
///
/// Amounts stay as exact integer cents (`amount_cents`, `balance_cents`), while
/// the CSV export renders the same values as two-decimal strings for spreadsheets.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub transactions: Vec<Transaction>,
}

/// Exporter for writing the ledger out in portable formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export in the requested format, returning the number of transactions written.
    pub async fn export<W: Write>(&self, format: ExportFormat, writer: W) -> Result<usize> {
        match format {
            ExportFormat::Csv => self.export_transactions_csv(writer).await,
            ExportFormat::Json => self.export_full_json(writer).await,
        }
    }

    /// Export transactions to CSV, oldest first, amounts as decimals.
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.service.list_transactions_chronological().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "account_no",
            "holder_name",
            "transaction_type",
            "amount",
            "balance",
            "date",
        ])?;

        for transaction in &transactions {
            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.account_no.clone(),
                transaction.holder_name.clone(),
                transaction.transaction_type.to_string(),
                format_cents(transaction.amount_cents),
                format_cents(transaction.balance_cents),
                transaction.date.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export every transaction as a single JSON document.
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            transactions: self.service.list_transactions_chronological().await?,
        };

        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        Ok(snapshot.transactions.len())
    }
}
