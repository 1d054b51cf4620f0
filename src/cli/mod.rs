mod shell;

pub use shell::Shell;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::domain::{
    AccountSummary, IntegrityReport, Transaction, TransactionId, TransactionRequest,
    TransactionType, format_cents,
};
use crate::io::{ExportFormat, Exporter};

/// BankEase - deposit and withdrawal ledger
#[derive(Parser)]
#[command(name = "bankease")]
#[command(about = "Record deposits and withdrawals per account and keep running balances")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "BANKEASE_DB",
        default_value = "bank_transactions.db",
        global = true
    )]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run a single command; omit to start the interactive menu
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deposit money into an account
    Deposit(FormArgs),

    /// Withdraw money from an account
    Withdraw(FormArgs),

    /// Show the current balance of an account
    Balance {
        /// Account number
        account: String,
    },

    /// List all transactions, most recent first
    List,

    /// List every account with its latest balance
    Accounts,

    /// Show a single transaction
    Show {
        /// Transaction ID
        id: TransactionId,
    },

    /// Change the type, amount and date of a transaction
    Update {
        /// Transaction ID
        id: TransactionId,

        /// Deposit or Withdrawal
        #[arg(short = 't', long = "type")]
        transaction_type: String,

        /// New amount (e.g., "50.00" or "50")
        #[arg(short, long)]
        amount: String,

        /// New date (free-form, e.g. YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: TransactionId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Replay the ledger and report balance snapshots that no longer add up
    Check,

    /// Export all transactions
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// The four fields of the deposit/withdrawal form
#[derive(clap::Args)]
pub struct FormArgs {
    /// Account number
    #[arg(short, long)]
    pub account: String,

    /// Account holder name
    #[arg(short, long)]
    pub name: String,

    /// Amount (e.g., "50.00" or "50")
    #[arg(long)]
    pub amount: String,

    /// Date (free-form, e.g. YYYY-MM-DD)
    #[arg(long)]
    pub date: String,
}

impl From<FormArgs> for TransactionRequest {
    fn from(args: FormArgs) -> Self {
        TransactionRequest::new(args.account, args.name, args.amount, args.date)
    }
}

impl Cli {
    /// Install the stderr log subscriber. `RUST_LOG` takes precedence over `--verbose`.
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "bankease=debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    pub async fn run(self) -> Result<()> {
        let service = LedgerService::init(&self.database)
            .await
            .with_context(|| format!("Failed to open database {}", self.database))?;

        let Some(command) = self.command else {
            let stdin = io::stdin();
            let mut shell = Shell::new(&service, stdin.lock(), io::stdout());
            return shell.run().await;
        };

        let mut out = io::stdout().lock();

        match command {
            Commands::Deposit(form) => {
                let transaction = service.record_deposit(&form.into()).await?;
                print_recorded(&mut out, &transaction)?;
            }

            Commands::Withdraw(form) => {
                let transaction = service.record_withdrawal(&form.into()).await?;
                print_recorded(&mut out, &transaction)?;
            }

            Commands::Balance { account } => {
                let balance = service.get_current_balance(&account).await?;
                writeln!(out, "Account No: {}", account.trim())?;
                writeln!(out, "Current Balance: {}", format_cents(balance))?;
            }

            Commands::List => {
                let transactions = service.list_transactions().await?;
                print_transactions(&mut out, &transactions)?;
            }

            Commands::Accounts => {
                let accounts = service.list_accounts().await?;
                print_accounts(&mut out, &accounts)?;
            }

            Commands::Show { id } => {
                let transaction = service.get_transaction(id).await?;
                print_transaction_detail(&mut out, &transaction)?;
            }

            Commands::Update {
                id,
                transaction_type,
                amount,
                date,
            } => {
                let transaction_type: TransactionType = transaction_type.parse()?;
                let transaction = service
                    .update_transaction(id, transaction_type, &amount, &date)
                    .await?;
                writeln!(out, "Transaction {} updated successfully.", transaction.id)?;
            }

            Commands::Delete { id, yes } => {
                let transaction = service.get_transaction(id).await?;
                print_transaction_detail(&mut out, &transaction)?;

                let confirmed = yes || {
                    let stdin = io::stdin();
                    let mut input = stdin.lock();
                    confirm(
                        &mut input,
                        &mut out,
                        "Are you sure you want to delete this transaction?",
                    )?
                };

                if confirmed {
                    service.delete_transaction(id).await?;
                    writeln!(out, "Transaction deleted successfully.")?;
                } else {
                    writeln!(out, "Delete cancelled.")?;
                }
            }

            Commands::Check => {
                let report = service.check_integrity().await?;
                print_integrity_report(&mut out, &report)?;
                if !report.is_ok() {
                    anyhow::bail!("Ledger integrity check failed");
                }
            }

            Commands::Export { format, output } => {
                let format: ExportFormat = format.parse()?;
                let exporter = Exporter::new(&service);

                match output {
                    Some(path) => {
                        let file = std::fs::File::create(&path)
                            .with_context(|| format!("Failed to create output file: {}", path))?;
                        let count = exporter.export(format, file).await?;
                        eprintln!("Exported {} transactions to {}", count, path);
                    }
                    None => {
                        exporter.export(format, &mut out).await?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Ask a yes/no question; anything but "y"/"yes" (including EOF) is a no.
pub(crate) fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> Result<bool> {
    write!(out, "{} [y/N]: ", question)?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub(crate) fn print_recorded<W: Write>(out: &mut W, transaction: &Transaction) -> io::Result<()> {
    let verb = match transaction.transaction_type {
        TransactionType::Deposit => "deposited",
        TransactionType::Withdrawal => "withdrawn",
    };
    writeln!(
        out,
        "{} {} successfully! (transaction {})",
        format_cents(transaction.amount_cents),
        verb,
        transaction.id
    )?;
    writeln!(out, "New Balance: {}", format_cents(transaction.balance_cents))
}

pub(crate) fn print_transactions<W: Write>(
    out: &mut W,
    transactions: &[Transaction],
) -> io::Result<()> {
    if transactions.is_empty() {
        return writeln!(out, "No transactions found.");
    }

    writeln!(
        out,
        "{:>6} {:<12} {:<20} {:<10} {:>12} {:>12}  {}",
        "ID", "ACCOUNT", "HOLDER", "TYPE", "AMOUNT", "BALANCE", "DATE"
    )?;
    writeln!(out, "{}", "-".repeat(90))?;
    for t in transactions {
        writeln!(
            out,
            "{:>6} {:<12} {:<20} {:<10} {:>12} {:>12}  {}",
            t.id,
            truncate(&t.account_no, 12),
            truncate(&t.holder_name, 20),
            t.transaction_type,
            format_cents(t.amount_cents),
            format_cents(t.balance_cents),
            t.date
        )?;
    }
    Ok(())
}

pub(crate) fn print_transaction_detail<W: Write>(out: &mut W, t: &Transaction) -> io::Result<()> {
    writeln!(out, "Transaction {}", t.id)?;
    writeln!(out, "  Account:  {}", t.account_no)?;
    writeln!(out, "  Holder:   {}", t.holder_name)?;
    writeln!(out, "  Type:     {}", t.transaction_type)?;
    writeln!(out, "  Amount:   {}", format_cents(t.amount_cents))?;
    writeln!(out, "  Balance:  {}", format_cents(t.balance_cents))?;
    writeln!(out, "  Date:     {}", t.date)
}

fn print_accounts<W: Write>(out: &mut W, accounts: &[AccountSummary]) -> io::Result<()> {
    if accounts.is_empty() {
        return writeln!(out, "No accounts found.");
    }

    writeln!(
        out,
        "{:<12} {:<20} {:>12} {:>6}",
        "ACCOUNT", "HOLDER", "BALANCE", "TXNS"
    )?;
    writeln!(out, "{}", "-".repeat(53))?;
    for account in accounts {
        writeln!(
            out,
            "{:<12} {:<20} {:>12} {:>6}",
            truncate(&account.account_no, 12),
            truncate(&account.holder_name, 20),
            format_cents(account.balance_cents),
            account.transaction_count
        )?;
    }
    Ok(())
}

fn print_integrity_report<W: Write>(out: &mut W, report: &IntegrityReport) -> io::Result<()> {
    writeln!(out, "Accounts:     {}", report.account_count)?;
    writeln!(out, "Transactions: {}", report.transaction_count)?;
    writeln!(out)?;

    if report.is_ok() {
        return writeln!(out, "Ledger is consistent.");
    }

    writeln!(out, "Issues found:")?;
    for drift in &report.drifts {
        writeln!(
            out,
            "  - transaction {} (account {}): stored balance {}, replayed {}",
            drift.id,
            drift.account_no,
            format_cents(drift.stored),
            format_cents(drift.expected)
        )?;
    }
    for id in &report.invalid_amounts {
        writeln!(out, "  - transaction {}: amount is not positive", id)?;
    }
    for account in &report.overdrawn_accounts {
        writeln!(out, "  - account {}: replayed balance goes negative", account)?;
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
