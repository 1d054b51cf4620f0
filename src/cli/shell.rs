use anyhow::Result;
use std::io::{BufRead, Write};

use crate::application::{AppError, LedgerService};
use crate::domain::{TransactionId, TransactionRequest, TransactionType, format_cents};

use super::{confirm, print_recorded, print_transaction_detail, print_transactions};

const MENU: &str = "\
BankEase
  1) Deposit
  2) Withdraw
  3) Check balance
  4) View all transactions
  5) Update a transaction
  6) Delete a transaction
  q) Quit";

/// Interactive menu over any line-based input and output.
///
/// Store errors are printed and the menu comes back, so every failed action
/// can be retried. End of input ends the session.
pub struct Shell<'a, R, W> {
    service: &'a LedgerService,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(service: &'a LedgerService, input: R, out: W) -> Self {
        Self {
            service,
            input,
            out,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", MENU)?;

            let Some(choice) = self.prompt("Choose an option")? else {
                break;
            };

            let outcome = match choice.to_lowercase().as_str() {
                "1" | "deposit" => self.record(TransactionType::Deposit).await?,
                "2" | "withdraw" => self.record(TransactionType::Withdrawal).await?,
                "3" | "balance" => self.check_balance().await?,
                "4" | "list" => self.view_transactions().await?,
                "5" | "update" => self.update().await?,
                "6" | "delete" => self.delete().await?,
                "q" | "quit" | "exit" => break,
                other => {
                    writeln!(self.out, "Unknown option '{}'.", other)?;
                    Step::Continue
                }
            };

            if let Step::Stop = outcome {
                break;
            }
        }

        writeln!(self.out, "Goodbye.")?;
        Ok(())
    }

    async fn record(&mut self, transaction_type: TransactionType) -> Result<Step> {
        let Some(request) = self.read_form()? else {
            return Ok(Step::Stop);
        };

        let result = match transaction_type {
            TransactionType::Deposit => self.service.record_deposit(&request).await,
            TransactionType::Withdrawal => self.service.record_withdrawal(&request).await,
        };

        match result {
            Ok(transaction) => print_recorded(&mut self.out, &transaction)?,
            Err(AppError::InsufficientFunds { balance, .. }) => writeln!(
                self.out,
                "Insufficient funds. Your balance is {}",
                format_cents(balance)
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(Step::Continue)
    }

    async fn check_balance(&mut self) -> Result<Step> {
        let Some(account_no) = self.prompt("Account Number")? else {
            return Ok(Step::Stop);
        };

        match self.service.get_current_balance(&account_no).await {
            Ok(balance) => {
                writeln!(self.out, "Account No: {}", account_no)?;
                writeln!(self.out, "Current Balance: {}", format_cents(balance))?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(Step::Continue)
    }

    async fn view_transactions(&mut self) -> Result<Step> {
        match self.service.list_transactions().await {
            Ok(transactions) => print_transactions(&mut self.out, &transactions)?,
            Err(e) => self.report(&e)?,
        }
        Ok(Step::Continue)
    }

    async fn update(&mut self) -> Result<Step> {
        let Some(id) = self.prompt_id()? else {
            return Ok(Step::Stop);
        };
        let Some(id) = id else {
            return Ok(Step::Continue);
        };

        let current = match self.service.get_transaction(id).await {
            Ok(transaction) => transaction,
            Err(e) => {
                self.report(&e)?;
                return Ok(Step::Continue);
            }
        };
        print_transaction_detail(&mut self.out, &current)?;
        writeln!(self.out, "Press enter to keep a value.")?;

        let Some(type_input) =
            self.prompt(&format!("Transaction Type [{}]", current.transaction_type))?
        else {
            return Ok(Step::Stop);
        };
        let transaction_type = if type_input.is_empty() {
            current.transaction_type
        } else {
            match type_input.parse::<TransactionType>() {
                Ok(t) => t,
                Err(e) => {
                    writeln!(self.out, "Error: {}", e)?;
                    return Ok(Step::Continue);
                }
            }
        };

        let current_amount = format_cents(current.amount_cents);
        let Some(amount) = self.prompt(&format!("Amount [{}]", current_amount))? else {
            return Ok(Step::Stop);
        };
        let amount = if amount.is_empty() { current_amount } else { amount };

        let Some(date) = self.prompt(&format!("Date [{}]", current.date))? else {
            return Ok(Step::Stop);
        };
        let date = if date.is_empty() { current.date } else { date };

        match self
            .service
            .update_transaction(id, transaction_type, &amount, &date)
            .await
        {
            Ok(_) => writeln!(self.out, "Transaction updated successfully!")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Step::Continue)
    }

    async fn delete(&mut self) -> Result<Step> {
        let Some(id) = self.prompt_id()? else {
            return Ok(Step::Stop);
        };
        let Some(id) = id else {
            return Ok(Step::Continue);
        };

        match self.service.get_transaction(id).await {
            Ok(transaction) => print_transaction_detail(&mut self.out, &transaction)?,
            Err(e) => {
                self.report(&e)?;
                return Ok(Step::Continue);
            }
        }

        if !confirm(
            &mut self.input,
            &mut self.out,
            "Are you sure you want to delete this transaction?",
        )? {
            writeln!(self.out, "Delete cancelled.")?;
            return Ok(Step::Continue);
        }

        match self.service.delete_transaction(id).await {
            Ok(_) => writeln!(self.out, "Transaction deleted successfully.")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Step::Continue)
    }

    /// Collect the four form fields. `None` means input ended.
    fn read_form(&mut self) -> Result<Option<TransactionRequest>> {
        let Some(account_no) = self.prompt("Account Number")? else {
            return Ok(None);
        };
        let Some(holder_name) = self.prompt("Account Holder Name")? else {
            return Ok(None);
        };
        let Some(amount) = self.prompt("Amount")? else {
            return Ok(None);
        };
        let Some(date) = self.prompt("Date (YYYY-MM-DD)")? else {
            return Ok(None);
        };

        Ok(Some(TransactionRequest::new(account_no, holder_name, amount, date)))
    }

    /// Outer `None` is end of input, inner `None` an unparseable id.
    fn prompt_id(&mut self) -> Result<Option<Option<TransactionId>>> {
        let Some(raw) = self.prompt("Transaction ID")? else {
            return Ok(None);
        };
        match raw.parse::<TransactionId>() {
            Ok(id) => Ok(Some(Some(id))),
            Err(_) => {
                writeln!(self.out, "Error: transaction ID must be a number.")?;
                Ok(Some(None))
            }
        }
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{}: ", label)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report(&mut self, error: &AppError) -> Result<()> {
        writeln!(self.out, "Error: {}", error)?;
        Ok(())
    }
}

enum Step {
    Continue,
    Stop,
}
