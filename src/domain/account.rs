use serde::Serialize;

use super::Cents;

/// An account as seen through its transactions. There is no account table;
/// accounts exist only because rows reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub account_no: String,
    /// Holder name on the most recent row
    pub holder_name: String,
    /// Snapshot balance of the most recent row
    pub balance_cents: Cents,
    pub transaction_count: i64,
}
