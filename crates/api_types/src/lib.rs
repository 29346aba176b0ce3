use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum AccountType {
        #[default]
        Current,
        Savings,
    }

    /// Request body for creating an account.
    ///
    /// `balance` is kept as text on the wire and validated by the engine, so
    /// a malformed value surfaces as a validation error instead of a decoding
    /// failure.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountNew {
        pub name: String,
        #[serde(rename = "type", default)]
        pub account_type: AccountType,
        pub balance: String,
        #[serde(default)]
        pub is_default: bool,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountView {
        pub id: String,
        pub user_id: String,
        pub name: String,
        #[serde(rename = "type")]
        pub account_type: AccountType,
        pub balance: f64,
        pub is_default: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub transaction_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreated {
        pub success: bool,
        pub data: AccountView,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionType {
        Income,
        Expense,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: String,
        pub user_id: String,
        pub account_id: String,
        #[serde(rename = "type")]
        pub transaction_type: TransactionType,
        /// Signed amount as a float (converted from exact cents).
        pub amount: f64,
        pub description: Option<String>,
        pub category: Option<String>,
        pub date: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetView {
        pub id: String,
        pub user_id: String,
        pub amount: f64,
        pub last_alert_sent: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    /// Budget facet of the dashboard.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetSummary {
        pub budget: Option<BudgetView>,
        pub current_expenses: f64,
    }
}

pub mod dashboard {
    use super::*;

    use super::account::AccountView;
    use super::budget::{BudgetSummary, BudgetView};
    use super::transaction::TransactionView;

    /// Aggregated point-in-time view of a user's dashboard.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardSnapshot {
        pub accounts: Vec<AccountView>,
        pub transactions: Vec<TransactionView>,
        pub budget: Option<BudgetView>,
        pub current_expenses: f64,
    }

    impl DashboardSnapshot {
        pub fn budget_summary(&self) -> BudgetSummary {
            BudgetSummary {
                budget: self.budget.clone(),
                current_expenses: self.current_expenses,
            }
        }
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub external_id: String,
        pub email: String,
        pub name: Option<String>,
        pub image_url: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod health {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CacheStatsView {
        pub size: usize,
        pub hits: u64,
        pub misses: u64,
        pub evictions: u64,
        pub hit_rate: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Health {
        pub status: String,
        pub user_cache: CacheStatsView,
        pub dashboard_cache: CacheStatsView,
        /// Read requests that degraded to an empty result since start.
        pub degraded_reads: u64,
    }
}
