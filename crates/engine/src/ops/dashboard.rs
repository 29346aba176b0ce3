use std::sync::Arc;

use api_types::{
    account::AccountView, budget::BudgetSummary, dashboard::DashboardSnapshot,
    transaction::TransactionView,
};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};

use crate::{MoneyCents, ResultEngine, User};

use super::{Engine, store};

/// Page size of the recent transactions list.
pub const RECENT_TRANSACTIONS_LIMIT: u64 = 50;

/// A calendar month in UTC, first through last day inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthRange {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl MonthRange {
    pub fn containing(at: DateTime<Utc>) -> Self {
        let today = at.date_naive();
        let first_day = today - Days::new(u64::from(today.day0()));
        let last_day = first_day + Months::new(1) - Days::new(1);
        Self {
            first_day,
            last_day,
        }
    }

    /// Midnight of the first day.
    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Midnight after the last day, so the whole last day is included.
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        (self.last_day + Days::new(1)).and_time(NaiveTime::MIN).and_utc()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at < self.end_exclusive()
    }
}

impl Engine {
    /// Aggregated dashboard data of the user owning `external_id`.
    ///
    /// The snapshot is memoized whole for the dashboard TTL. Every facet
    /// accessor below goes through here so all of them share one cache entry.
    pub async fn dashboard_snapshot(&self, external_id: &str) -> ResultEngine<Arc<DashboardSnapshot>> {
        let key = external_id.to_string();
        self.dashboards
            .get_or_try_insert_with(&key, || async {
                let user = self.lookup_user(external_id).await?;
                tracing::debug!(external_id, "dashboard cache miss");
                self.build_snapshot(&user, Utc::now()).await
            })
            .await
    }

    pub async fn user_accounts(&self, external_id: &str) -> ResultEngine<Vec<AccountView>> {
        Ok(self.dashboard_snapshot(external_id).await?.accounts.clone())
    }

    pub async fn recent_transactions(&self, external_id: &str) -> ResultEngine<Vec<TransactionView>> {
        Ok(self.dashboard_snapshot(external_id).await?.transactions.clone())
    }

    pub async fn budget_summary(&self, external_id: &str) -> ResultEngine<BudgetSummary> {
        Ok(self.dashboard_snapshot(external_id).await?.budget_summary())
    }

    /// Drop the memoized dashboard so the next read goes to the store.
    pub fn invalidate_dashboard(&self, external_id: &str) {
        self.dashboards.invalidate(&external_id.to_string());
    }

    async fn build_snapshot(&self, user: &User, now: DateTime<Utc>) -> ResultEngine<DashboardSnapshot> {
        let db = &self.database;

        let (accounts, transactions, budget) = tokio::try_join!(
            store::list_accounts(db, user.id),
            store::list_recent_transactions(db, user.id, RECENT_TRANSACTIONS_LIMIT),
            store::find_first_budget(db, user.id),
        )?;

        let default_account = accounts
            .iter()
            .map(|(account, _)| account)
            .find(|account| account.is_default);

        let current_expenses = match (default_account, &budget) {
            (Some(account), Some(_)) => {
                store::aggregate_expense_sum(db, user.id, account.id, MonthRange::containing(now))
                    .await?
            }
            _ => MoneyCents::ZERO,
        };

        Ok(DashboardSnapshot {
            accounts: accounts
                .iter()
                .map(|(account, count)| account.view(*count))
                .collect(),
            transactions: transactions.iter().map(|tx| tx.view()).collect(),
            budget: budget.as_ref().map(|budget| budget.view()),
            current_expenses: current_expenses.to_f64(),
        })
    }
}
