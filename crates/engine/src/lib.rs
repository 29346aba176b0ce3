//! Domain core of the finance dashboard.
//!
//! [`Engine`] owns the database connection and the two read caches (users by
//! external id, dashboard snapshots by external id). Request admission lives
//! in [`admission`] and is independent from the store.

pub use accounts::{Account, AccountType};
pub use admission::{
    AdmissionProvider, AdmissionRequest, CallerContext, Decision, DenyReason, TokenBucketConfig,
    TokenBucketGate,
};
pub use budgets::Budget;
pub use cache::{CacheStats, TtlCache};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{CacheSettings, Engine, EngineBuilder, MonthRange, RECENT_TRANSACTIONS_LIMIT};
pub use transactions::{Transaction, TransactionType};
pub use users::{NewUser, User};

pub mod accounts;
pub mod admission;
pub mod budgets;
mod cache;
mod error;
mod money;
mod ops;
pub mod transactions;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
