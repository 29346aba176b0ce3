use std::time::Duration;

use api_types::dashboard::DashboardSnapshot;
use sea_orm::DatabaseConnection;

use crate::{CacheStats, EngineError, ResultEngine, TtlCache, User};

mod accounts;
mod dashboard;
mod store;
mod users;

pub use dashboard::{MonthRange, RECENT_TRANSACTIONS_LIMIT};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Time-to-live of each memoized read.
#[derive(Clone, Copy, Debug)]
pub struct CacheSettings {
    /// User lookups by external id.
    pub user_ttl: Duration,
    /// Whole dashboard snapshots.
    pub dashboard_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            user_ttl: Duration::from_secs(5 * 60),
            dashboard_ttl: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    users: TtlCache<String, User>,
    dashboards: TtlCache<String, DashboardSnapshot>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn user_cache_stats(&self) -> CacheStats {
        self.users.stats()
    }

    pub fn dashboard_cache_stats(&self) -> CacheStats {
        self.dashboards.stats()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    caches: CacheSettings,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default cache lifetimes (5 minutes for users, 1 minute
    /// for dashboards).
    pub fn caches(mut self, caches: CacheSettings) -> EngineBuilder {
        self.caches = caches;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let users = TtlCache::new("users", self.caches.user_ttl);
        let dashboards = TtlCache::new("dashboards", self.caches.dashboard_ttl);
        tracing::debug!(
            user_ttl = ?users.ttl(),
            dashboard_ttl = ?dashboards.ttl(),
            "building engine"
        );
        Ok(Engine {
            database: self.database,
            users,
            dashboards,
        })
    }
}
