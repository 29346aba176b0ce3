//! Admission control for mutating requests.
//!
//! A provider looks at the caller context and the resolved identity and
//! returns a binary [`Decision`]. The default provider, [`TokenBucketGate`],
//! runs a bot/shield check first and then charges a per-identity token bucket.
//! Decisions are never cached: every attempt is evaluated again.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

/// What we know about the calling request.
#[derive(Clone, Debug, Default)]
pub struct CallerContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub path: String,
}

#[derive(Clone, Copy, Debug)]
pub struct AdmissionRequest<'a> {
    pub context: &'a CallerContext,
    /// Rate-limit partition key (the external user id).
    pub identity: &'a str,
    pub cost: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// Quota exhausted. `reset` is the number of seconds until tokens are
    /// added back.
    RateLimit { remaining: u32, reset: u64 },
    /// Policy violation unrelated to rate (bot, abuse signal).
    Blocked(String),
}

impl DenyReason {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }
}

#[async_trait]
pub trait AdmissionProvider: Send + Sync {
    async fn evaluate(&self, request: AdmissionRequest<'_>) -> Decision;
}

/// Token bucket parameters: `refill_rate` tokens are added every `interval`,
/// up to `capacity`.
#[derive(Clone, Debug)]
pub struct TokenBucketConfig {
    pub capacity: u32,
    pub refill_rate: u32,
    pub interval: Duration,
    /// Case-insensitive substrings that mark a user agent as a bot.
    pub blocked_user_agents: Vec<String>,
    pub block_missing_user_agent: bool,
}

impl Default for TokenBucketConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_rate: 10,
            interval: Duration::from_secs(3600),
            blocked_user_agents: ["bot", "crawler", "spider", "scrapy", "python-requests"]
                .into_iter()
                .map(String::from)
                .collect(),
            block_missing_user_agent: true,
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct TokenBucketGate {
    config: TokenBucketConfig,
    buckets: DashMap<String, Bucket>,
}

impl TokenBucketGate {
    pub fn new(mut config: TokenBucketConfig) -> Self {
        if config.interval.is_zero() {
            config.interval = Duration::from_secs(1);
        }
        config.blocked_user_agents = config
            .blocked_user_agents
            .into_iter()
            .map(|agent| agent.to_lowercase())
            .filter(|agent| !agent.is_empty())
            .collect();
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    fn shield(&self, context: &CallerContext) -> Option<DenyReason> {
        let Some(agent) = context
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
        else {
            return self
                .config
                .block_missing_user_agent
                .then(|| DenyReason::Blocked("missing user agent".to_string()));
        };

        let agent = agent.to_lowercase();
        self.config
            .blocked_user_agents
            .iter()
            .find(|blocked| agent.contains(blocked.as_str()))
            .map(|blocked| DenyReason::Blocked(format!("automated client ({blocked})")))
    }

    fn charge(&self, identity: &str, cost: u32) -> Decision {
        let now = Instant::now();
        let interval = self.config.interval;
        let mut bucket = self
            .buckets
            .entry(identity.to_string())
            .or_insert_with(|| Bucket {
                tokens: self.config.capacity,
                last_refill: now,
            });

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        let periods = (elapsed.as_nanos() / interval.as_nanos()) as u32;
        if periods > 0 {
            let refill = periods.saturating_mul(self.config.refill_rate);
            bucket.tokens = bucket
                .tokens
                .saturating_add(refill)
                .min(self.config.capacity);
            bucket.last_refill += interval * periods;
        }

        if bucket.tokens >= cost {
            bucket.tokens -= cost;
            return Decision::Allow;
        }

        let next_refill = bucket.last_refill + interval;
        let reset = next_refill.saturating_duration_since(now);
        // Round partial seconds up so callers never retry too early.
        let reset = reset.as_secs() + u64::from(reset.subsec_nanos() > 0);
        Decision::Deny(DenyReason::RateLimit {
            remaining: bucket.tokens,
            reset,
        })
    }
}

#[async_trait]
impl AdmissionProvider for TokenBucketGate {
    async fn evaluate(&self, request: AdmissionRequest<'_>) -> Decision {
        if let Some(reason) = self.shield(request.context) {
            tracing::debug!(
                identity = request.identity,
                ip = request.context.ip.as_deref().unwrap_or("-"),
                path = request.context.path.as_str(),
                "request blocked by shield"
            );
            return Decision::Deny(reason);
        }
        self.charge(request.identity, request.cost)
    }
}
