use api_types::health::{CacheStatsView, Health};
use axum::{Json, extract::State};
use engine::CacheStats;

use crate::server::ServerState;

fn stats_view(stats: CacheStats) -> CacheStatsView {
    CacheStatsView {
        hit_rate: stats.hit_rate(),
        size: stats.size,
        hits: stats.hits,
        misses: stats.misses,
        evictions: stats.evictions,
    }
}

/// Liveness plus cache and degradation counters. Needs no credentials.
pub async fn get(State(state): State<ServerState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        user_cache: stats_view(state.engine.user_cache_stats()),
        dashboard_cache: stats_view(state.engine.dashboard_cache_stats()),
        degraded_reads: state.degraded_reads(),
    })
}
