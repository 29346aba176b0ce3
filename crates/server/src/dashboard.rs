//! Dashboard read endpoints. Both degrade to their neutral value on failure.

use api_types::{budget::BudgetSummary, transaction::TransactionView};
use axum::{Extension, Json, extract::State};

use crate::{Identity, server::ServerState};

pub async fn transactions(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Json<Vec<TransactionView>> {
    match state.engine.recent_transactions(&identity.external_id).await {
        Ok(transactions) => Json(transactions),
        Err(err) => {
            state.degraded_read("dashboard transactions", &err);
            Json(Vec::new())
        }
    }
}

pub async fn budget(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Json<BudgetSummary> {
    match state.engine.budget_summary(&identity.external_id).await {
        Ok(summary) => Json(summary),
        Err(err) => {
            state.degraded_read("dashboard budget", &err);
            Json(BudgetSummary::default())
        }
    }
}
