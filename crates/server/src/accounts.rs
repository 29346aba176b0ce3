//! Account API endpoints

use api_types::account::{AccountCreated, AccountNew, AccountView};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{AdmissionRequest, CallerContext, Decision, DenyReason};

use crate::{Identity, ServerError, server::ServerState};

/// Handle requests for listing the caller's accounts.
///
/// Any failure after authentication yields an empty list.
pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Json<Vec<AccountView>> {
    match state.engine.user_accounts(&identity.external_id).await {
        Ok(accounts) => Json(accounts),
        Err(err) => {
            state.degraded_read("accounts", &err);
            Json(Vec::new())
        }
    }
}

/// Handle requests for creating a new account.
///
/// The admission gate is asked first, before the body or the store are
/// looked at.
pub async fn create(
    Extension(identity): Extension<Identity>,
    Extension(context): Extension<CallerContext>,
    State(state): State<ServerState>,
    payload: Result<Json<AccountNew>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let decision = state
        .admission
        .evaluate(AdmissionRequest {
            context: &context,
            identity: &identity.external_id,
            cost: 1,
        })
        .await;

    match decision {
        Decision::Allow => {}
        Decision::Deny(DenyReason::RateLimit { remaining, reset }) => {
            tracing::warn!(
                code = "RATE_LIMIT_EXCEEDED",
                remaining,
                reset_in_seconds = reset,
                ip = context.ip.as_deref().unwrap_or("-"),
                "account creation rate limited"
            );
            return Err(ServerError::RateLimited { remaining, reset });
        }
        Decision::Deny(DenyReason::Blocked(reason)) => {
            tracing::warn!(
                code = "REQUEST_BLOCKED",
                reason = reason.as_str(),
                ip = context.ip.as_deref().unwrap_or("-"),
                "account creation blocked"
            );
            return Err(ServerError::Blocked);
        }
    }

    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;

    let user = state.engine.lookup_user(&identity.external_id).await?;
    let account = state.engine.create_account(&user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountCreated {
            success: true,
            data: account,
        }),
    ))
}
