use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{ServerError, accounts, dashboard, health, identity::IdentityResolver, user};
use engine::{AdmissionProvider, CallerContext, Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub identity: Arc<dyn IdentityResolver>,
    pub admission: Arc<dyn AdmissionProvider>,
    degraded_reads: Arc<AtomicU64>,
}

impl ServerState {
    pub fn new(
        engine: Engine,
        identity: Arc<dyn IdentityResolver>,
        admission: Arc<dyn AdmissionProvider>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            identity,
            admission,
            degraded_reads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a read that fell back to its empty result.
    pub(crate) fn degraded_read(&self, operation: &'static str, err: &EngineError) {
        self.degraded_reads.fetch_add(1, Ordering::Relaxed);
        tracing::error!(operation, "read degraded to empty result: {err}");
    }

    pub fn degraded_reads(&self) -> u64 {
        self.degraded_reads.load(Ordering::Relaxed)
    }
}

fn caller_context(headers: &HeaderMap, path: &str) -> CallerContext {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let ip = header_str("x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .or_else(|| header_str("x-real-ip"))
        .map(str::to_string);

    CallerContext {
        ip,
        user_agent: header_str(header::USER_AGENT.as_str()).map(str::to_string),
        path: path.to_string(),
    }
}

async fn auth(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthorized);
    };

    let identity = state.identity.resolve(bearer.token()).await?;
    let context = caller_context(request.headers(), request.uri().path());

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/dashboard/transactions", get(dashboard::transactions))
        .route("/dashboard/budget", get(dashboard::budget))
        .route("/users/sync", post(user::sync))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/health", get(health::get))
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
