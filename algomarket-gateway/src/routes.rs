//! Axum route handlers for the marketplace moderation API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use algomarket_core::{AlgorithmId, Decision, DecisionRequest, NewAlgorithm, User};

use crate::{error::GatewayError, store::MarketStore};

// ── Shared state ─────────────────────────────────────────────────────────────

type Store = Arc<MarketStore>;

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over the given store.
pub fn create_router(store: Store) -> Router {
    Router::new()
        .route("/api/algorithms/moderation/", get(list_pending))
        .route("/api/algorithms/", get(list_all).post(submit_algorithm))
        .route("/api/algorithms/{id}/moderate/", post(moderate_algorithm))
        .route("/api/catalog/", get(catalog))
        .route("/health", get(health))
        .with_state(store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Authentication ────────────────────────────────────────────────────────────

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(store: &MarketStore, headers: &HeaderMap) -> Result<User, GatewayError> {
    bearer_token(headers)
        .and_then(|token| store.user_for_token(token))
        .ok_or(GatewayError::Unauthorized)
}

fn require_moderator(store: &MarketStore, headers: &HeaderMap) -> Result<User, GatewayError> {
    let user = authenticate(store, headers)?;
    if !user.can_moderate() {
        tracing::warn!(user = %user.username, "moderation refused");
        return Err(GatewayError::Forbidden);
    }
    Ok(user)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `GET /api/algorithms/moderation/`: algorithms awaiting a verdict.
///
/// # Errors
/// Returns [`GatewayError::Unauthorized`] without a valid session and
/// [`GatewayError::Forbidden`] if the caller may not moderate.
pub async fn list_pending(
    State(store): State<Store>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    require_moderator(&store, &headers)?;
    Ok(Json(store.list(true)))
}

/// `GET /api/algorithms/`: every algorithm regardless of status.
///
/// # Errors
/// Same as [`list_pending`].
pub async fn list_all(
    State(store): State<Store>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    require_moderator(&store, &headers)?;
    Ok(Json(store.list(false)))
}

/// `POST /api/algorithms/{id}/moderate/`: record a verdict.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] for a rejection without a
/// reason, [`GatewayError::AlgorithmNotFound`] for an unknown ID and
/// [`GatewayError::AlreadyModerated`] for a second verdict.
pub async fn moderate_algorithm(
    State(store): State<Store>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let moderator = require_moderator(&store, &headers)?;
    let decision = Decision::try_from(body)?;
    let id = AlgorithmId::new(id);
    let updated = store.moderate(&id, &decision, &moderator)?;
    info!(id = %id, verdict = %decision.verdict(), moderator = %moderator.username, "algorithm moderated");
    Ok(Json(updated))
}

/// `POST /api/algorithms/`: submit a new algorithm for moderation.
///
/// # Errors
/// Returns [`GatewayError::Unauthorized`] without a valid session and
/// [`GatewayError::InvalidRequest`] if a required field is blank or a paid
/// entry has no price.
pub async fn submit_algorithm(
    State(store): State<Store>,
    headers: HeaderMap,
    Json(body): Json<NewAlgorithm>,
) -> Result<impl IntoResponse, GatewayError> {
    let author = authenticate(&store, &headers)?;
    body.validate()?;
    let created = store.submit(body, &author);
    info!(id = %created.id, author = %author.username, "algorithm submitted");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/catalog/`: published algorithms. No session required.
pub async fn catalog(State(store): State<Store>) -> impl IntoResponse {
    Json(store.catalog())
}
