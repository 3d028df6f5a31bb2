//! Announcement API Handler
//!
//! Translates the HTTP exchange into a [`Coordinator::announce`] call. This
//! is the bridge between the Axum framework and the state logic in
//! `state.rs`; authentication has already happened in the transport by the
//! time a request reaches here.

use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use std::sync::Arc;

use super::protocol::{AnnounceRequest, AnnounceResponse, PRINCIPAL_HEADER};
use super::state::Coordinator;

/// Announcement endpoint.
///
/// One request both refreshes the caller's membership and returns the roster
/// changes since the caller's cursor. The principal comes from the header
/// stamped by the authenticated transport; a request without one never
/// reaches the coordinator state.
pub async fn handle_announce(
    Extension(coordinator): Extension<Arc<Coordinator>>,
    headers: HeaderMap,
    Json(req): Json<AnnounceRequest>,
) -> Result<Json<AnnounceResponse>, (StatusCode, String)> {
    let principal = match headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(principal) if !principal.is_empty() => principal.to_string(),
        _ => {
            tracing::warn!("Announcement rejected: no authenticated principal");
            return Err((
                StatusCode::FORBIDDEN,
                "no authenticated principal".to_string(),
            ));
        }
    };

    match coordinator.announce(&principal, req).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Announcement from {} failed: {}", principal, e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}
