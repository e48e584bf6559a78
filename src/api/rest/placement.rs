use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, put};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::engine::placement::PlacementMode;
use crate::engine::pricing::Estimate;
use crate::error::AppError;
use crate::models::point::GeoPoint;
use crate::session::Session;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/placement", get(get_placement))
        .route("/placement/mode", put(set_mode))
        .route("/estimate", get(get_estimate))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedMode {
    None,
    Pickup,
    Dropoff,
}

impl From<RequestedMode> for PlacementMode {
    fn from(mode: RequestedMode) -> Self {
        match mode {
            RequestedMode::None => PlacementMode::Idle,
            RequestedMode::Pickup => PlacementMode::AwaitingPickup,
            RequestedMode::Dropoff => PlacementMode::AwaitingDropoff,
        }
    }
}

#[derive(Deserialize)]
pub struct SetModeRequest {
    pub mode: RequestedMode,
}

#[derive(Serialize)]
pub struct PlacementResponse {
    pub mode: PlacementMode,
    pub pickup: Option<GeoPoint>,
    pub dropoff: Option<GeoPoint>,
    pub estimate: Option<Estimate>,
}

impl PlacementResponse {
    fn from_session(session: &Session) -> Self {
        let placement = session.placement();
        Self {
            mode: placement.mode(),
            pickup: placement.pickup(),
            dropoff: placement.dropoff(),
            estimate: session.preview(),
        }
    }
}

async fn get_placement(State(state): State<Arc<AppState>>) -> Json<PlacementResponse> {
    let session = state.session.lock().await;
    Json(PlacementResponse::from_session(&session))
}

async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SetModeRequest>,
) -> Json<PlacementResponse> {
    let mut session = state.session.lock().await;
    session.set_mode(payload.mode.into());
    Json(PlacementResponse::from_session(&session))
}

async fn get_estimate(State(state): State<Arc<AppState>>) -> Result<Json<Estimate>, AppError> {
    let session = state.session.lock().await;
    session
        .preview()
        .map(Json)
        .ok_or_else(|| AppError::Validation("missing point".to_string()))
}
