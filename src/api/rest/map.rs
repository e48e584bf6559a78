use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::map::{MapAdapter, MapStatus, MapView, Marker};
use crate::models::point::{Coordinate, GeoPoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/map", get(get_map))
        .route("/map/click", post(click))
}

#[derive(Serialize)]
pub struct MapResponse {
    pub status: MapStatus,
    pub view: MapView,
    pub markers: Vec<Marker>,
}

async fn get_map(State(state): State<Arc<AppState>>) -> Json<MapResponse> {
    Json(MapResponse {
        status: state.map.status(),
        view: state.map.view(),
        markers: state.map.markers(),
    })
}

#[derive(Serialize)]
pub struct ClickResponse {
    pub placed: Option<GeoPoint>,
}

/// Applies the click under the session lock, so the role follows the mode
/// active when the click arrives.
async fn click(
    State(state): State<Arc<AppState>>,
    Json(at): Json<Coordinate>,
) -> Result<Json<ClickResponse>, AppError> {
    let mut session = state.session.lock().await;
    state.map.click(at)?;

    let placed = session.map_clicked(at);
    match &placed {
        Some(point) => info!(
            role = ?point.role,
            lng = point.lng,
            lat = point.lat,
            "point placed"
        ),
        None => debug!(lng = at.lng, lat = at.lat, "click ignored: no placement mode"),
    }

    Ok(Json(ClickResponse { placed }))
}
