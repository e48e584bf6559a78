use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;

use crate::error::AppError;
use crate::models::order::{Order, OrderId};
use crate::session::Session;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(place_order).get(list_orders))
        .route("/orders/pending", get(list_pending))
        .route("/orders/accepted", get(list_accepted))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/accept", post(accept_order))
}

fn refresh_pending(state: &AppState, session: &Session) {
    state
        .metrics
        .pending_orders
        .set(session.pending_orders().len() as i64);
}

async fn place_order(State(state): State<Arc<AppState>>) -> Result<Json<Order>, AppError> {
    let mut session = state.session.lock().await;

    let order = session.place_order().inspect_err(|err| {
        state.metrics.record_rejection(err);
    })?;

    state.metrics.orders_created_total.inc();
    state.metrics.order_price.observe(order.price as f64);
    refresh_pending(&state, &session);

    Ok(Json(order))
}

async fn accept_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let mut session = state.session.lock().await;

    let order = session
        .accept(&OrderId::from(id))
        .inspect_err(|err| state.metrics.record_rejection(err))?;

    state.metrics.orders_accepted_total.inc();
    refresh_pending(&state, &session);

    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let session = state.session.lock().await;
    Json(session.orders().to_vec())
}

async fn list_pending(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let session = state.session.lock().await;
    Json(session.pending_orders())
}

async fn list_accepted(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let session = state.session.lock().await;
    Json(session.accepted_orders())
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let id = OrderId::from(id);
    let session = state.session.lock().await;
    let order = session
        .order(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order.clone()))
}
