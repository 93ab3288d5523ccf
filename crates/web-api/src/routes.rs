use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use domain::UserId;

use crate::{error::ApiError, state::AppState, ws_connection::websocket_upgrade};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/online", get(online_users))
        .route("/ws", get(websocket_upgrade))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 当前在线用户快照，由中枢 actor 串行化读出
async fn online_users(State(state): State<AppState>) -> Result<Json<Vec<UserId>>, ApiError> {
    let users = state.hub.list_online().await?;
    Ok(Json(users))
}
