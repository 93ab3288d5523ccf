//! Web API 层。
//!
//! 提供 Axum 路由，把 WebSocket 连接接入应用层的事件中枢，
//! 并暴露在线用户快照等只读查询。

mod auth;
mod error;
mod routes;
mod state;
mod ws_connection;

pub use auth::{Claims, JwtService};
pub use config::JwtConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
