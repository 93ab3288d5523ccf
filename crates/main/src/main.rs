//! 主应用程序入口
//!
//! 启动事件中枢与 Axum Web API 服务。

use std::sync::Arc;

use application::Hub;
use config::AppConfig;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env();

    // 启动单写者事件中枢
    let hub = Hub::spawn(&config.hub);

    // JWT 作为身份验证协作方
    let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

    let state = AppState::new(hub, jwt_service, config.hub.clone());

    // 启动 Web 服务器
    let app = router(state);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("事件中枢服务器启动在 http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
