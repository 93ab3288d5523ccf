//! WebSocket 连接管理
//!
//! 封装单个 WebSocket 连接的完整生命周期：
//! - 升级握手时的 JWT 认证
//! - 注册超时（窗口内未收到 register 事件即关闭，释放资源）
//! - 入站事件解析并投递给中枢
//! - 出站队列排空到 socket
//! - 断开时通知中枢做注册表与房间清理

use std::time::Duration;

use application::{error_code, HubHandle, IdentityVerifier, OutboundFrame, OutboundQueue};
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use domain::{ClientEvent, ConnectionId, ServerEvent, UserId};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

/// WebSocket连接查询参数
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// JWT access token
    pub token: String,
}

/// 处理WebSocket连接升级
pub async fn websocket_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let user_id = state
        .jwt_service
        .verify(&query.token)
        .await
        .map_err(|_| ApiError::unauthorized("invalid token"))?;

    tracing::info!(user_id = %user_id, "WebSocket upgrade");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: UserId) {
    let connection_id = ConnectionId::generate();
    let (outbound, mut outbound_rx) = OutboundQueue::new(state.hub_config.outbound_capacity);

    if let Err(err) = state.hub.connect(connection_id, user_id, outbound.clone()).await {
        tracing::error!(error = %err, "Failed to attach connection to hub");
        return;
    }

    let (mut sender, mut incoming) = socket.split();

    // 发送任务：排空出站队列
    let send_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            match frame {
                OutboundFrame::Event(event) => {
                    let payload = match event.to_json() {
                        Ok(json) => json,
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to serialize outbound event");
                            continue;
                        }
                    };
                    if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sender.send(WsMessage::Close(None)).await;
                    break;
                }
            }
        }
        tracing::debug!(connection_id = %connection_id, "WebSocket发送任务结束");
    });

    // 接收任务：解析入站事件并投递给中枢
    let hub = state.hub.clone();
    let register_window = Duration::from_secs(state.hub_config.register_timeout_secs);
    let recv_task = tokio::spawn(async move {
        read_loop(&hub, connection_id, user_id, &outbound, &mut incoming, register_window).await;
        tracing::debug!(connection_id = %connection_id, "WebSocket接收任务结束");
    });

    // 等待任意一个任务完成（连接断开）
    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    // 断开清理：注销与房间清理在中枢 actor 内按序完成
    if let Err(err) = state.hub.disconnect(connection_id).await {
        tracing::error!(error = %err, connection_id = %connection_id, "Failed to notify hub of disconnect");
    }

    tracing::info!(user_id = %user_id, connection_id = %connection_id, "WebSocket连接已断开");
}

/// 读循环。注册窗口在连接建立时一次算定，
/// 窗口内的其他入站帧（包括畸形帧）不会重置它；
/// 单个畸形事件只回 error 事件，绝不中断循环。
async fn read_loop(
    hub: &HubHandle,
    connection_id: ConnectionId,
    verified_user: UserId,
    outbound: &OutboundQueue,
    incoming: &mut (impl StreamExt<Item = Result<WsMessage, axum::Error>> + Unpin),
    register_window: Duration,
) {
    let mut registered = false;
    let register_deadline = tokio::time::Instant::now() + register_window;

    loop {
        let next = if registered {
            incoming.next().await
        } else {
            match tokio::time::timeout_at(register_deadline, incoming.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!(connection_id = %connection_id, "注册超时，关闭未注册连接");
                    return;
                }
            }
        };

        let Some(Ok(message)) = next else {
            return;
        };

        match message {
            WsMessage::Text(text) => match ClientEvent::from_json(text.as_str()) {
                Ok(event) => {
                    // 只有与认证身份一致的注册才解除超时；
                    // 不一致的注册会被中枢回以 error 并关闭连接
                    if matches!(event, ClientEvent::Register { user_id } if user_id == verified_user)
                    {
                        registered = true;
                    }
                    if hub.event(connection_id, event).await.is_err() {
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(connection_id = %connection_id, error = %err, "畸形事件已丢弃");
                    outbound.push(ServerEvent::error(
                        error_code::MALFORMED,
                        format!("unparseable event: {}", err),
                    ));
                }
            },
            WsMessage::Close(_) => {
                tracing::debug!(connection_id = %connection_id, "WebSocket收到关闭消息");
                return;
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) => {
                // Ping 由底层协议栈自动回 Pong
            }
            WsMessage::Binary(_) => {
                tracing::debug!(connection_id = %connection_id, "二进制消息不支持，已忽略");
            }
        }
    }
}
