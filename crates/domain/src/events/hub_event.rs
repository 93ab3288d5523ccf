//! 事件中枢的统一事件契约
//!
//! 入站（客户端→服务器）与出站（服务器→客户端）事件各用一个枚举，
//! 线上格式为 JSON：`type` 标签使用 kebab-case，载荷字段使用 camelCase
//! （与既有客户端的字段命名保持一致）。
//! 缺少必填字段的事件在反序列化阶段即失败，由传输层回以 error 事件。

use serde::{Deserialize, Serialize};

use crate::entities::{ApplicationStatus, PostStatus};
use crate::value_objects::{PostId, RoomId, Timestamp, UserId};

/// 客户端事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// 注册身份，必须与连接认证得到的身份一致
    Register { user_id: UserId },
    /// 加入房间（幂等）
    JoinRoom { room_id: RoomId },
    /// 离开房间（幂等）
    LeaveRoom { room_id: RoomId },
    /// 发送私聊消息
    SendMessage { receiver_id: UserId, content: String },
    /// 输入指示，receiver_id 与 room_id 必须恰好提供其一
    Typing {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver_id: Option<UserId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        is_typing: bool,
    },
    /// 申请岗位
    ApplyToJob {
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    },
    /// 接受申请
    AcceptApplication {
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    },
    /// 拒绝申请
    RejectApplication {
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    },
    /// 岗位状态更新，created 特殊处理为"新岗位"广播
    PostStatusUpdate { post_id: PostId, status: PostStatus },
    /// 定向通知
    Notify {
        target_user_id: UserId,
        payload: serde_json::Value,
    },
}

/// 服务器事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// 用户上下线
    PresenceChanged { user_id: UserId, online: bool },
    /// 在线用户全量快照
    OnlineList { users: Vec<UserId> },
    /// 新私聊消息
    NewMessage {
        sender_id: UserId,
        content: String,
        timestamp: Timestamp,
    },
    /// 送达确认，仅当接收方在线时发给发送方
    MessageDelivered {
        receiver_id: UserId,
        timestamp: Timestamp,
    },
    /// 输入指示转发
    TypingStatus {
        sender_id: UserId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        is_typing: bool,
    },
    /// 新申请（发给承包方）
    NewApplication { post_id: PostId, worker_id: UserId },
    /// 申请已提交确认（无条件发给申请方）
    ApplicationSentAck { post_id: PostId },
    /// 申请状态转移（发给申请方）
    ApplicationStatusChanged {
        post_id: PostId,
        worker_id: UserId,
        status: ApplicationStatus,
    },
    /// 岗位状态广播
    PostStatusChanged { post_id: PostId, status: PostStatus },
    /// 新岗位发布（不发给发布者本人）
    NewPostCreated { post_id: PostId, user_id: UserId },
    /// 定向通知转发
    NotificationReceived {
        from_user_id: UserId,
        payload: serde_json::Value,
    },
    /// 显式错误事件，让客户端能区分"被丢弃"与"对方离线"
    Error { code: String, message: String },
}

impl ServerEvent {
    /// 创建错误事件
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// 序列化为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ClientEvent {
    /// 从JSON字符串反序列化
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn client_event_wire_shape() {
        let user_id = Uuid::new_v4();
        let json = format!(r#"{{"type":"register","userId":"{user_id}"}}"#);
        let event = ClientEvent::from_json(&json).unwrap();
        assert_eq!(
            event,
            ClientEvent::Register {
                user_id: UserId::new(user_id)
            }
        );
    }

    #[test]
    fn missing_required_field_fails() {
        // send-message 缺少 content
        let json = format!(
            r#"{{"type":"send-message","receiverId":"{}"}}"#,
            Uuid::new_v4()
        );
        assert!(ClientEvent::from_json(&json).is_err());
    }

    #[test]
    fn unknown_event_type_fails() {
        assert!(ClientEvent::from_json(r#"{"type":"self-destruct"}"#).is_err());
    }

    #[test]
    fn server_event_uses_kebab_tag_and_camel_fields() {
        let event = ServerEvent::MessageDelivered {
            receiver_id: UserId::new(Uuid::new_v4()),
            timestamp: chrono::Utc::now(),
        };
        let json = event.to_json().unwrap();
        assert!(json.contains(r#""type":"message-delivered""#));
        assert!(json.contains(r#""receiverId""#));
    }

    #[test]
    fn post_status_update_passthrough() {
        let post_id = Uuid::new_v4();
        let json = format!(
            r#"{{"type":"post-status-update","postId":"{post_id}","status":"archived"}}"#
        );
        let event = ClientEvent::from_json(&json).unwrap();
        match event {
            ClientEvent::PostStatusUpdate { status, .. } => {
                assert_eq!(status, PostStatus::Other("archived".to_string()));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
