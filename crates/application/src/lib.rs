//! 应用层实现。
//!
//! 这里提供事件中枢（hub）的核心逻辑：连接注册表、房间成员关系、
//! 岗位申请生命周期，以及把入站事件分发到正确接收方的路由器。
//! 全部可变状态由单写者 actor 独占，外部只通过 `HubHandle` 传递消息。

pub mod auth;
pub mod error;
pub mod hub;

pub use auth::IdentityVerifier;
pub use error::ApplicationError;
pub use hub::{error_code, Hub, HubCommand, HubHandle, OutboundFrame, OutboundQueue};
