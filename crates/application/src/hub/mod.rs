//! 事件中枢 actor
//!
//! 注册表、房间成员关系、申请状态机全部由一个 tokio 任务独占，
//! 该任务顺序消费一条有界命令队列，天然满足单写者纪律：
//! 同一身份上的断开与注册不可能交错执行。
//! 连接任务只持有 `HubHandle`，通过消息传递与中枢交互。

mod applications;
mod outbound;
mod registry;
mod rooms;
mod router;

pub use outbound::{OutboundFrame, OutboundQueue};

use std::collections::HashMap;

use config::HubConfig;
use domain::{ClientEvent, ConnectionId, ServerEvent, UserId};
use tokio::sync::{mpsc, oneshot};

use crate::error::ApplicationError;
use applications::ApplicationTracker;
use registry::ConnectionRegistry;
use rooms::RoomTracker;

/// 出站 error 事件使用的错误码
pub mod error_code {
    pub const MALFORMED: &str = "MALFORMED";
    pub const NOT_REGISTERED: &str = "NOT_REGISTERED";
    pub const IDENTITY_MISMATCH: &str = "IDENTITY_MISMATCH";
    pub const APPLICATION_CONFLICT: &str = "APPLICATION_CONFLICT";
}

/// 中枢命令，由各连接任务投递
#[derive(Debug)]
pub enum HubCommand {
    /// 新连接建立，携带认证得到的身份与出站队列
    Connect {
        connection_id: ConnectionId,
        verified_user: UserId,
        outbound: OutboundQueue,
    },
    /// 连接上的一个入站事件
    Event {
        connection_id: ConnectionId,
        event: ClientEvent,
    },
    /// 传输层检测到连接断开
    Disconnect { connection_id: ConnectionId },
    /// 在线用户快照查询
    ListOnline {
        reply: oneshot::Sender<Vec<UserId>>,
    },
}

/// 中枢句柄，可克隆，供连接任务与 HTTP 查询使用
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub async fn connect(
        &self,
        connection_id: ConnectionId,
        verified_user: UserId,
        outbound: OutboundQueue,
    ) -> Result<(), ApplicationError> {
        self.send(HubCommand::Connect {
            connection_id,
            verified_user,
            outbound,
        })
        .await
    }

    pub async fn event(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), ApplicationError> {
        self.send(HubCommand::Event {
            connection_id,
            event,
        })
        .await
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), ApplicationError> {
        self.send(HubCommand::Disconnect { connection_id }).await
    }

    /// `listOnline()` 快照，经 actor 串行化，无需额外加锁
    pub async fn list_online(&self) -> Result<Vec<UserId>, ApplicationError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::ListOnline { reply }).await?;
        response
            .await
            .map_err(|_| ApplicationError::hub_unavailable("hub dropped snapshot reply"))
    }

    async fn send(&self, command: HubCommand) -> Result<(), ApplicationError> {
        self.commands
            .send(command)
            .await
            .map_err(|err| ApplicationError::hub_unavailable(err.to_string()))
    }
}

/// 单写者中枢
pub struct Hub {
    state: HubState,
    commands: mpsc::Receiver<HubCommand>,
}

impl Hub {
    pub fn new(config: &HubConfig) -> (Self, HubHandle) {
        let (sender, receiver) = mpsc::channel(config.command_capacity);
        (
            Self {
                state: HubState::new(),
                commands: receiver,
            },
            HubHandle { commands: sender },
        )
    }

    /// 启动 actor 任务并返回句柄
    pub fn spawn(config: &HubConfig) -> HubHandle {
        let (hub, handle) = Self::new(config);
        tokio::spawn(hub.run());
        handle
    }

    /// 命令循环，所有句柄都释放后结束
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.state.apply(command);
        }
        tracing::info!("事件中枢命令循环结束");
    }
}

/// 一条活跃连接在中枢里的视图
#[derive(Debug)]
struct ConnectionEntry {
    /// 升级握手时验证出的身份
    verified_user: UserId,
    /// register 事件成功后才绑定
    bound_user: Option<UserId>,
    outbound: OutboundQueue,
}

/// actor 独占的全部可变状态
struct HubState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    registry: ConnectionRegistry,
    rooms: RoomTracker,
    applications: ApplicationTracker,
}

impl HubState {
    fn new() -> Self {
        Self {
            connections: HashMap::new(),
            registry: ConnectionRegistry::new(),
            rooms: RoomTracker::new(),
            applications: ApplicationTracker::new(),
        }
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect {
                connection_id,
                verified_user,
                outbound,
            } => self.handle_connect(connection_id, verified_user, outbound),
            HubCommand::Event {
                connection_id,
                event,
            } => self.handle_event(connection_id, event),
            HubCommand::Disconnect { connection_id } => self.handle_disconnect(connection_id),
            HubCommand::ListOnline { reply } => {
                let _ = reply.send(self.registry.list_online());
            }
        }
    }

    fn handle_connect(
        &mut self,
        connection_id: ConnectionId,
        verified_user: UserId,
        outbound: OutboundQueue,
    ) {
        tracing::info!(connection_id = %connection_id, user_id = %verified_user, "连接已建立，等待注册");
        self.connections.insert(
            connection_id,
            ConnectionEntry {
                verified_user,
                bound_user: None,
                outbound,
            },
        );
    }

    /// 断开清理：注册表守卫在先，成员关系清理在后，
    /// 广播只在绑定确实被移除时发出。
    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        let Some(entry) = self.connections.remove(&connection_id) else {
            return;
        };
        let Some(user_id) = entry.bound_user else {
            tracing::debug!(connection_id = %connection_id, "未注册连接断开");
            return;
        };

        if self.registry.unregister(user_id, connection_id) {
            let rooms = self.rooms.leave_all(user_id);
            tracing::info!(
                user_id = %user_id,
                rooms = rooms.len(),
                "用户下线，注册表与房间成员关系已清理"
            );
            self.broadcast_all(ServerEvent::PresenceChanged {
                user_id,
                online: false,
            });
            self.broadcast_all(ServerEvent::OnlineList {
                users: self.registry.list_online(),
            });
        } else {
            // 被顶替连接的迟到断开：绑定和房间都归新会话所有
            tracing::debug!(user_id = %user_id, connection_id = %connection_id, "迟到断开，绑定已被新连接顶替");
        }
    }

    /// 发给所有已注册连接
    fn broadcast_all(&self, event: ServerEvent) {
        for (_, binding) in self.registry.iter() {
            binding.outbound.push(event.clone());
        }
    }

    /// 发给除 excluded 外的所有已注册连接
    fn broadcast_except(&self, excluded: UserId, event: ServerEvent) {
        for (user_id, binding) in self.registry.iter() {
            if *user_id != excluded {
                binding.outbound.push(event.clone());
            }
        }
    }

    /// 定向投递，返回是否有在线绑定
    fn send_to_user(&self, user_id: UserId, event: ServerEvent) -> bool {
        match self.registry.lookup(user_id) {
            Some(binding) => {
                binding.outbound.push(event);
                true
            }
            None => false,
        }
    }

    /// 回给事件来源连接
    fn reply(&self, connection_id: ConnectionId, event: ServerEvent) {
        if let Some(entry) = self.connections.get(&connection_id) {
            entry.outbound.push(event);
        }
    }
}
