//! 事件路由
//!
//! 入站事件的校验与分发。除 register 外的事件都要求连接已绑定身份；
//! 接收方不在线属于正常情况（静默丢弃），不是错误。
//! 任何单个事件都不会中断其他连接的处理。

use chrono::Utc;
use domain::{ClientEvent, ConnectionId, PostId, PostStatus, RoomId, ServerEvent, UserId};

use super::{error_code, HubState};

impl HubState {
    pub(super) fn handle_event(&mut self, connection_id: ConnectionId, event: ClientEvent) {
        if let ClientEvent::Register { user_id } = event {
            self.handle_register(connection_id, user_id);
            return;
        }

        let Some(sender_id) = self
            .connections
            .get(&connection_id)
            .and_then(|entry| entry.bound_user)
        else {
            tracing::warn!(connection_id = %connection_id, "未注册连接发来事件，已丢弃");
            self.reply(
                connection_id,
                ServerEvent::error(
                    error_code::NOT_REGISTERED,
                    "send a register event before anything else",
                ),
            );
            return;
        };

        match event {
            ClientEvent::Register { .. } => unreachable!("handled above"),
            ClientEvent::JoinRoom { room_id } => {
                self.rooms.join(sender_id, room_id.clone());
                tracing::debug!(user_id = %sender_id, room_id = %room_id, "用户加入房间");
            }
            ClientEvent::LeaveRoom { room_id } => {
                self.rooms.leave(sender_id, &room_id);
                tracing::debug!(user_id = %sender_id, room_id = %room_id, "用户离开房间");
            }
            ClientEvent::SendMessage {
                receiver_id,
                content,
            } => self.handle_send_message(sender_id, receiver_id, content),
            ClientEvent::Typing {
                receiver_id,
                room_id,
                is_typing,
            } => self.handle_typing(connection_id, sender_id, receiver_id, room_id, is_typing),
            ClientEvent::ApplyToJob {
                post_id,
                worker_id,
                contractor_id,
            } => self.handle_apply(connection_id, post_id, worker_id, contractor_id),
            ClientEvent::AcceptApplication {
                post_id,
                worker_id,
                contractor_id,
            } => self.handle_accept(connection_id, post_id, worker_id, contractor_id),
            ClientEvent::RejectApplication {
                post_id,
                worker_id,
                contractor_id,
            } => self.handle_reject(connection_id, post_id, worker_id, contractor_id),
            ClientEvent::PostStatusUpdate { post_id, status } => {
                self.handle_post_status(sender_id, post_id, status)
            }
            ClientEvent::Notify {
                target_user_id,
                payload,
            } => {
                let delivered = self.send_to_user(
                    target_user_id,
                    ServerEvent::NotificationReceived {
                        from_user_id: sender_id,
                        payload,
                    },
                );
                if !delivered {
                    tracing::debug!(target = %target_user_id, "通知目标不在线，已丢弃");
                }
            }
        }
    }

    /// 注册：身份必须与握手认证一致，不一致则拒绝并关闭连接。
    /// 成功后向其他用户广播上线，并向所有用户刷新在线列表。
    fn handle_register(&mut self, connection_id: ConnectionId, user_id: UserId) {
        let Some(entry) = self.connections.get_mut(&connection_id) else {
            return;
        };

        if user_id != entry.verified_user {
            tracing::warn!(
                claimed = %user_id,
                verified = %entry.verified_user,
                "注册身份与认证身份不符，断开连接"
            );
            entry.outbound.push(ServerEvent::error(
                error_code::IDENTITY_MISMATCH,
                "registered identity does not match the authenticated session",
            ));
            entry.outbound.close();
            return;
        }

        entry.bound_user = Some(user_id);
        let outbound = entry.outbound.clone();
        if let Some(superseded) = self.registry.register(user_id, connection_id, outbound) {
            // 单身份单会话：新注册静默顶替旧绑定，旧连接的迟到断开将成为空操作
            tracing::info!(user_id = %user_id, superseded = %superseded, "重复注册，旧连接绑定被顶替");
        } else {
            tracing::info!(user_id = %user_id, "用户上线");
        }

        self.broadcast_except(
            user_id,
            ServerEvent::PresenceChanged {
                user_id,
                online: true,
            },
        );
        self.broadcast_all(ServerEvent::OnlineList {
            users: self.registry.list_online(),
        });
    }

    /// 私聊：接收方离线时整体丢弃，绝不发假的送达确认
    fn handle_send_message(&mut self, sender_id: UserId, receiver_id: UserId, content: String) {
        let timestamp = Utc::now();
        let delivered = self.send_to_user(
            receiver_id,
            ServerEvent::NewMessage {
                sender_id,
                content,
                timestamp,
            },
        );

        if delivered {
            self.send_to_user(
                sender_id,
                ServerEvent::MessageDelivered {
                    receiver_id,
                    timestamp,
                },
            );
        } else {
            tracing::debug!(receiver = %receiver_id, "接收方不在线，消息已丢弃");
        }
    }

    /// 输入指示：定向或房间范围，必须恰好指定其一
    fn handle_typing(
        &mut self,
        connection_id: ConnectionId,
        sender_id: UserId,
        receiver_id: Option<UserId>,
        room_id: Option<RoomId>,
        is_typing: bool,
    ) {
        match (receiver_id, room_id) {
            (Some(receiver), None) => {
                self.send_to_user(
                    receiver,
                    ServerEvent::TypingStatus {
                        sender_id,
                        room_id: None,
                        is_typing,
                    },
                );
            }
            (None, Some(room)) => {
                let recipients: Vec<UserId> = self
                    .rooms
                    .members(&room)
                    .copied()
                    .filter(|member| *member != sender_id)
                    .collect();
                for member in recipients {
                    self.send_to_user(
                        member,
                        ServerEvent::TypingStatus {
                            sender_id,
                            room_id: Some(room.clone()),
                            is_typing,
                        },
                    );
                }
            }
            _ => {
                self.reply(
                    connection_id,
                    ServerEvent::error(
                        error_code::MALFORMED,
                        "typing requires exactly one of receiverId or roomId",
                    ),
                );
            }
        }
    }

    /// 申请岗位：承包方通知尽力投递，申请确认无条件回给申请方
    fn handle_apply(
        &mut self,
        connection_id: ConnectionId,
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    ) {
        if let Err(err) = self.applications.apply(post_id, worker_id, contractor_id) {
            tracing::warn!(post_id = %post_id, worker_id = %worker_id, error = %err, "重复申请已达终态");
            self.reply(
                connection_id,
                ServerEvent::error(error_code::APPLICATION_CONFLICT, err.to_string()),
            );
            return;
        }

        let delivered = self.send_to_user(
            contractor_id,
            ServerEvent::NewApplication { post_id, worker_id },
        );
        if !delivered {
            tracing::debug!(contractor = %contractor_id, "承包方不在线，申请通知已丢弃");
        }
        // 确认不依赖承包方在线状态
        self.reply(connection_id, ServerEvent::ApplicationSentAck { post_id });
    }

    /// 接受申请：先通知申请方，再全局广播岗位进入 in_progress
    fn handle_accept(
        &mut self,
        connection_id: ConnectionId,
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    ) {
        match self.applications.accept(post_id, worker_id, contractor_id) {
            Ok(application) => {
                self.send_to_user(
                    worker_id,
                    ServerEvent::ApplicationStatusChanged {
                        post_id,
                        worker_id,
                        status: application.status,
                    },
                );
                self.broadcast_all(ServerEvent::PostStatusChanged {
                    post_id,
                    status: PostStatus::InProgress,
                });
                tracing::info!(post_id = %post_id, worker_id = %worker_id, "申请已接受，岗位转入 in_progress");
            }
            Err(err) => {
                tracing::warn!(post_id = %post_id, worker_id = %worker_id, error = %err, "接受申请冲突");
                self.reply(
                    connection_id,
                    ServerEvent::error(error_code::APPLICATION_CONFLICT, err.to_string()),
                );
            }
        }
    }

    /// 拒绝申请：只通知申请方，无全局广播
    fn handle_reject(
        &mut self,
        connection_id: ConnectionId,
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    ) {
        match self.applications.reject(post_id, worker_id, contractor_id) {
            Ok(application) => {
                self.send_to_user(
                    worker_id,
                    ServerEvent::ApplicationStatusChanged {
                        post_id,
                        worker_id,
                        status: application.status,
                    },
                );
                tracing::info!(post_id = %post_id, worker_id = %worker_id, "申请已拒绝");
            }
            Err(err) => {
                tracing::warn!(post_id = %post_id, worker_id = %worker_id, error = %err, "拒绝申请冲突");
                self.reply(
                    connection_id,
                    ServerEvent::error(error_code::APPLICATION_CONFLICT, err.to_string()),
                );
            }
        }
    }

    /// 岗位状态：created 专门广播且不发给发布者本人，其余状态全员广播
    fn handle_post_status(&mut self, sender_id: UserId, post_id: PostId, status: PostStatus) {
        match status {
            PostStatus::Created => {
                self.broadcast_except(
                    sender_id,
                    ServerEvent::NewPostCreated {
                        post_id,
                        user_id: sender_id,
                    },
                );
            }
            other => {
                self.broadcast_all(ServerEvent::PostStatusChanged {
                    post_id,
                    status: other,
                });
            }
        }
    }
}
