//! 连接注册表
//!
//! 用户身份 → 活跃连接的唯一映射，"谁在线"的事实来源。
//! 单身份单会话：重复注册静默顶替旧绑定；注销带连接号守卫，
//! 防止被顶替连接的迟到断开误删新绑定。

use std::collections::HashMap;

use domain::{ConnectionId, UserId};

use super::outbound::OutboundQueue;

/// 一条身份绑定
#[derive(Debug, Clone)]
pub struct Binding {
    pub connection_id: ConnectionId,
    pub outbound: OutboundQueue,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    bindings: HashMap<UserId, Binding>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定用户到连接，返回被顶替的旧连接号（如有）
    pub fn register(
        &mut self,
        user_id: UserId,
        connection_id: ConnectionId,
        outbound: OutboundQueue,
    ) -> Option<ConnectionId> {
        self.bindings
            .insert(
                user_id,
                Binding {
                    connection_id,
                    outbound,
                },
            )
            .map(|prior| prior.connection_id)
    }

    /// 仅当记录中的连接就是正在拆除的这条时才移除绑定。
    /// 返回 true 表示确实移除了。
    pub fn unregister(&mut self, user_id: UserId, connection_id: ConnectionId) -> bool {
        match self.bindings.get(&user_id) {
            Some(binding) if binding.connection_id == connection_id => {
                self.bindings.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    /// O(1) 定向寻址
    pub fn lookup(&self, user_id: UserId) -> Option<&Binding> {
        self.bindings.get(&user_id)
    }

    /// 当前在线身份快照
    pub fn list_online(&self) -> Vec<UserId> {
        self.bindings.keys().copied().collect()
    }

    /// 遍历所有绑定，广播用
    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &Binding)> {
        self.bindings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> OutboundQueue {
        OutboundQueue::new(8).0
    }

    #[test]
    fn register_supersedes_prior_binding() {
        let mut registry = ConnectionRegistry::new();
        let user = UserId::new(uuid::Uuid::new_v4());
        let old = ConnectionId::generate();
        let new = ConnectionId::generate();

        assert!(registry.register(user, old, queue()).is_none());
        assert_eq!(registry.register(user, new, queue()), Some(old));
        assert_eq!(registry.lookup(user).unwrap().connection_id, new);
    }

    #[test]
    fn stale_unregister_is_noop() {
        let mut registry = ConnectionRegistry::new();
        let user = UserId::new(uuid::Uuid::new_v4());
        let old = ConnectionId::generate();
        let new = ConnectionId::generate();

        registry.register(user, old, queue());
        registry.register(user, new, queue());

        // 旧连接的迟到断开不能移除新绑定
        assert!(!registry.unregister(user, old));
        assert!(registry.lookup(user).is_some());

        assert!(registry.unregister(user, new));
        assert!(registry.lookup(user).is_none());
    }

    #[test]
    fn list_online_reflects_latest_operations() {
        let mut registry = ConnectionRegistry::new();
        let alice = UserId::new(uuid::Uuid::new_v4());
        let bob = UserId::new(uuid::Uuid::new_v4());
        let conn_a = ConnectionId::generate();
        let conn_b = ConnectionId::generate();

        registry.register(alice, conn_a, queue());
        registry.register(bob, conn_b, queue());
        registry.unregister(alice, conn_a);

        assert_eq!(registry.list_online(), vec![bob]);
    }
}
