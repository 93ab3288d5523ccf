//! 连接出站队列
//!
//! 每个连接一条有界 mpsc 队列，由该连接的写任务消费。
//! 队列满或已关闭时丢弃该接收方的消息，绝不阻塞中枢 actor。

use domain::ServerEvent;
use tokio::sync::mpsc;

/// 写任务消费的出站帧
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    /// 投递一个服务器事件
    Event(ServerEvent),
    /// 要求传输层关闭该连接
    Close,
}

/// 出站队列的发送端，中枢持有
#[derive(Debug, Clone)]
pub struct OutboundQueue {
    sender: mpsc::Sender<OutboundFrame>,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// 尽力投递：失败（队列满/连接已走）只记录，不向调用方传播
    pub fn push(&self, event: ServerEvent) {
        if let Err(err) = self.sender.try_send(OutboundFrame::Event(event)) {
            tracing::warn!(error = %err, "出站队列投递失败，消息已丢弃");
        }
    }

    /// 要求传输层关闭连接
    pub fn close(&self) {
        let _ = self.sender.try_send(OutboundFrame::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::UserId;
    use uuid::Uuid;

    #[tokio::test]
    async fn push_delivers_event() {
        let (queue, mut rx) = OutboundQueue::new(4);
        let event = ServerEvent::PresenceChanged {
            user_id: UserId::new(Uuid::new_v4()),
            online: true,
        };
        queue.push(event.clone());
        assert_eq!(rx.recv().await, Some(OutboundFrame::Event(event)));
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let (queue, mut rx) = OutboundQueue::new(1);
        queue.push(ServerEvent::error("A", "first"));
        // 第二条被丢弃，push 立即返回
        queue.push(ServerEvent::error("B", "second"));

        assert_eq!(
            rx.recv().await,
            Some(OutboundFrame::Event(ServerEvent::error("A", "first")))
        );
        assert!(rx.try_recv().is_err());
    }
}
