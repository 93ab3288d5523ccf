//! 岗位申请实体
//!
//! 按 (post_id, worker_id) 维护的申请状态机：
//! pending → accepted | rejected，终态后不再允许任何转移。
//! 持久化由外部数据层负责，中枢只用它来保证转移通知的顺序一致。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{PostId, UserId};

/// 申请状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// 待处理（初始态）
    Pending,
    /// 已接受（终态）
    Accepted,
    /// 已拒绝（终态）
    Rejected,
}

impl ApplicationStatus {
    /// 终态不再接受任何转移
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// 岗位申请
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub post_id: PostId,
    pub worker_id: UserId,
    pub contractor_id: UserId,
    pub status: ApplicationStatus,
}

impl JobApplication {
    /// 创建新的待处理申请
    pub fn new(post_id: PostId, worker_id: UserId, contractor_id: UserId) -> Self {
        Self {
            post_id,
            worker_id,
            contractor_id,
            status: ApplicationStatus::Pending,
        }
    }

    /// 接受申请，仅允许从 pending 状态转移
    pub fn accept(&mut self) -> Result<(), DomainError> {
        self.transition(ApplicationStatus::Accepted)
    }

    /// 拒绝申请，仅允许从 pending 状态转移
    pub fn reject(&mut self) -> Result<(), DomainError> {
        self.transition(ApplicationStatus::Rejected)
    }

    fn transition(&mut self, to: ApplicationStatus) -> Result<(), DomainError> {
        if self.status != ApplicationStatus::Pending {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// 岗位状态。created 与 in_progress 有专门语义，
/// 其余外部定义的状态字符串原样透传。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Created,
    InProgress,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Other(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample() -> JobApplication {
        JobApplication::new(
            PostId::new(Uuid::new_v4()),
            UserId::new(Uuid::new_v4()),
            UserId::new(Uuid::new_v4()),
        )
    }

    #[test]
    fn accept_from_pending() {
        let mut app = sample();
        app.accept().unwrap();
        assert_eq!(app.status, ApplicationStatus::Accepted);
    }

    #[test]
    fn reject_after_accept_is_conflict() {
        let mut app = sample();
        app.accept().unwrap();
        let err = app.reject().unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: ApplicationStatus::Accepted,
                to: ApplicationStatus::Rejected,
            }
        );
        // 状态保持不变
        assert_eq!(app.status, ApplicationStatus::Accepted);
    }

    #[test]
    fn double_accept_is_conflict() {
        let mut app = sample();
        app.accept().unwrap();
        assert!(app.accept().is_err());
    }

    #[test]
    fn post_status_passthrough_serde() {
        let json = serde_json::to_string(&PostStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let other: PostStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(other, PostStatus::Other("on_hold".to_string()));
    }
}
