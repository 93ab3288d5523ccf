//! 岗位申请生命周期
//!
//! 以 (post_id, worker_id) 为键的显式状态机集合。
//! 中枢重启会丢掉这里的内存态，而申请本身可能早已由外部数据层
//! 创建，所以 accept/reject 对未见过的键按 pending 补建后再转移；
//! 已达终态的键才算冲突。

use std::collections::HashMap;

use domain::{DomainError, JobApplication, PostId, UserId};

#[derive(Debug, Default)]
pub struct ApplicationTracker {
    applications: HashMap<(PostId, UserId), JobApplication>,
}

impl ApplicationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次申请。pending 下重复申请只是重发通知，不改状态；
    /// 已达终态的重复申请是冲突。
    pub fn apply(
        &mut self,
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    ) -> Result<(), DomainError> {
        let application = self
            .applications
            .entry((post_id, worker_id))
            .or_insert_with(|| JobApplication::new(post_id, worker_id, contractor_id));

        if application.status.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: application.status,
                to: domain::ApplicationStatus::Pending,
            });
        }
        Ok(())
    }

    /// pending → accepted
    pub fn accept(
        &mut self,
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    ) -> Result<JobApplication, DomainError> {
        let application = self
            .applications
            .entry((post_id, worker_id))
            .or_insert_with(|| JobApplication::new(post_id, worker_id, contractor_id));
        application.accept()?;
        Ok(application.clone())
    }

    /// pending → rejected
    pub fn reject(
        &mut self,
        post_id: PostId,
        worker_id: UserId,
        contractor_id: UserId,
    ) -> Result<JobApplication, DomainError> {
        let application = self
            .applications
            .entry((post_id, worker_id))
            .or_insert_with(|| JobApplication::new(post_id, worker_id, contractor_id));
        application.reject()?;
        Ok(application.clone())
    }
}
