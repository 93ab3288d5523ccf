use domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("hub unavailable: {0}")]
    HubUnavailable(String),
    #[error("authentication failed")]
    Authentication,
}

impl ApplicationError {
    /// 中枢命令队列已关闭或发送失败
    pub fn hub_unavailable(message: impl Into<String>) -> Self {
        Self::HubUnavailable(message.into())
    }
}
