//! 身份验证协作方抽象
//!
//! 中枢不自己签发凭证，只消费一个"凭证 → 已验证用户"的接口。
//! 生产实现是 web-api 层的 JwtService。

use async_trait::async_trait;
use domain::UserId;

use crate::error::ApplicationError;

/// 每个连接在接受注册前调用一次
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<UserId, ApplicationError>;
}
