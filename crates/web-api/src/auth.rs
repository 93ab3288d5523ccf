//! JWT 认证模块
//!
//! 提供 JWT token 生成、验证；同时作为中枢的身份验证协作方
//! （`IdentityVerifier`）的生产实现。

use application::{ApplicationError, IdentityVerifier};
use async_trait::async_trait;
use config::JwtConfig;
use domain::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub exp: i64, // 过期时间 (Unix timestamp)
}

/// JWT Token 服务
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 生成 JWT token
    pub fn generate_token(&self, user_id: Uuid) -> Result<String, ApiError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.config.expiration_hours);

        let claims = Claims {
            user_id,
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| ApiError::unauthorized(format!("Token generation failed: {}", err)))
    }

    /// 验证并解析 JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
            .map_err(|err| ApiError::unauthorized(format!("Invalid token: {}", err)))
    }
}

#[async_trait]
impl IdentityVerifier for JwtService {
    async fn verify(&self, credential: &str) -> Result<UserId, ApplicationError> {
        let claims = self
            .verify_token(credential)
            .map_err(|_| ApplicationError::Authentication)?;
        Ok(UserId::new(claims.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
        })
    }

    #[tokio::test]
    async fn verify_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();
        let token = service.generate_token(user_id).unwrap();

        let verified = IdentityVerifier::verify(&service, &token).await.unwrap();
        assert_eq!(verified, UserId::new(user_id));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let service = service();
        assert!(IdentityVerifier::verify(&service, "not-a-jwt").await.is_err());
    }
}
