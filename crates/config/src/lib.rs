//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - JWT认证
//! - 事件中枢（hub）调优参数
//! - 服务设置

use serde::{Deserialize, Serialize};
use std::env;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// JWT认证配置
    pub jwt: JwtConfig,
    /// 事件中枢配置
    pub hub: HubConfig,
    /// 服务配置
    pub server: ServerConfig,
}

/// JWT配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

/// 事件中枢配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// 命令队列容量（所有连接共享）
    pub command_capacity: usize,
    /// 每个连接的出站队列容量，队列满时丢弃该接收方的消息
    pub outbound_capacity: usize,
    /// 连接建立后等待 register 事件的超时（秒）
    pub register_timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            command_capacity: 1024,
            outbound_capacity: 64,
            register_timeout_secs: 30,
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// 从环境变量加载配置
    /// 对于关键安全配置（JWT_SECRET），如果环境变量不存在将会 panic
    /// 这确保了生产环境中不会使用不安全的默认值
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET")
                    .expect("JWT_SECRET environment variable is required for production safety"),
                expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(24),
            },
            hub: HubConfig {
                command_capacity: env::var("HUB_COMMAND_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1024),
                outbound_capacity: env::var("HUB_OUTBOUND_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(64),
                register_timeout_secs: env::var("HUB_REGISTER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_config_defaults() {
        let hub = HubConfig::default();
        assert_eq!(hub.command_capacity, 1024);
        assert_eq!(hub.outbound_capacity, 64);
        assert_eq!(hub.register_timeout_secs, 30);
    }
}
