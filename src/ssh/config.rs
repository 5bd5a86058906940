// SSH 连接配置
// 由一次性的 ConnectRequest 构建，构建过程中完成私钥解析

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use russh::keys::PrivateKey;

use super::error::SshError;
use super::session::PtyRequest;
use crate::models::ConnectionSettings;
use crate::protocol::{AuthType, ConnectRequest};

/// SSH 连接配置
#[derive(Clone, Debug)]
pub struct SshConfig {
    /// 目标主机
    pub host: String,
    /// 端口
    pub port: u16,
    /// 用户名
    pub username: String,
    /// 认证方式
    pub auth: AuthMethod,
    /// 连接超时（秒），0 表示不限制
    pub connect_timeout: u64,
    /// 心跳配置
    pub keepalive: KeepaliveConfig,
    /// PTY 参数
    pub pty: PtyRequest,
}

/// 认证方式
#[derive(Clone)]
pub enum AuthMethod {
    /// 密码认证
    Password(String),
    /// 公钥认证（已解析的私钥）
    PublicKey(Arc<PrivateKey>),
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("Password(***)"),
            AuthMethod::PublicKey(key) => write!(f, "PublicKey({})", key.algorithm()),
        }
    }
}

impl AuthMethod {
    /// 按 authType 选择认证参数，另一分支的字段被忽略
    pub fn from_request(request: &ConnectRequest) -> Result<Self, SshError> {
        match request.auth_type {
            AuthType::Password => Ok(AuthMethod::Password(
                request.password.clone().unwrap_or_default(),
            )),
            AuthType::Key => {
                let key_data = request
                    .private_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| SshError::AuthConfig("no private key supplied".to_string()))?;
                let key = russh::keys::decode_secret_key(key_data, request.passphrase.as_deref())
                    .map_err(|e| SshError::AuthConfig(e.to_string()))?;
                Ok(AuthMethod::PublicKey(Arc::new(key)))
            }
        }
    }
}

/// 心跳配置
#[derive(Clone, Debug)]
pub struct KeepaliveConfig {
    /// 是否启用心跳
    pub enabled: bool,
    /// 心跳间隔（秒）
    pub interval: u64,
    /// 最大重试次数
    pub max_retries: u32,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 60,
            max_retries: 3,
        }
    }
}

impl SshConfig {
    /// 消费连接请求，构建连接配置
    pub fn from_request(
        request: ConnectRequest,
        settings: &ConnectionSettings,
    ) -> Result<Self, SshError> {
        if request.host.trim().is_empty() {
            return Err(SshError::Config("host is required".to_string()));
        }
        if request.username.trim().is_empty() {
            return Err(SshError::Config("username is required".to_string()));
        }

        let auth = AuthMethod::from_request(&request)?;

        Ok(Self {
            host: request.host,
            port: request.port,
            username: request.username,
            auth,
            connect_timeout: settings.connection_timeout_secs as u64,
            keepalive: KeepaliveConfig {
                enabled: settings.keepalive_interval_secs > 0,
                interval: settings.keepalive_interval_secs as u64,
                max_retries: settings.keepalive_max,
            },
            pty: PtyRequest::from_settings(settings),
        })
    }

    /// 构建 russh 配置
    /// 不设置 inactivity_timeout，空闲的 shell 不会被断开
    pub fn to_russh_config(&self) -> russh::client::Config {
        let mut config = russh::client::Config::default();
        if self.keepalive.enabled {
            config.keepalive_interval = Some(Duration::from_secs(self.keepalive.interval));
            config.keepalive_max = self.keepalive.max_retries as usize;
        }
        config
    }
}
