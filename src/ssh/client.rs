// SSH 客户端核心实现
// 负责 TCP 连接、SSH 握手和认证，返回已认证的 Handle

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use russh::client::Handle;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use super::config::{AuthMethod, SshConfig};
use super::error::SshError;
use super::handler::SshClientHandler;

/// SSH 客户端
pub struct SshClient {
    /// 连接配置
    config: SshConfig,
}

impl SshClient {
    /// 创建新的 SSH 客户端
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    /// 执行连接（异步）
    /// 返回已认证的 Handle
    pub async fn connect(&self) -> Result<Handle<SshClientHandler>, SshError> {
        let target = format!("{}:{}", self.config.host, self.config.port);
        debug!(
            "[SSH] Target: {}@{}",
            self.config.username, target
        );

        // TCP 连接（tokio 负责异步解析地址）
        info!("[SSH] Connecting to {}...", target);
        let tcp_stream = self
            .with_timeout(async {
                TcpStream::connect((self.config.host.as_str(), self.config.port))
                    .await
                    .map_err(SshError::Io)
            })
            .await?;
        debug!("[SSH] TCP connection established");

        // SSH 握手
        let russh_config = Arc::new(self.config.to_russh_config());
        let handler = SshClientHandler::new(&self.config.host, self.config.port);
        let mut handle = self
            .with_timeout(async {
                russh::client::connect_stream(russh_config, tcp_stream, handler)
                    .await
                    .map_err(SshError::from)
            })
            .await?;
        debug!("[SSH] SSH handshake completed");

        // 认证
        info!(
            "[SSH] Authenticating as '{}'...",
            self.config.username
        );
        self.authenticate(&mut handle).await?;
        info!("[SSH] Authentication successful");

        Ok(handle)
    }

    /// 连接超时包装，0 表示不限制
    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, SshError>>,
    ) -> Result<T, SshError> {
        let secs = self.config.connect_timeout;
        if secs == 0 {
            return fut.await;
        }
        timeout(Duration::from_secs(secs), fut)
            .await
            .map_err(|_| SshError::Timeout(secs))?
    }

    /// 执行认证
    async fn authenticate(&self, handle: &mut Handle<SshClientHandler>) -> Result<(), SshError> {
        use russh::client::AuthResult;

        let auth_result = match &self.config.auth {
            AuthMethod::Password(password) => {
                debug!("[SSH] Using password authentication");
                handle
                    .authenticate_password(&self.config.username, password)
                    .await
                    .map_err(SshError::from)?
            }
            AuthMethod::PublicKey(key) => {
                debug!("[SSH] Using public key authentication ({})", key.algorithm());
                let key_with_alg = russh::keys::PrivateKeyWithHashAlg::new(
                    key.clone(),
                    None, // Use default hash algorithm
                );
                handle
                    .authenticate_publickey(&self.config.username, key_with_alg)
                    .await
                    .map_err(SshError::from)?
            }
        };

        match auth_result {
            AuthResult::Success => Ok(()),
            AuthResult::Failure {
                remaining_methods,
                partial_success,
            } => {
                if partial_success {
                    return Err(SshError::Auth(
                        "partial authentication, additional methods required".to_string(),
                    ));
                }
                Err(SshError::Auth(format!(
                    "server suggests {:?}",
                    remaining_methods
                )))
            }
        }
    }
}
