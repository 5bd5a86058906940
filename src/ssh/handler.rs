// SSH 客户端 Handler 实现
// 实现 russh::client::Handler trait

use russh::keys::PublicKey;
use std::future::Future;
use tracing::{debug, info};

/// SSH 客户端 Handler
/// 处理 SSH 连接过程中的各种回调
pub struct SshClientHandler {
    /// 服务器地址（用于日志）
    target: String,
}

impl SshClientHandler {
    /// 创建新的 Handler
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            target: format!("{}:{}", host, port),
        }
    }
}

impl russh::client::Handler for SshClientHandler {
    type Error = russh::Error;

    /// 检查服务器公钥
    /// 主机密钥校验交给部署方处理，这里接受并记录指纹
    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        let fingerprint = server_public_key.fingerprint(russh::keys::ssh_key::HashAlg::Sha256);

        info!(
            "[SSH] Server key fingerprint for {}: {}",
            self.target, fingerprint
        );
        debug!(
            "[SSH] Server key type: {}",
            server_public_key.algorithm()
        );

        async { Ok(true) }
    }
}
