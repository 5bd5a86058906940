// SSH 错误类型定义
// Display 文本会原样放进 error 信封发给客户端

use thiserror::Error;

/// SSH 错误类型
#[derive(Debug, Error)]
pub enum SshError {
    /// 连接请求不完整
    #[error("Invalid connection request: {0}")]
    Config(String),

    /// 认证参数无法使用（私钥缺失、无法解析、密码错误）
    #[error("Private key configuration failed: {0}")]
    AuthConfig(String),

    /// IO 错误（网络连接等）
    #[error("SSH connection failed: {0}")]
    Io(#[from] std::io::Error),

    /// 认证失败
    #[error("SSH connection failed: authentication rejected ({0})")]
    Auth(String),

    /// SSH 协议错误
    #[error("SSH connection failed: {0}")]
    Protocol(String),

    /// 连接超时
    #[error("SSH connection failed: timed out after {0}s")]
    Timeout(u64),

    /// Shell 通道创建失败
    #[error("Failed to create shell: {0}")]
    ShellOpen(String),

    /// Shell 已经打开
    #[error("Failed to create shell: a shell is already open on this session")]
    ShellBusy,

    /// 通道运行时错误（不会结束会话）
    #[error("Shell error: {0}")]
    Channel(String),
}

impl From<russh::Error> for SshError {
    fn from(e: russh::Error) -> Self {
        SshError::Protocol(e.to_string())
    }
}

impl From<russh::keys::Error> for SshError {
    fn from(e: russh::keys::Error) -> Self {
        SshError::AuthConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        assert_eq!(
            SshError::ShellOpen("denied".into()).to_string(),
            "Failed to create shell: denied"
        );
        assert_eq!(
            SshError::Channel("broken pipe".into()).to_string(),
            "Shell error: broken pipe"
        );
    }
}
