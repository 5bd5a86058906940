// SSH 连接模块
//
// 模块结构:
// - config: 连接配置 (SshConfig, AuthMethod)
// - error: 错误类型 (SshError)
// - event: 会话状态与命令 (SessionState, SessionCommand)
// - handler: russh Handler 实现
// - client: SSH 客户端核心（连接 + 认证）
// - session: SSH 会话 (SshSession, SessionHandle)
// - utf8: Shell 输出解码

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod session;
pub mod utf8;

// 公开导出
pub use session::{SessionHandle, SshSession};
