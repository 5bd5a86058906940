// SSH 会话状态与命令定义

use std::fmt;

/// 会话状态
/// Connecting -> Ready -> ShellOpen -> Closing -> Closed，任意阶段都可以直接进入 Closing
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// TCP 连接、握手、认证
    Connecting = 0,
    /// 认证完成，尚未打开 Shell
    Ready = 1,
    /// Shell 通道已打开
    ShellOpen = 2,
    /// 正在释放资源
    Closing = 3,
    /// 已结束（只会进入一次）
    Closed = 4,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::ShellOpen => "shell-open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }

    /// 是否已经进入结束流程
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closing | Self::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 网关发给会话的命令
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// 写入 Shell 输入
    Data(String),
    /// 结束会话
    Close,
}

/// Shell 循环结束的原因
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellEnd {
    /// 远端关闭了 Shell 通道
    ChannelClosed,
    /// SSH 连接断开
    TransportClosed,
    /// 网关要求结束
    Cancelled,
}
