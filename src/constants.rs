// 默认值常量

/// SSH 默认端口
pub const DEFAULT_SSH_PORT: u16 = 22;

/// 中继服务默认监听端口（未设置 PORT 环境变量时）
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// WebSocket 升级路径
pub const DEFAULT_WS_PATH: &str = "/ssh";

/// 静态资源目录
pub const DEFAULT_STATIC_DIR: &str = "public";

/// 配置目录名
pub const APP_DIR_NAME: &str = "webssh";

pub mod env {
    pub const PORT: &str = "PORT";
    pub const HOST: &str = "WEBSSH_HOST";
    pub const STATIC_DIR: &str = "WEBSSH_STATIC_DIR";
    pub const LANG: &str = "WEBSSH_LANG";
    pub const PASSWORD: &str = "WEBSSH_PASSWORD";
    pub const PASSPHRASE: &str = "WEBSSH_PASSPHRASE";
}

pub mod pty {
    pub const TERM: &str = "xterm";
    pub const COLS: u32 = 80;
    pub const ROWS: u32 = 24;
}

/// 本地退出键 Ctrl-]
pub const ESCAPE_BYTE: u8 = 0x1d;
