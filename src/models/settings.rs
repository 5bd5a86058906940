// Settings 配置数据结构

use serde::{Deserialize, Serialize};

use crate::constants::{self, env, pty};

// ======================== 主配置结构 ========================

/// 应用设置（持久化用）
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub connection: ConnectionSettings,
    pub client: ClientSettings,
    pub language: Language,
}

impl AppSettings {
    /// 用环境变量覆盖配置
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// 便于测试：从任意来源读取环境变量
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup(env::PORT).and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(host) = lookup(env::HOST).filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(dir) = lookup(env::STATIC_DIR).filter(|d| !d.is_empty()) {
            self.server.static_dir = dir;
        }
        if let Some(language) = lookup(env::LANG).and_then(|l| Language::parse(&l)) {
            self.language = language;
        }
    }
}

// ======================== 语言 ========================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    Chinese,
    Japanese,
}

impl Language {
    /// 解析语言代码（en / zh / ja，大小写不敏感）
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        match code.split(['-', '_']).next().unwrap_or_default() {
            "en" | "english" => Some(Self::English),
            "zh" | "chinese" => Some(Self::Chinese),
            "ja" | "japanese" => Some(Self::Japanese),
            _ => None,
        }
    }
}

// ======================== 服务端设置 ========================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// WebSocket 升级路径
    pub ws_path: String,
    /// 静态资源目录
    pub static_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: constants::DEFAULT_HTTP_PORT,
            ws_path: constants::DEFAULT_WS_PATH.to_string(),
            static_dir: constants::DEFAULT_STATIC_DIR.to_string(),
        }
    }
}

// ======================== 连接设置 ========================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// TCP 连接 + SSH 握手超时，0 表示不限制
    pub connection_timeout_secs: u32,
    /// 心跳间隔，0 表示关闭
    pub keepalive_interval_secs: u32,
    pub keepalive_max: u32,
    // PTY
    pub term: String,
    pub cols: u32,
    pub rows: u32,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: 30,
            keepalive_interval_secs: 60,
            keepalive_max: 3,
            term: pty::TERM.to_string(),
            cols: pty::COLS,
            rows: pty::ROWS,
        }
    }
}

// ======================== 客户端设置 ========================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// 中继服务 WebSocket 地址
    pub url: String,
    /// 仅记录，不会触发自动重连
    pub max_reconnect_attempts: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            url: format!(
                "ws://127.0.0.1:{}{}",
                constants::DEFAULT_HTTP_PORT,
                constants::DEFAULT_WS_PATH
            ),
            max_reconnect_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"server":{"port":8080},"language":"Japanese"}"#).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.ws_path, "/ssh");
        assert_eq!(settings.connection.connection_timeout_secs, 30);
        assert_eq!(settings.language, Language::Japanese);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "4000"),
            ("WEBSSH_HOST", "127.0.0.1"),
            ("WEBSSH_LANG", "zh_CN"),
        ]
        .into_iter()
        .collect();

        let mut settings = AppSettings::default();
        settings.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.static_dir, "public");
        assert_eq!(settings.language, Language::Chinese);
    }

    #[test]
    fn test_invalid_port_env_ignored() {
        let mut settings = AppSettings::default();
        settings.apply_env_with(|key| (key == "PORT").then(|| "http".to_string()));
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("EN"), Some(Language::English));
        assert_eq!(Language::parse("ja-JP"), Some(Language::Japanese));
        assert_eq!(Language::parse("fr"), None);
    }
}
