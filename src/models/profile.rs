// 已保存的连接配置（客户端本地，核心模块不会读写）

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SSH_PORT;
use crate::protocol::AuthType;

/// 连接配置（持久化用）
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// 私钥内容（不是路径）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_connected_at: Option<String>,
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: String::new(),
            port: DEFAULT_SSH_PORT,
            username: String::new(),
            auth_type: AuthType::Password,
            password: None,
            private_key: None,
            passphrase: None,
            created_at: String::new(),
            last_connected_at: None,
        }
    }
}

/// 配置数据（用于存储到文件）
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    pub profiles: Vec<ConnectionProfile>,
}

impl ProfileConfig {
    pub fn get(&self, name: &str) -> Option<&ConnectionProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// 同名覆盖，否则追加；返回 true 表示覆盖了已有配置
    pub fn upsert(&mut self, profile: ConnectionProfile) -> bool {
        match self.profiles.iter().position(|p| p.name == profile.name) {
            Some(pos) => {
                let created_at = std::mem::take(&mut self.profiles[pos].created_at);
                self.profiles[pos] = ConnectionProfile {
                    created_at: if profile.created_at.is_empty() {
                        created_at
                    } else {
                        profile.created_at
                    },
                    ..profile
                };
                true
            }
            None => {
                self.profiles.push(profile);
                false
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.name != name);
        self.profiles.len() != before
    }
}
