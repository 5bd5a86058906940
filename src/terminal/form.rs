// 连接表单
// 与浏览器表单字段一一对应，端口保留为原始文本

use crate::constants::DEFAULT_SSH_PORT;
use crate::models::ConnectionProfile;
use crate::protocol::{AuthType, ConnectRequest};

use super::terminal_bridge::BridgeError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionForm {
    pub host: String,
    pub port: String,
    pub username: String,
    pub auth_type: AuthType,
    pub password: String,
    pub private_key: String,
    pub passphrase: String,
}

impl ConnectionForm {
    /// 主机名和用户名为必填项
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.host.trim().is_empty() {
            return Err(BridgeError::MissingField("host"));
        }
        if self.username.trim().is_empty() {
            return Err(BridgeError::MissingField("username"));
        }
        Ok(())
    }

    /// 空白或非法端口回退到 22
    pub fn port(&self) -> u16 {
        match self.port.trim().parse::<u16>() {
            Ok(0) | Err(_) => DEFAULT_SSH_PORT,
            Ok(port) => port,
        }
    }

    /// 只携带当前认证方式的凭据
    pub fn to_request(&self) -> ConnectRequest {
        let (password, private_key, passphrase) = match self.auth_type {
            AuthType::Password => (non_empty(&self.password), None, None),
            AuthType::Key => (
                None,
                non_empty(&self.private_key),
                non_empty(&self.passphrase),
            ),
        };

        ConnectRequest {
            host: self.host.trim().to_string(),
            port: self.port(),
            username: self.username.trim().to_string(),
            auth_type: self.auth_type,
            password,
            private_key,
            passphrase,
        }
    }

    pub fn to_profile(&self, name: &str) -> ConnectionProfile {
        let request = self.to_request();
        ConnectionProfile {
            name: name.to_string(),
            host: request.host,
            port: request.port,
            username: request.username,
            auth_type: request.auth_type,
            password: request.password,
            private_key: request.private_key,
            passphrase: request.passphrase,
            ..Default::default()
        }
    }
}

impl From<&ConnectionProfile> for ConnectionForm {
    fn from(profile: &ConnectionProfile) -> Self {
        Self {
            host: profile.host.clone(),
            port: profile.port.to_string(),
            username: profile.username.clone(),
            auth_type: profile.auth_type,
            password: profile.password.clone().unwrap_or_default(),
            private_key: profile.private_key.clone().unwrap_or_default(),
            passphrase: profile.passphrase.clone().unwrap_or_default(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
