// 消息信封定义
// WebSocket 文本帧中的 JSON 消息，通过 type 字段区分

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_SSH_PORT;

/// 帧解析错误
/// 只会被记录日志并丢弃，不会中断连接
#[derive(Debug, Error)]
pub enum FrameError {
    /// JSON 格式错误或缺少必要字段
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// 二进制帧不是合法的 UTF-8 文本
    #[error("Binary frame is not valid UTF-8")]
    NotUtf8,
}

/// 认证方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Password,
    Key,
}

/// 连接请求（一次性使用，不会被持久化）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_text"
    )]
    pub password: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_text"
    )]
    pub private_key: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_text"
    )]
    pub passphrase: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// 端口既可以是数字也可以是字符串（表单提交时是字符串）
/// 无法解析或为 0 时回退到 22
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let port = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };
    Ok(port.filter(|p| *p != 0).unwrap_or(DEFAULT_SSH_PORT))
}

/// 空字符串视为未提供
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// 消息信封
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    /// 客户端 -> 服务端：发起 SSH 连接
    Connect(ConnectRequest),
    /// 双向：键盘输入 / Shell 输出
    Data { data: String },
    /// 服务端 -> 客户端：错误信息
    Error { message: String },
    /// 无法识别的 type
    #[serde(other)]
    Unknown,
}

impl Envelope {
    pub fn connect(request: ConnectRequest) -> Self {
        Self::Connect(request)
    }

    pub fn data(data: impl Into<String>) -> Self {
        Self::Data { data: data.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// 解析文本帧
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(text)?)
    }

    /// 解析二进制帧（按 UTF-8 文本处理）
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(bytes).map_err(|_| FrameError::NotUtf8)?;
        Self::decode(text)
    }

    /// 编码为文本帧
    pub fn encode(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }

    /// 类型名称（用于日志）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::Data { .. } => "data",
            Self::Error { .. } => "error",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_connect_from_form() {
        let text = json!({
            "type": "connect",
            "name": "prod",
            "host": "h",
            "port": "2222",
            "username": "u",
            "authType": "password",
            "password": "p",
            "privateKey": "",
            "passphrase": ""
        })
        .to_string();

        let envelope = Envelope::decode(&text).unwrap();
        assert_eq!(
            envelope,
            Envelope::Connect(ConnectRequest {
                host: "h".to_string(),
                port: 2222,
                username: "u".to_string(),
                auth_type: AuthType::Password,
                password: Some("p".to_string()),
                private_key: None,
                passphrase: None,
            })
        );
    }

    #[test]
    fn test_port_fallback() {
        for port in [json!("abc"), json!(0), json!(70000), json!(null)] {
            let text = json!({
                "type": "connect",
                "host": "h",
                "port": port,
                "username": "u",
                "authType": "key"
            })
            .to_string();
            match Envelope::decode(&text).unwrap() {
                Envelope::Connect(request) => assert_eq!(request.port, 22),
                other => panic!("unexpected envelope: {:?}", other),
            }
        }

        let text = r#"{"type":"connect","host":"h","username":"u","authType":"key"}"#;
        match Envelope::decode(text).unwrap() {
            Envelope::Connect(request) => {
                assert_eq!(request.port, 22);
                assert_eq!(request.auth_type, AuthType::Key);
            }
            other => panic!("unexpected envelope: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type() {
        let envelope = Envelope::decode(r#"{"type":"resize","cols":80}"#).unwrap();
        assert_eq!(envelope, Envelope::Unknown);
    }

    #[test]
    fn test_malformed_frames() {
        assert!(Envelope::decode("not json").is_err());
        assert!(Envelope::decode(r#"{"data":"x"}"#).is_err());
        assert!(Envelope::decode(r#"{"type":"data"}"#).is_err());
        assert!(Envelope::decode_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_encode_wire_shape() {
        let data = Envelope::data("\r\nConnected!\r\n").encode().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&data).unwrap(),
            json!({"type": "data", "data": "\r\nConnected!\r\n"})
        );

        let error = Envelope::error("boom").encode().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&error).unwrap(),
            json!({"type": "error", "message": "boom"})
        );

        let connect = Envelope::connect(ConnectRequest {
            host: "h".to_string(),
            port: 22,
            username: "u".to_string(),
            auth_type: AuthType::Key,
            password: None,
            private_key: Some("KEY".to_string()),
            passphrase: None,
        })
        .encode()
        .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&connect).unwrap(),
            json!({
                "type": "connect",
                "host": "h",
                "port": 22,
                "username": "u",
                "authType": "key",
                "privateKey": "KEY"
            })
        );
    }
}
