// 网关连接
// 每个 WebSocket 对应一个 GatewayConnection，至多持有一个 SSH 会话

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::i18n;
use crate::models::{ConnectionSettings, Language};
use crate::protocol::{ConnectRequest, Envelope, EnvelopeSink};
use crate::ssh::{SessionHandle, SshSession};

/// 会话启动器
pub trait SessionLauncher: Send + Sync + 'static {
    /// 启动会话，输出写入 sink
    fn launch(&self, request: ConnectRequest, sink: EnvelopeSink) -> SessionHandle;
}

/// 基于 russh 的默认启动器
pub struct SshLauncher {
    settings: ConnectionSettings,
    language: Language,
}

impl SshLauncher {
    pub fn new(settings: ConnectionSettings, language: Language) -> Self {
        Self { settings, language }
    }
}

impl SessionLauncher for SshLauncher {
    fn launch(&self, request: ConnectRequest, sink: EnvelopeSink) -> SessionHandle {
        SshSession::spawn(request, &self.settings, self.language, sink)
    }
}

/// 单条消息的处理结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// 启动了新会话
    Launched,
    /// 已有活动会话，拒绝新的 connect
    Rejected,
    /// 输入已转发给会话
    Forwarded,
    /// 合法但当前状态下无意义的消息
    Ignored,
    /// 无法解析的帧
    Discarded,
}

pub struct GatewayConnection {
    id: Uuid,
    launcher: Arc<dyn SessionLauncher>,
    sink: EnvelopeSink,
    language: Language,
    session: Option<SessionHandle>,
}

impl GatewayConnection {
    pub fn new(
        id: Uuid,
        launcher: Arc<dyn SessionLauncher>,
        sink: EnvelopeSink,
        language: Language,
    ) -> Self {
        Self {
            id,
            launcher,
            sink,
            language,
            session: None,
        }
    }

    #[cfg(test)]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// 处理文本帧
    pub fn dispatch_text(&mut self, text: &str) -> Dispatch {
        match Envelope::decode(text) {
            Ok(envelope) => self.dispatch(envelope),
            Err(e) => {
                warn!("[Gateway] [{}] Failed to parse message: {}", self.id, e);
                Dispatch::Discarded
            }
        }
    }

    /// 处理二进制帧
    pub fn dispatch_bytes(&mut self, bytes: &[u8]) -> Dispatch {
        match Envelope::decode_bytes(bytes) {
            Ok(envelope) => self.dispatch(envelope),
            Err(e) => {
                warn!("[Gateway] [{}] Failed to parse message: {}", self.id, e);
                Dispatch::Discarded
            }
        }
    }

    pub fn dispatch(&mut self, envelope: Envelope) -> Dispatch {
        debug!("[Gateway] [{}] Received message: {}", self.id, envelope.kind());
        self.reap();

        match envelope {
            Envelope::Connect(request) => {
                if let Some(session) = &self.session {
                    warn!(
                        "[Gateway] [{}] Rejecting connect, session {} is {}",
                        self.id,
                        session.id(),
                        session.state()
                    );
                    self.sink
                        .error(i18n::t(&self.language, "gateway.session_active"));
                    return Dispatch::Rejected;
                }

                info!(
                    "[Gateway] [{}] Launching session for {}@{}:{}",
                    self.id, request.username, request.host, request.port
                );
                let session = self.launcher.launch(request, self.sink.clone());
                self.session = Some(session);
                Dispatch::Launched
            }
            Envelope::Data { data } => {
                if self.session.as_ref().is_some_and(|s| s.send_data(data)) {
                    Dispatch::Forwarded
                } else {
                    debug!("[Gateway] [{}] Data without an active session", self.id);
                    Dispatch::Ignored
                }
            }
            Envelope::Error { .. } | Envelope::Unknown => {
                debug!("[Gateway] [{}] Ignoring unexpected message", self.id);
                Dispatch::Ignored
            }
        }
    }

    /// 丢弃已经结束的会话，之后允许新的 connect
    fn reap(&mut self) {
        if self.session.as_ref().is_some_and(|s| s.is_closed()) {
            if let Some(session) = self.session.take() {
                debug!("[Gateway] [{}] Session {} reaped", self.id, session.id());
            }
        }
    }

    /// 结束当前会话，可重复调用
    pub fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                "[Gateway] [{}] Ending session {}",
                self.id,
                session.id()
            );
            session.close();
        }
    }
}

impl Drop for GatewayConnection {
    fn drop(&mut self) {
        self.shutdown();
    }
}
