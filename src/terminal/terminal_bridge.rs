// 终端桥接
// 把终端组件接到中继服务的 WebSocket 上：
// 打开时发送 connect 信封，之后输入以 data 信封发出，收到的 data 写入终端
//
// 所有 socket 回调都汇总成 BridgeMessage，由 handle() 顺序处理；
// 来自旧 socket 的事件一律丢弃，不会写入已不属于它的终端

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::i18n;
use crate::models::{ClientSettings, Language};
use crate::protocol::{ConnectRequest, Envelope};

use super::form::ConnectionForm;
use super::socket::{
    BridgeEvent, BridgeMessage, ClientSocket, EventSender, SocketConnector, SocketId,
};
use super::widget::{Disposable, TerminalWidget};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// 上一次连接尚未出错或关闭
    #[error("Connection already in progress")]
    InProgress,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

pub struct TerminalBridge<T: TerminalWidget, C: SocketConnector> {
    terminal: T,
    connector: C,
    url: String,
    language: Language,
    events_tx: mpsc::UnboundedSender<BridgeMessage>,
    events_rx: mpsc::UnboundedReceiver<BridgeMessage>,
    socket: Option<(SocketId, C::Socket)>,
    /// 打开后要发送的 connect 请求
    pending: Option<ConnectRequest>,
    disposables: Vec<Disposable>,
    is_connecting: bool,
    next_socket: u64,
    reconnect_attempts: u32,
    max_reconnect_attempts: u32,
}

impl<T: TerminalWidget, C: SocketConnector> TerminalBridge<T, C> {
    pub fn new(terminal: T, connector: C, settings: &ClientSettings, language: Language) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            terminal,
            connector,
            url: settings.url.clone(),
            language,
            events_tx,
            events_rx,
            socket: None,
            pending: None,
            disposables: Vec::new(),
            is_connecting: false,
            next_socket: 1,
            reconnect_attempts: 0,
            max_reconnect_attempts: settings.max_reconnect_attempts,
        }
    }

    /// 已发起连接且尚未出错或关闭
    #[cfg(test)]
    pub fn is_connecting(&self) -> bool {
        self.is_connecting
    }

    /// 持有 socket（连接中或已打开）
    pub fn is_active(&self) -> bool {
        self.socket.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.socket.as_ref().is_some_and(|(_, s)| s.is_open())
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.disposables.len()
    }

    #[cfg(test)]
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// 发起连接
    ///
    /// 连接发起后直到出错、关闭或 cleanup() 之前都直接返回，
    /// 不创建 socket 也不注册监听；否则先清理旧 socket 和旧监听，再打开新的
    pub fn connect(&mut self, form: &ConnectionForm) -> Result<SocketId, BridgeError> {
        if self.is_connecting {
            info!("[Bridge] {}", i18n::t(&self.language, "client.in_progress"));
            return Err(BridgeError::InProgress);
        }

        if let Err(e) = form.validate() {
            self.terminal
                .notify(i18n::t(&self.language, "client.required_fields"));
            return Err(e);
        }

        self.cleanup();

        // 只记录，不会触发自动重连
        self.is_connecting = true;
        self.reconnect_attempts += 1;
        debug!(
            "[Bridge] Connection attempt {}/{}",
            self.reconnect_attempts, self.max_reconnect_attempts
        );
        let id = SocketId(self.next_socket);
        self.next_socket += 1;

        info!("[Bridge] Connecting to WebSocket: {} ({})", self.url, id);
        let socket = self.connector.open(&self.url, self.sender(id));
        self.socket = Some((id, socket));
        self.pending = Some(form.to_request());

        let listener = self.terminal.on_data(self.sender(id));
        self.disposables.push(listener);

        Ok(id)
    }

    fn sender(&self, id: SocketId) -> EventSender {
        EventSender::new(id, self.events_tx.clone())
    }

    /// 等待下一个事件
    pub async fn next_event(&mut self) -> Option<BridgeMessage> {
        self.events_rx.recv().await
    }

    /// 处理已经排队的事件，返回处理数量
    #[cfg(test)]
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.events_rx.try_recv() {
            self.handle(msg);
            handled += 1;
        }
        handled
    }

    pub fn handle(&mut self, msg: BridgeMessage) {
        let current = match &self.socket {
            Some((id, _)) if *id == msg.socket => *id,
            _ => {
                debug!("[Bridge] Dropping event from stale socket {}", msg.socket);
                return;
            }
        };

        match msg.event {
            BridgeEvent::Open => self.on_open(current),
            BridgeEvent::Message(text) => self.on_message(&text),
            BridgeEvent::Input(data) => self.on_input(data),
            BridgeEvent::Error(e) => {
                error!("[Bridge] WebSocket error on {}: {}", current, e);
                let line = format!(
                    "\r\n{}: {}\r\n",
                    i18n::t(&self.language, "client.socket_error"),
                    e
                );
                self.terminal.write(&line);
                self.cleanup();
            }
            BridgeEvent::Close { code, reason } => {
                info!(
                    "[Bridge] WebSocket {} closed: code={} reason={:?}",
                    current, code, reason
                );
                let line = self.close_line(code, &reason);
                self.terminal.write(&line);
                self.cleanup();
            }
        }
    }

    fn on_open(&mut self, id: SocketId) {
        info!("[Bridge] WebSocket connection established ({})", id);

        let Some(request) = self.pending.take() else {
            return;
        };
        match Envelope::connect(request).encode() {
            Ok(frame) => {
                self.send(frame);
            }
            Err(e) => warn!("[Bridge] Failed to encode connect request: {}", e),
        }
    }

    fn on_message(&mut self, text: &str) {
        match Envelope::decode(text) {
            Ok(Envelope::Data { data }) => self.terminal.write(&data),
            Ok(Envelope::Error { message }) => {
                error!("[Bridge] Server error: {}", message);
                let line = format!(
                    "\r\n{}: {}\r\n",
                    i18n::t(&self.language, "client.error"),
                    message
                );
                self.terminal.write(&line);
            }
            Ok(other) => debug!("[Bridge] Ignoring {} message", other.kind()),
            Err(e) => warn!("[Bridge] Failed to parse message: {}", e),
        }
    }

    fn on_input(&mut self, data: String) {
        if !self.is_open() {
            debug!("[Bridge] Dropping input, socket is not open");
            return;
        }
        match Envelope::data(data).encode() {
            Ok(frame) => {
                self.send(frame);
            }
            Err(e) => warn!("[Bridge] Failed to encode input: {}", e),
        }
    }

    fn send(&self, frame: String) -> bool {
        match &self.socket {
            Some((_, socket)) => socket.send(frame),
            None => false,
        }
    }

    fn close_line(&self, code: u16, reason: &str) -> String {
        let lang = &self.language;
        let mut line = format!(
            "\r\n{} ({}: {}",
            i18n::t(lang, "client.closed"),
            i18n::t(lang, "client.code"),
            code
        );
        if !reason.is_empty() {
            line.push_str(&format!(", {}: {}", i18n::t(lang, "client.reason"), reason));
        }
        line.push_str(")\r\n");
        line
    }

    /// 关闭当前 socket 并释放所有监听，可重复调用
    pub fn cleanup(&mut self) {
        if let Some((id, mut socket)) = self.socket.take() {
            if socket.is_open() {
                socket.close();
            }
            debug!("[Bridge] Socket {} released", id);
        }
        for listener in self.disposables.drain(..) {
            listener.dispose();
        }
        self.pending = None;
        self.is_connecting = false;
        self.reconnect_attempts = 0;
    }

    pub fn dispose(mut self) {
        self.cleanup();
    }
}

impl<T: TerminalWidget, C: SocketConnector> Drop for TerminalBridge<T, C> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
