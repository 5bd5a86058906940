// 客户端 WebSocket
// 每次连接分配一个 SocketId，所有事件都带上来源 socket，旧 socket 的事件由桥接层丢弃

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

/// 异常断开时的关闭码（与浏览器一致）
pub const ABNORMAL_CLOSE: u16 = 1006;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SocketId(pub u64);

impl std::fmt::Display for SocketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 桥接层事件
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeEvent {
    /// WebSocket 已打开
    Open,
    /// 收到文本帧
    Message(String),
    /// 传输错误
    Error(String),
    /// 连接关闭
    Close { code: u16, reason: String },
    /// 终端输入
    Input(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeMessage {
    pub socket: SocketId,
    pub event: BridgeEvent,
}

/// 绑定到某个 socket 的事件发送端
#[derive(Clone, Debug)]
pub struct EventSender {
    socket: SocketId,
    tx: mpsc::UnboundedSender<BridgeMessage>,
}

impl EventSender {
    pub fn new(socket: SocketId, tx: mpsc::UnboundedSender<BridgeMessage>) -> Self {
        Self { socket, tx }
    }

    pub fn socket(&self) -> SocketId {
        self.socket
    }

    pub fn send(&self, event: BridgeEvent) -> bool {
        self.tx
            .send(BridgeMessage {
                socket: self.socket,
                event,
            })
            .is_ok()
    }
}

/// 已建立（或正在建立）的客户端连接
pub trait ClientSocket {
    fn is_open(&self) -> bool;
    /// 发送文本帧，未打开时返回 false
    fn send(&self, text: String) -> bool;
    fn close(&mut self);
}

/// 打开 WebSocket，事件通过 EventSender 回报
pub trait SocketConnector {
    type Socket: ClientSocket;

    fn open(&mut self, url: &str, events: EventSender) -> Self::Socket;
}

/// 基于 tokio-tungstenite 的连接器
#[derive(Clone, Copy, Debug, Default)]
pub struct WsConnector;

impl SocketConnector for WsConnector {
    type Socket = WsSocket;

    fn open(&mut self, url: &str, events: EventSender) -> WsSocket {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));

        tokio::spawn(run_socket(
            url.to_string(),
            outgoing_rx,
            open.clone(),
            events,
        ));

        WsSocket {
            outgoing: outgoing_tx,
            open,
        }
    }
}

pub struct WsSocket {
    outgoing: mpsc::UnboundedSender<WsMessage>,
    open: Arc<AtomicBool>,
}

impl ClientSocket for WsSocket {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send(&self, text: String) -> bool {
        self.is_open() && self.outgoing.send(WsMessage::Text(text)).is_ok()
    }

    fn close(&mut self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.outgoing.send(WsMessage::Close(None));
        }
    }
}

async fn run_socket(
    url: String,
    mut outgoing: mpsc::UnboundedReceiver<WsMessage>,
    open: Arc<AtomicBool>,
    events: EventSender,
) {
    let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            warn!("[Socket] {} Failed to connect to {}: {}", events.socket(), url, e);
            events.send(BridgeEvent::Error(e.to_string()));
            events.send(BridgeEvent::Close {
                code: ABNORMAL_CLOSE,
                reason: String::new(),
            });
            return;
        }
    };

    open.store(true, Ordering::SeqCst);
    events.send(BridgeEvent::Open);

    let (mut write, mut read) = stream.split();
    let mut close_code = ABNORMAL_CLOSE;
    let mut close_reason = String::new();
    // 本端已发出关闭帧，之后的传输错误不再上报
    let mut closing = false;

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => {
                    events.send(BridgeEvent::Message(text));
                }
                Some(Ok(WsMessage::Binary(bytes))) => {
                    events.send(BridgeEvent::Message(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    if let Some(frame) = frame {
                        close_code = u16::from(frame.code);
                        close_reason = frame.reason.to_string();
                    } else {
                        close_code = u16::from(CloseCode::Status);
                    }
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    if !closing {
                        events.send(BridgeEvent::Error(e.to_string()));
                    }
                    break;
                }
                None => break,
            },
            out = outgoing.recv() => match out {
                Some(msg) => {
                    let is_close = msg.is_close();
                    if let Err(e) = write.send(msg).await {
                        if !closing {
                            events.send(BridgeEvent::Error(e.to_string()));
                        }
                        break;
                    }
                    if is_close {
                        closing = true;
                        close_code = u16::from(CloseCode::Normal);
                    }
                }
                None => {
                    // 句柄已释放
                    let _ = write.send(WsMessage::Close(None)).await;
                    close_code = u16::from(CloseCode::Normal);
                    break;
                }
            },
        }
    }

    open.store(false, Ordering::SeqCst);
    debug!("[Socket] {} closed with code {}", events.socket(), close_code);
    events.send(BridgeEvent::Close {
        code: close_code,
        reason: close_reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn next(rx: &mut mpsc::UnboundedReceiver<BridgeMessage>) -> BridgeEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
            .event
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_then_close() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let socket = WsConnector.open(
            &format!("ws://127.0.0.1:{}/ssh", port),
            EventSender::new(SocketId(7), tx),
        );

        assert!(matches!(next(&mut rx).await, BridgeEvent::Error(_)));
        assert_eq!(
            next(&mut rx).await,
            BridgeEvent::Close {
                code: ABNORMAL_CLOSE,
                reason: String::new()
            }
        );
        assert!(!socket.is_open());
        assert!(!socket.send("x".to_string()));
    }

    #[tokio::test]
    async fn test_wss_attempts_tls_handshake() {
        // 对端接受 TCP 后立即断开，握手失败而不是报告缺少 TLS 支持
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _socket = WsConnector.open(
            &format!("wss://{}/ssh", addr),
            EventSender::new(SocketId(3), tx),
        );

        match next(&mut rx).await {
            BridgeEvent::Error(message) => {
                assert!(!message.contains("TLS support not compiled"), "{}", message)
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(next(&mut rx).await, BridgeEvent::Close { .. }));
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_text() {
                    ws.send(msg).await.unwrap();
                } else if msg.is_close() {
                    let _ = ws.close(None).await;
                    break;
                }
            }
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut socket = WsConnector.open(
            &format!("ws://{}/ssh", addr),
            EventSender::new(SocketId(1), tx),
        );

        assert_eq!(next(&mut rx).await, BridgeEvent::Open);
        assert!(socket.send("hello".to_string()));
        assert_eq!(next(&mut rx).await, BridgeEvent::Message("hello".to_string()));

        socket.close();
        assert!(!socket.is_open());
        assert!(matches!(next(&mut rx).await, BridgeEvent::Close { .. }));
    }
}
