// WebSocket 网关
//
// 模块结构:
// - connection: 单个 WebSocket 的消息分发 (GatewayConnection, SessionLauncher)
//
// 一个路径升级为 WebSocket，其余路径交给静态资源目录

pub mod connection;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{AppSettings, Language};
use crate::protocol::EnvelopeSink;

use connection::{GatewayConnection, SessionLauncher, SshLauncher};

/// 网关共享状态（只读）
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub launcher: Arc<dyn SessionLauncher>,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        let launcher = SshLauncher::new(settings.connection.clone(), settings.language);
        Self {
            settings: Arc::new(settings),
            launcher: Arc::new(launcher),
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    let ws_path = normalize_path(&state.settings.server.ws_path);
    let static_files = ServeDir::new(&state.settings.server.static_dir);

    Router::new()
        .route(&ws_path, get(ws_handler))
        .fallback_service(static_files)
        .with_state(state)
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let language = state.settings.language;
    ws.on_upgrade(move |socket| handle_socket(socket, state.launcher, language))
}

/// 启动网关服务，直到收到 Ctrl-C
pub async fn serve(settings: AppSettings) -> Result<()> {
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind gateway to {}", addr))?;

    info!(
        "[Gateway] Server running on {} (WebSocket path {}, static dir {})",
        listener.local_addr()?,
        normalize_path(&settings.server.ws_path),
        settings.server.static_dir
    );

    axum::serve(listener, router(AppState::new(settings)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("[Gateway] Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("[Gateway] Shutting down");
}

/// 单个 WebSocket 的生命周期
/// 读循环结束（关闭帧、流结束或传输错误）后统一清理会话
pub async fn handle_socket(
    socket: WebSocket,
    launcher: Arc<dyn SessionLauncher>,
    language: Language,
) {
    let id = Uuid::new_v4();
    info!("[Gateway] [{}] New WebSocket connection established", id);

    let (sink, mut outbound) = EnvelopeSink::channel();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(envelope) = outbound.recv().await {
            let text = match envelope.encode() {
                Ok(text) => text,
                Err(e) => {
                    warn!("[Gateway] [{}] Failed to encode {}: {}", id, envelope.kind(), e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut connection = GatewayConnection::new(id, launcher, sink, language);

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                connection.dispatch_text(text.as_str());
            }
            Ok(Message::Binary(bytes)) => {
                connection.dispatch_bytes(&bytes);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                // 交给下面的关闭流程清理
                warn!("[Gateway] [{}] WebSocket error: {}", id, e);
                break;
            }
        }
    }

    connection.shutdown();
    drop(connection);
    send_task.abort();
    info!("[Gateway] [{}] WebSocket connection closed", id);
}
