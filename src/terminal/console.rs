// 本地终端
// crossterm 原始模式 + 后台线程读取 stdin，每块输入按监听分发
// Ctrl-] 退出

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::constants::ESCAPE_BYTE;
use crate::ssh::utf8::Utf8Stream;

use super::socket::{BridgeEvent, EventSender};
use super::widget::{Disposable, TerminalWidget};

type Listeners = Arc<Mutex<HashMap<u64, EventSender>>>;

pub struct StdioTerminal {
    stdout: std::io::Stdout,
    listeners: Listeners,
    next_listener: u64,
    raw_mode: bool,
}

impl StdioTerminal {
    /// 进入原始模式并开始读取 stdin
    /// 返回的接收端在用户按下 Ctrl-] 或 stdin 结束时收到通知
    pub fn start() -> Result<(Self, mpsc::UnboundedReceiver<()>)> {
        enable_raw_mode().context("Failed to enable raw mode")?;

        let listeners: Listeners = Arc::new(Mutex::new(HashMap::new()));
        let (quit_tx, quit_rx) = mpsc::unbounded_channel();

        let reader_listeners = listeners.clone();
        thread::spawn(move || {
            let mut stdin = std::io::stdin();
            let mut buf = [0u8; 1024];
            let mut decoder = Utf8Stream::default();
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let chunk = &buf[..n];
                        let (input, quit) = match chunk.iter().position(|b| *b == ESCAPE_BYTE) {
                            Some(pos) => (&chunk[..pos], true),
                            None => (chunk, false),
                        };
                        let text = decoder.decode(input);
                        if !text.is_empty() {
                            dispatch(&reader_listeners, &text);
                        }
                        if quit {
                            debug!("[Terminal] Escape key pressed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("[Terminal] stdin read error: {}", e);
                        break;
                    }
                }
            }
            let _ = quit_tx.send(());
        });

        Ok((
            Self {
                stdout: std::io::stdout(),
                listeners,
                next_listener: 0,
                raw_mode: true,
            },
            quit_rx,
        ))
    }

    fn restore(&mut self) {
        if self.raw_mode {
            self.raw_mode = false;
            if let Err(e) = disable_raw_mode() {
                warn!("[Terminal] Failed to restore terminal mode: {}", e);
            }
        }
    }
}

fn dispatch(listeners: &Listeners, text: &str) {
    let Ok(listeners) = listeners.lock() else {
        return;
    };
    for listener in listeners.values() {
        listener.send(BridgeEvent::Input(text.to_string()));
    }
}

impl TerminalWidget for StdioTerminal {
    fn write(&mut self, text: &str) {
        let mut out = self.stdout.lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            debug!("[Terminal] stdout write failed: {}", e);
        }
    }

    fn notify(&mut self, message: &str) {
        self.write(&format!("\r\n{}\r\n", message));
    }

    fn on_data(&mut self, listener: EventSender) -> Disposable {
        let key = self.next_listener;
        self.next_listener += 1;

        let Ok(mut map) = self.listeners.lock() else {
            return Disposable::empty();
        };
        map.insert(key, listener);

        let listeners = self.listeners.clone();
        Disposable::new(move || {
            if let Ok(mut map) = listeners.lock() {
                map.remove(&key);
            }
        })
    }
}

impl Drop for StdioTerminal {
    fn drop(&mut self) {
        self.restore();
    }
}
