// 客户端终端桥接
//
// 模块结构:
// - form: 连接表单 (ConnectionForm)
// - socket: WebSocket 抽象与 tokio-tungstenite 实现
// - widget: 终端组件接口 (TerminalWidget, Disposable)
// - terminal_bridge: 桥接状态机 (TerminalBridge)
// - console: 基于 stdio 的本地终端

pub mod console;
pub mod form;
pub mod socket;
pub mod terminal_bridge;
pub mod widget;

pub use console::StdioTerminal;
pub use form::ConnectionForm;
pub use socket::WsConnector;
pub use terminal_bridge::TerminalBridge;
pub use widget::TerminalWidget;
