// WebSocket 消息协议
//
// 模块结构:
// - envelope: 消息信封 (Envelope, ConnectRequest, AuthType, FrameError)
// - sink: 出站信封队列 (EnvelopeSink)

pub mod envelope;
pub mod sink;

pub use envelope::{AuthType, ConnectRequest, Envelope};
pub use sink::EnvelopeSink;
