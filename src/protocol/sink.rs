// 出站信封队列
// SSH 会话通过它把输出交给所属的网关连接，不持有网关连接本身

use tokio::sync::mpsc;

use super::envelope::Envelope;

#[derive(Clone, Debug)]
pub struct EnvelopeSink {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EnvelopeSink {
    pub fn new(tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { tx }
    }

    /// 创建一对 sink / receiver
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// 发送信封，接收端已关闭时返回 false
    pub fn send(&self, envelope: Envelope) -> bool {
        self.tx.send(envelope).is_ok()
    }

    pub fn data(&self, data: impl Into<String>) -> bool {
        self.send(Envelope::data(data))
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.send(Envelope::error(message))
    }
}
