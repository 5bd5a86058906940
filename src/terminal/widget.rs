// 终端组件接口
// 桥接层只依赖这个 trait，stdio 终端和测试用的假终端都实现它

use super::socket::EventSender;

/// 可释放的注册（输入监听等）
/// 释放或 drop 时执行一次清理回调
pub struct Disposable {
    on_dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Disposable {
    pub fn new(on_dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_dispose: Some(Box::new(on_dispose)),
        }
    }

    /// 不需要清理的注册
    pub fn empty() -> Self {
        Self { on_dispose: None }
    }

    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(f) = self.on_dispose.take() {
            f();
        }
    }
}

impl Drop for Disposable {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Disposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposable")
            .field("pending", &self.on_dispose.is_some())
            .finish()
    }
}

pub trait TerminalWidget {
    /// 写入终端数据（可能包含控制序列）
    fn write(&mut self, text: &str);

    /// 终端之外的提示，例如表单校验失败
    fn notify(&mut self, message: &str);

    /// 注册输入监听，每块输入以 BridgeEvent::Input 发给 listener
    fn on_data(&mut self, listener: EventSender) -> Disposable;
}
