// ==========================================
// 货运智能追踪系统 - 取消标志
// ==========================================
// 职责: 跨任务共享的取消信号
// 检查点: 每次出队前 + 进行中的追踪请求
// ==========================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// 可克隆的取消标志（克隆共享同一状态）
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    inner: Arc<Inner>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发出取消信号（幂等）
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// 等待取消信号
    pub async fn cancelled(&self) {
        loop {
            // 先注册再检查，避免丢失唤醒
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
