//! 时钟抽象 - 可注入的 epoch 秒时间源
//!
//! 去重窗口和调度时间都以 epoch 秒计；注入时钟使窗口语义可以用
//! `ManualClock` 做确定性测试。

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// epoch 秒时间源
pub trait Clock: Send + Sync {
    /// 当前时间（epoch 秒）
    fn now_epoch(&self) -> i64;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// 手动时钟（测试用），时间只在显式调用时前进
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: AtomicI64,
}

impl ManualClock {
    pub fn new(secs: i64) -> Self {
        Self {
            secs: AtomicI64::new(secs),
        }
    }

    /// 设置当前时间
    pub fn set(&self, secs: i64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    /// 前进指定秒数
    pub fn advance(&self, delta: i64) {
        self.secs.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch(&self) -> i64 {
        self.secs.load(Ordering::SeqCst)
    }
}
