//! 通知去重器 - 基于持久化时间窗口的重复抑制
//!
//! 调用方为语义等价的通知提供 duplicateKey；窗口内再次出现同一 key
//! 的通知会被抑制。时间戳记录写入偏好存储（`duplicate_<key>`），
//! 跨进程重启仍然生效。
//!
//! ## 语义
//! - 空 key 永远不算重复
//! - 无记录不算重复；记录损坏视同无记录
//! - 重复判定为严格小于：`now - last < window`
//! - `window <= 0` 时任何后续尝试都立即不算重复
//! - `mark_sent` 无条件覆盖旧记录，即使随后的渲染失败也不回滚

use crate::clock::{Clock, SystemClock};
use crate::prefs::PreferenceStore;
use std::sync::Arc;
use tracing::debug;

/// 去重记录的键前缀
pub const DUPLICATE_KEY_PREFIX: &str = "duplicate_";

/// 通知去重器
pub struct DuplicateSuppressor {
    prefs: PreferenceStore,
    clock: Arc<dyn Clock>,
}

impl DuplicateSuppressor {
    /// 创建去重器，使用系统时钟
    pub fn new(prefs: PreferenceStore) -> Self {
        Self {
            prefs,
            clock: Arc::new(SystemClock),
        }
    }

    /// 注入时钟（测试用）
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 检查 key 在窗口内是否已发送过
    pub fn is_duplicate(&self, key: &str, window_seconds: i64) -> bool {
        if key.is_empty() {
            return false;
        }

        let record = self.prefs.get(&format!("{DUPLICATE_KEY_PREFIX}{key}"));
        if record.is_empty() {
            return false;
        }

        let last_sent = match record.parse::<i64>() {
            Ok(ts) => ts,
            // 损坏的记录视同无记录
            Err(_) => return false,
        };

        let elapsed = self.clock.now_epoch() - last_sent;
        let duplicate = elapsed < window_seconds;
        if duplicate {
            debug!(
                key = %key,
                elapsed_secs = elapsed,
                window_secs = window_seconds,
                "Notification suppressed (duplicate within window)"
            );
        }
        duplicate
    }

    /// 记录 key 已发送（覆盖旧时间戳）
    pub fn mark_sent(&self, key: &str) {
        if key.is_empty() {
            return;
        }
        let now = self.clock.now_epoch();
        self.prefs
            .set(&format!("{DUPLICATE_KEY_PREFIX}{key}"), &now.to_string());
    }
}
