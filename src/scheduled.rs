//! 调度通知存储 - 内存映射 + 偏好存储镜像
//!
//! 调度通知只做登记，不存在定时器在未来触发它。
//! 内存中保存完整记录供进程内查询，偏好存储中只镜像数据 blob
//! （`scheduled_notification_<id>`），跨进程重启可通过 `rehydrate`
//! 恢复。

use crate::prefs::PreferenceStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 调度记录的键前缀
pub const SCHEDULED_KEY_PREFIX: &str = "scheduled_notification_";

/// 一条调度通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotification {
    pub id: String,
    /// 序列化的请求 blob，由应用侧解释，核心不关心内容
    pub data: String,
    /// 预定触发时间（epoch 秒）
    pub scheduled_date: i64,
    #[serde(default)]
    pub is_repeating: bool,
    /// 仅 is_repeating 时有意义
    #[serde(default)]
    pub repeat_interval: i64,
}

/// `list()` 返回的条目（wire 格式：{id, data}）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    pub id: String,
    pub data: String,
}

/// 调度通知存储
pub struct ScheduledStore {
    prefs: PreferenceStore,
    // BTreeMap 保证 list() 按 id 字典序稳定输出
    entries: BTreeMap<String, ScheduledNotification>,
}

impl ScheduledStore {
    pub fn new(prefs: PreferenceStore) -> Self {
        Self {
            prefs,
            entries: BTreeMap::new(),
        }
    }

    /// 登记调度通知；id 或 data 为空时拒绝且不改动任何状态
    pub fn schedule(
        &mut self,
        id: &str,
        data: &str,
        scheduled_date: i64,
        is_repeating: bool,
        repeat_interval: i64,
    ) -> bool {
        if id.is_empty() || data.is_empty() {
            warn!("Schedule rejected: id and request data are required");
            return false;
        }

        let record = ScheduledNotification {
            id: id.to_string(),
            data: data.to_string(),
            scheduled_date,
            is_repeating,
            repeat_interval,
        };
        self.entries.insert(id.to_string(), record);
        self.prefs.set(&format!("{SCHEDULED_KEY_PREFIX}{id}"), data);
        debug!(id = %id, scheduled_date, "Scheduled notification recorded");
        true
    }

    /// 列出全部调度通知（按 id 字典序）
    pub fn list(&self) -> Vec<ScheduledEntry> {
        self.entries
            .values()
            .map(|record| ScheduledEntry {
                id: record.id.clone(),
                data: record.data.clone(),
            })
            .collect()
    }

    /// 更新调度通知的数据 blob
    ///
    /// 未知 id 会插入新条目（insert-or-overwrite，时间字段置零）。
    pub fn update(&mut self, id: &str, data: &str) -> bool {
        if id.is_empty() {
            return false;
        }

        let record = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| ScheduledNotification {
                id: id.to_string(),
                data: String::new(),
                scheduled_date: 0,
                is_repeating: false,
                repeat_interval: 0,
            });
        record.data = data.to_string();
        self.prefs.set(&format!("{SCHEDULED_KEY_PREFIX}{id}"), data);
        true
    }

    /// 取消调度通知；未知 id 视为成功的无操作
    pub fn cancel(&mut self, id: &str) -> bool {
        self.entries.remove(id);
        self.prefs.remove_key(&format!("{SCHEDULED_KEY_PREFIX}{id}"));
        true
    }

    /// 取消全部调度通知，偏好存储中只清理本命名空间的键
    pub fn cancel_all(&mut self) -> bool {
        self.entries.clear();
        self.prefs.remove_by_prefix(SCHEDULED_KEY_PREFIX);
        true
    }

    /// 从偏好存储恢复内存映射（进程启动时调用）
    ///
    /// 只有数据 blob 被持久化，恢复的记录时间字段为零。
    /// 进程内已有的同名条目优先。
    pub fn rehydrate(&mut self) {
        let mut restored = 0usize;
        for (key, data) in self.prefs.entries_with_prefix(SCHEDULED_KEY_PREFIX) {
            let id = match key.strip_prefix(SCHEDULED_KEY_PREFIX) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => continue,
            };
            self.entries.entry(id.clone()).or_insert_with(|| {
                restored += 1;
                ScheduledNotification {
                    id,
                    data,
                    scheduled_date: 0,
                    is_repeating: false,
                    repeat_interval: 0,
                }
            });
        }
        if restored > 0 {
            debug!(count = restored, "Scheduled notifications rehydrated from store");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
