//! 通知代理 - 请求面板的编排器
//!
//! 接收应用侧的类型化请求，依次经过去重检查、OS 渲染、注册表登记，
//! 并把后端回调翻译成回传事件。对应用边界的契约：每个操作同步返回
//! bool/值，从不抛错；内部诊断全部走 tracing。
//!
//! show 的顺序约束：去重 key 一旦通过检查立即被消费（mark_sent），
//! 之后渲染失败也不回滚，单次尝试即终态，无重试。

use crate::backend::NotificationBackend;
use crate::clock::Clock;
use crate::dedup::DuplicateSuppressor;
use crate::prefs::PreferenceStore;
use crate::registry::NotificationRegistry;
use crate::relay::{BrokerEvent, EventRelay, EventSink};
use crate::request::{NotificationRequest, ScheduleRequest};
use crate::scheduled::{ScheduledEntry, ScheduledStore};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// 通知代理
pub struct NotificationBroker<B: NotificationBackend> {
    backend: B,
    prefs: PreferenceStore,
    dedup: DuplicateSuppressor,
    // OS 回调线程与请求线程并发访问，互斥保护
    registry: Mutex<NotificationRegistry<B::Handle>>,
    scheduled: Mutex<ScheduledStore>,
    relay: EventRelay,
}

impl<B: NotificationBackend> NotificationBroker<B> {
    /// 使用默认偏好存储路径创建
    pub fn new(backend: B) -> Self {
        Self::with_store(backend, PreferenceStore::new())
    }

    /// 使用指定偏好存储创建（测试用临时目录）
    pub fn with_store(backend: B, prefs: PreferenceStore) -> Self {
        Self {
            backend,
            dedup: DuplicateSuppressor::new(prefs.clone()),
            scheduled: Mutex::new(ScheduledStore::new(prefs.clone())),
            registry: Mutex::new(NotificationRegistry::new()),
            relay: EventRelay::new(),
            prefs,
        }
    }

    /// 注入时钟（测试用）
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.dedup = DuplicateSuppressor::new(self.prefs.clone()).with_clock(clock);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ------------------------------------------------------------------
    // 请求面板（每个方法对应一个 wire 方法名）
    // ------------------------------------------------------------------

    /// initialize：初始化后端并从存储恢复调度记录
    pub fn initialize(&self) -> bool {
        if let Err(e) = self.backend.initialize() {
            warn!(error = %e, "Backend initialization failed");
            return false;
        }
        self.lock_scheduled().rehydrate();
        true
    }

    /// requestPermissions
    pub fn request_permissions(&self) -> bool {
        self.backend.request_permissions()
    }

    /// areNotificationsEnabled
    pub fn are_notifications_enabled(&self) -> bool {
        self.backend.notifications_enabled()
    }

    /// showNotification：校验 → 去重 → 渲染 → 登记
    pub fn show_notification(&self, request: &NotificationRequest) -> bool {
        if !request.is_valid() {
            warn!(id = %request.id, "Show rejected: id, title and body are required");
            return false;
        }

        if let Some(key) = request.duplicate_key.as_deref() {
            let window = request.duplicate_window_secs();
            if self.dedup.is_duplicate(key, window) {
                return false;
            }
            // 此处即消费 key；后续渲染失败不回滚
            self.dedup.mark_sent(key);
        }

        let handle = match self.backend.render(request) {
            Ok(h) => h,
            Err(e) => {
                warn!(id = %request.id, error = %e, "Backend render failed");
                return false;
            }
        };

        let superseded = self.lock_registry().register(&request.id, handle);
        if let Some(old) = superseded {
            // 同 id 的旧通知被取代，显式关闭旧句柄
            debug!(id = %request.id, "Superseding live notification");
            if let Err(e) = self.backend.close(&old) {
                debug!(id = %request.id, error = %e, "Superseded handle close failed");
            }
        }
        true
    }

    /// cancelNotification：未知 id 是成功的无操作，重复取消幂等
    pub fn cancel_notification(&self, id: &str) -> bool {
        if let Some(handle) = self.lock_registry().remove(id) {
            if let Err(e) = self.backend.close(&handle) {
                debug!(id = %id, error = %e, "Notification close failed");
            }
        }
        true
    }

    /// cancelAllNotifications
    pub fn cancel_all_notifications(&self) -> bool {
        let drained = self.lock_registry().drain();
        for (id, handle) in drained {
            if let Err(e) = self.backend.close(&handle) {
                debug!(id = %id, error = %e, "Notification close failed");
            }
        }
        true
    }

    /// scheduleNotification：仅登记，不存在未来触发的定时器
    pub fn schedule_notification(&self, request: &ScheduleRequest) -> bool {
        if !request.is_valid() {
            warn!(id = %request.id, "Schedule rejected: id, request and scheduledDate are required");
            return false;
        }
        let scheduled_date = match request.scheduled_date {
            Some(date) => date,
            None => return false,
        };
        self.lock_scheduled().schedule(
            &request.id,
            &request.request,
            scheduled_date,
            request.is_repeating,
            request.repeat_interval,
        )
    }

    /// getScheduledNotifications
    pub fn get_scheduled_notifications(&self) -> Vec<ScheduledEntry> {
        self.lock_scheduled().list()
    }

    /// updateScheduledNotification
    pub fn update_scheduled_notification(&self, id: &str, data: &str) -> bool {
        self.lock_scheduled().update(id, data)
    }

    /// cancelScheduledNotification
    pub fn cancel_scheduled_notification(&self, id: &str) -> bool {
        self.lock_scheduled().cancel(id)
    }

    /// cancelAllScheduledNotifications
    pub fn cancel_all_scheduled_notifications(&self) -> bool {
        self.lock_scheduled().cancel_all()
    }

    /// getBadgeCount
    pub fn get_badge_count(&self) -> i64 {
        self.backend.badge_count()
    }

    /// setBadgeCount
    pub fn set_badge_count(&self, count: i64) -> bool {
        self.backend.set_badge_count(count)
    }

    /// clearBadgeCount
    pub fn clear_badge_count(&self) -> bool {
        self.backend.clear_badge_count()
    }

    /// isDuplicateNotification
    pub fn is_duplicate_notification(&self, key: &str, window_seconds: i64) -> bool {
        self.dedup.is_duplicate(key, window_seconds)
    }

    /// clearNotificationHistory：删除整个偏好文件
    pub fn clear_notification_history(&self) -> bool {
        self.prefs.clear();
        true
    }

    // ------------------------------------------------------------------
    // 事件订阅
    // ------------------------------------------------------------------

    /// 注册事件订阅者（替换旧的）
    pub fn set_event_sink(&self, sink: EventSink) {
        self.relay.set_sink(sink);
    }

    /// 清除事件订阅者
    pub fn clear_event_sink(&self) {
        self.relay.clear_sink();
    }

    // ------------------------------------------------------------------
    // 后端回调入口（OS 线程调用；内部状态互斥保护）
    // ------------------------------------------------------------------

    /// 动作按钮被按下（libnotify 风格后端）
    pub fn notify_action_invoked(&self, handle: &B::Handle, action_id: &str) {
        let notification_id = self.lock_registry().resolve_id(handle);
        self.relay.publish(BrokerEvent::Action {
            action_id: action_id.to_string(),
            notification_id,
        });
    }

    /// 通知本体被点击（toast 风格后端）
    pub fn notify_activated(&self, handle: &B::Handle) {
        let notification_id = self.lock_registry().resolve_id(handle);
        self.relay.publish(BrokerEvent::Tap { notification_id });
    }

    /// 通知被关闭：清理注册表，再回传 dismissed
    ///
    /// 被取代的旧句柄不再出现在注册表中，它迟到的关闭事件在这里
    /// 自然成为无操作。
    pub fn notify_closed(&self, handle: &B::Handle) {
        let evicted = self.lock_registry().evict_handle(handle);
        match evicted {
            Some(id) => {
                self.relay.publish(BrokerEvent::Dismissed {
                    notification_id: Some(id),
                });
            }
            None => {
                debug!("Close event for unknown handle ignored");
            }
        }
    }

    // 锁中毒时恢复内部数据继续服务（可用性优先）
    fn lock_registry(&self) -> MutexGuard<'_, NotificationRegistry<B::Handle>> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_scheduled(&self) -> MutexGuard<'_, ScheduledStore> {
        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
