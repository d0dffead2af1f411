//! 方法调用层 - 字符串方法名 + JSON 参数的请求面板
//!
//! 传输机制（方法通道、IPC、HTTP …）不在本 crate 范围内；这里只提供
//! 从 `(method, args)` 到类型化代理调用的多路分发，与边界契约保持
//! 一致：参数缺失或格式错误返回 `false`，未知方法返回 `null`。

use crate::backend::NotificationBackend;
use crate::broker::NotificationBroker;
use crate::request::{NotificationRequest, ScheduleRequest};
use serde_json::{json, Value};
use tracing::warn;

/// 分发一次方法调用
pub fn handle_method_call<B: NotificationBackend>(
    broker: &NotificationBroker<B>,
    method: &str,
    args: &Value,
) -> Value {
    match method {
        "initialize" => json!(broker.initialize()),
        "requestPermissions" => json!(broker.request_permissions()),
        "areNotificationsEnabled" => json!(broker.are_notifications_enabled()),

        "showNotification" => match serde_json::from_value::<NotificationRequest>(args.clone()) {
            Ok(request) => json!(broker.show_notification(&request)),
            Err(e) => {
                warn!(error = %e, "showNotification: malformed arguments");
                json!(false)
            }
        },

        "scheduleNotification" => match serde_json::from_value::<ScheduleRequest>(args.clone()) {
            Ok(request) => json!(broker.schedule_notification(&request)),
            Err(e) => {
                warn!(error = %e, "scheduleNotification: malformed arguments");
                json!(false)
            }
        },

        "getScheduledNotifications" => {
            serde_json::to_value(broker.get_scheduled_notifications()).unwrap_or_else(|_| json!([]))
        }

        "updateScheduledNotification" => match str_arg(args, "id") {
            Some(id) => {
                let data = str_arg(args, "data").unwrap_or("{}");
                json!(broker.update_scheduled_notification(id, data))
            }
            None => json!(false),
        },

        "cancelNotification" => match str_arg(args, "id") {
            Some(id) => json!(broker.cancel_notification(id)),
            None => json!(false),
        },

        "cancelScheduledNotification" => match str_arg(args, "id") {
            Some(id) => json!(broker.cancel_scheduled_notification(id)),
            None => json!(false),
        },

        "cancelAllNotifications" => json!(broker.cancel_all_notifications()),
        "cancelAllScheduledNotifications" => json!(broker.cancel_all_scheduled_notifications()),

        "getBadgeCount" => json!(broker.get_badge_count()),
        "setBadgeCount" => match args.get("count").and_then(Value::as_i64) {
            Some(count) => json!(broker.set_badge_count(count)),
            None => json!(false),
        },
        "clearBadgeCount" => json!(broker.clear_badge_count()),

        "isDuplicateNotification" => {
            let id = str_arg(args, "id");
            let window = args.get("timeWindowSeconds").and_then(Value::as_i64);
            match (id, window) {
                (Some(id), Some(window)) => json!(broker.is_duplicate_notification(id, window)),
                _ => json!(false),
            }
        }

        "clearNotificationHistory" => json!(broker.clear_notification_history()),

        other => {
            warn!(method = %other, "Unknown method");
            Value::Null
        }
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::prefs::PreferenceStore;
    use anyhow::Result;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StubBackend {
        next_handle: AtomicU32,
    }

    impl StubBackend {
        fn new() -> Self {
            Self {
                next_handle: AtomicU32::new(1),
            }
        }
    }

    impl NotificationBackend for StubBackend {
        type Handle = u32;

        fn render(&self, _request: &NotificationRequest) -> Result<u32> {
            Ok(self.next_handle.fetch_add(1, Ordering::SeqCst))
        }

        fn close(&self, _handle: &u32) -> Result<()> {
            Ok(())
        }
    }

    fn api_broker() -> (TempDir, NotificationBroker<StubBackend>) {
        let dir = TempDir::new().unwrap();
        let prefs = PreferenceStore::at(dir.path().join("prefs.json"));
        let broker = NotificationBroker::with_store(StubBackend::new(), prefs)
            .with_clock(Arc::new(ManualClock::new(1_000_000)));
        (dir, broker)
    }

    #[test]
    fn test_probe_methods() {
        let (_dir, broker) = api_broker();
        assert_eq!(handle_method_call(&broker, "initialize", &json!({})), json!(true));
        assert_eq!(
            handle_method_call(&broker, "requestPermissions", &json!({})),
            json!(true)
        );
        assert_eq!(
            handle_method_call(&broker, "areNotificationsEnabled", &json!({})),
            json!(true)
        );
    }

    #[test]
    fn test_show_notification_via_method_call() {
        let (_dir, broker) = api_broker();
        let args = json!({"id": "n1", "title": "T", "body": "B"});
        assert_eq!(
            handle_method_call(&broker, "showNotification", &args),
            json!(true)
        );
    }

    #[test]
    fn test_show_notification_non_map_args_is_false() {
        let (_dir, broker) = api_broker();
        assert_eq!(
            handle_method_call(&broker, "showNotification", &json!("not a map")),
            json!(false)
        );
    }

    #[test]
    fn test_show_notification_missing_required_field_is_false() {
        let (_dir, broker) = api_broker();
        let args = json!({"id": "n1", "title": "T"});
        assert_eq!(
            handle_method_call(&broker, "showNotification", &args),
            json!(false)
        );
    }

    #[test]
    fn test_schedule_and_list_via_method_calls() {
        let (_dir, broker) = api_broker();
        let args = json!({
            "id": "s1",
            "request": "{\"x\":1}",
            "scheduledDate": 1_700_003_600i64
        });
        assert_eq!(
            handle_method_call(&broker, "scheduleNotification", &args),
            json!(true)
        );
        assert_eq!(
            handle_method_call(&broker, "getScheduledNotifications", &json!({})),
            json!([{"id": "s1", "data": "{\"x\":1}"}])
        );
        assert_eq!(
            handle_method_call(&broker, "cancelScheduledNotification", &json!({"id": "s1"})),
            json!(true)
        );
        assert_eq!(
            handle_method_call(&broker, "getScheduledNotifications", &json!({})),
            json!([])
        );
    }

    #[test]
    fn test_is_duplicate_requires_both_args() {
        let (_dir, broker) = api_broker();
        assert_eq!(
            handle_method_call(&broker, "isDuplicateNotification", &json!({"id": "k"})),
            json!(false)
        );
        assert_eq!(
            handle_method_call(
                &broker,
                "isDuplicateNotification",
                &json!({"timeWindowSeconds": 60})
            ),
            json!(false)
        );
        assert_eq!(
            handle_method_call(
                &broker,
                "isDuplicateNotification",
                &json!({"id": "k", "timeWindowSeconds": 60})
            ),
            json!(false)
        );
    }

    #[test]
    fn test_badge_methods() {
        let (_dir, broker) = api_broker();
        assert_eq!(handle_method_call(&broker, "getBadgeCount", &json!({})), json!(0));
        assert_eq!(
            handle_method_call(&broker, "setBadgeCount", &json!({"count": 3})),
            json!(true)
        );
        assert_eq!(
            handle_method_call(&broker, "setBadgeCount", &json!({})),
            json!(false)
        );
        assert_eq!(
            handle_method_call(&broker, "clearBadgeCount", &json!({})),
            json!(true)
        );
    }

    #[test]
    fn test_unknown_method_returns_null() {
        let (_dir, broker) = api_broker();
        assert_eq!(
            handle_method_call(&broker, "teleportNotification", &json!({})),
            Value::Null
        );
    }

    #[test]
    fn test_cancel_methods_tolerate_unknown_ids() {
        let (_dir, broker) = api_broker();
        assert_eq!(
            handle_method_call(&broker, "cancelNotification", &json!({"id": "ghost"})),
            json!(true)
        );
        assert_eq!(
            handle_method_call(&broker, "cancelNotification", &json!({})),
            json!(false)
        );
        assert_eq!(
            handle_method_call(&broker, "cancelAllNotifications", &json!({})),
            json!(true)
        );
    }
}
