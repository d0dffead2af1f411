//! 事件回传 - 单订阅者的即发即弃分发
//!
//! OS 回调产生的交互事件（动作按钮、点击、关闭）通过这里回传给应用。
//! 同一时刻最多一个订阅者：`set_sink` 替换旧的，`clear_sink` 清除。
//! 无订阅者时事件直接丢弃，不排队也不重放。

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

/// 订阅者回调
pub type EventSink = Box<dyn Fn(BrokerEvent) + Send>;

/// 回传给应用的交互事件
///
/// wire 格式：`{"type":"action"|"tap"|"dismissed", "actionId"?, "notificationId"?}`。
/// `notificationId` 无法解析时字段缺省，事件仍然投递。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BrokerEvent {
    /// 动作按钮被按下
    Action {
        #[serde(rename = "actionId")]
        action_id: String,
        #[serde(
            rename = "notificationId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        notification_id: Option<String>,
    },
    /// 通知本体被点击
    Tap {
        #[serde(
            rename = "notificationId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        notification_id: Option<String>,
    },
    /// 通知被关闭
    Dismissed {
        #[serde(
            rename = "notificationId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        notification_id: Option<String>,
    },
}

/// 事件回传器
pub struct EventRelay {
    sink: Mutex<Option<EventSink>>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self {
            sink: Mutex::new(None),
        }
    }

    /// 注册订阅者，替换之前的
    pub fn set_sink(&self, sink: EventSink) {
        let mut guard = self.lock_sink();
        *guard = Some(sink);
    }

    /// 清除订阅者
    pub fn clear_sink(&self) {
        let mut guard = self.lock_sink();
        *guard = None;
    }

    pub fn has_sink(&self) -> bool {
        self.lock_sink().is_some()
    }

    /// 投递事件；返回是否有订阅者收到
    pub fn publish(&self, event: BrokerEvent) -> bool {
        let guard = self.lock_sink();
        match guard.as_ref() {
            Some(sink) => {
                sink(event);
                true
            }
            None => {
                debug!(?event, "Event dropped (no subscriber)");
                false
            }
        }
    }

    fn lock_sink(&self) -> std::sync::MutexGuard<'_, Option<EventSink>> {
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_publish_without_sink_is_dropped() {
        let relay = EventRelay::new();
        assert!(!relay.publish(BrokerEvent::Tap {
            notification_id: Some("n1".to_string()),
        }));
    }

    #[test]
    fn test_sink_receives_events() {
        let relay = EventRelay::new();
        let (tx, rx) = channel();
        relay.set_sink(Box::new(move |event| {
            let _ = tx.send(event);
        }));

        let event = BrokerEvent::Action {
            action_id: "ok".to_string(),
            notification_id: Some("n1".to_string()),
        };
        assert!(relay.publish(event.clone()));
        assert_eq!(rx.recv().unwrap(), event);
    }

    #[test]
    fn test_set_sink_replaces_previous() {
        let relay = EventRelay::new();
        let (tx1, rx1) = channel();
        let (tx2, rx2) = channel();

        relay.set_sink(Box::new(move |e| {
            let _ = tx1.send(e);
        }));
        relay.set_sink(Box::new(move |e| {
            let _ = tx2.send(e);
        }));

        relay.publish(BrokerEvent::Tap {
            notification_id: None,
        });
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_clear_sink_drops_subsequent_events() {
        let relay = EventRelay::new();
        relay.set_sink(Box::new(|_| {}));
        assert!(relay.has_sink());

        relay.clear_sink();
        assert!(!relay.has_sink());
        assert!(!relay.publish(BrokerEvent::Tap {
            notification_id: None,
        }));
    }

    #[test]
    fn test_event_wire_format() {
        let event = BrokerEvent::Action {
            action_id: "reply".to_string(),
            notification_id: Some("n1".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"action","actionId":"reply","notificationId":"n1"}"#
        );

        // notificationId 缺省而不是写 null
        let anonymous = BrokerEvent::Tap {
            notification_id: None,
        };
        assert_eq!(
            serde_json::to_string(&anonymous).unwrap(),
            r#"{"type":"tap"}"#
        );

        let dismissed = BrokerEvent::Dismissed {
            notification_id: Some("n1".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&dismissed).unwrap(),
            r#"{"type":"dismissed","notificationId":"n1"}"#
        );
    }
}
