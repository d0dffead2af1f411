//! Notification Broker - 本地通知代理：去重、调度与交互事件回传
//!
//! 位于应用前端与 OS 通知设施之间：接收类型化的通知请求，做重复
//! 抑制和调度登记，经 `NotificationBackend` 适配器送达 OS，并把
//! 用户交互（动作按钮、点击、关闭）作为结构化事件回传给单一订阅者。

pub mod api;
pub mod backend;
pub mod broker;
pub mod clock;
pub mod dedup;
pub mod desktop;
pub mod prefs;
pub mod registry;
pub mod relay;
pub mod request;
pub mod scheduled;

pub use api::handle_method_call;
pub use backend::NotificationBackend;
pub use broker::NotificationBroker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use dedup::{DuplicateSuppressor, DUPLICATE_KEY_PREFIX};
pub use desktop::{DesktopBackend, DesktopSignal};
pub use prefs::PreferenceStore;
pub use registry::NotificationRegistry;
pub use relay::{BrokerEvent, EventRelay, EventSink};
pub use request::{ActionSpec, NotificationRequest, ScheduleRequest, DEFAULT_DUPLICATE_WINDOW_SECS};
pub use scheduled::{ScheduledEntry, ScheduledNotification, ScheduledStore, SCHEDULED_KEY_PREFIX};
