//! 请求类型 - 应用侧提交的通知请求与调度请求
//!
//! 字段名按 camelCase 序列化，与方法调用层的 wire 格式一致。

use serde::{Deserialize, Serialize};

/// duplicateWindow 缺省值（秒）
pub const DEFAULT_DUPLICATE_WINDOW_SECS: i64 = 300;

/// 通知动作按钮
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub destructive: bool,
}

impl ActionSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            destructive: false,
        }
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// 立即显示的通知请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// 应用分配的通知 id，同一时刻每个 id 至多一条存活通知
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// 有序的动作按钮列表
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    /// 不透明字符串，原样带回后续的交互事件
    #[serde(default)]
    pub payload: String,
    /// 重复抑制键；缺省时不做去重
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_key: Option<String>,
    /// 重复抑制窗口（秒），缺省 300
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_window: Option<i64>,
}

impl NotificationRequest {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// 追加动作按钮
    pub fn with_action(mut self, action: ActionSpec) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_duplicate_key(mut self, key: impl Into<String>) -> Self {
        self.duplicate_key = Some(key.into());
        self
    }

    pub fn with_duplicate_window(mut self, seconds: i64) -> Self {
        self.duplicate_window = Some(seconds);
        self
    }

    /// 必填字段校验：id、title、body
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.title.is_empty() && !self.body.is_empty()
    }

    /// 去重窗口（应用缺省值）
    pub fn duplicate_window_secs(&self) -> i64 {
        self.duplicate_window.unwrap_or(DEFAULT_DUPLICATE_WINDOW_SECS)
    }
}

/// 调度通知请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    #[serde(default)]
    pub id: String,
    /// 序列化的请求 blob，核心不解释内容
    #[serde(default)]
    pub request: String,
    /// 预定触发时间（epoch 秒）；缺省则拒绝
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<i64>,
    #[serde(default)]
    pub is_repeating: bool,
    #[serde(default)]
    pub repeat_interval: i64,
}

impl ScheduleRequest {
    pub fn new(id: impl Into<String>, request: impl Into<String>, scheduled_date: i64) -> Self {
        Self {
            id: id.into(),
            request: request.into(),
            scheduled_date: Some(scheduled_date),
            ..Self::default()
        }
    }

    pub fn repeating(mut self, interval_seconds: i64) -> Self {
        self.is_repeating = true;
        self.repeat_interval = interval_seconds;
        self
    }

    /// 必填字段校验：id、request、scheduledDate
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.request.is_empty() && self.scheduled_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(NotificationRequest::new("n1", "T", "B").is_valid());
        assert!(!NotificationRequest::new("", "T", "B").is_valid());
        assert!(!NotificationRequest::new("n1", "", "B").is_valid());
        assert!(!NotificationRequest::new("n1", "T", "").is_valid());
    }

    #[test]
    fn test_duplicate_window_default() {
        let req = NotificationRequest::new("n1", "T", "B");
        assert_eq!(req.duplicate_window_secs(), 300);

        let req = req.with_duplicate_window(60);
        assert_eq!(req.duplicate_window_secs(), 60);
    }

    #[test]
    fn test_request_wire_format_is_camel_case() {
        let json = r#"{
            "id": "n1",
            "title": "T",
            "body": "B",
            "actions": [{"id": "del", "title": "Delete", "destructive": true}],
            "payload": "p",
            "duplicateKey": "promoX",
            "duplicateWindow": 60
        }"#;
        let req: NotificationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.id, "n1");
        assert_eq!(req.duplicate_key.as_deref(), Some("promoX"));
        assert_eq!(req.duplicate_window, Some(60));
        assert_eq!(req.actions.len(), 1);
        assert!(req.actions[0].destructive);
    }

    #[test]
    fn test_request_optional_fields_default() {
        // 只有必填字段的最小请求
        let req: NotificationRequest =
            serde_json::from_str(r#"{"id":"n1","title":"T","body":"B"}"#).unwrap();
        assert!(req.is_valid());
        assert!(req.actions.is_empty());
        assert_eq!(req.payload, "");
        assert!(req.duplicate_key.is_none());
    }

    #[test]
    fn test_schedule_request_validation() {
        assert!(ScheduleRequest::new("s1", "{}", 1_700_000_000).is_valid());
        assert!(!ScheduleRequest::new("", "{}", 0).is_valid());
        assert!(!ScheduleRequest::new("s1", "", 0).is_valid());

        // scheduledDate 缺省则拒绝
        let req: ScheduleRequest =
            serde_json::from_str(r#"{"id":"s1","request":"{}"}"#).unwrap();
        assert!(!req.is_valid());
    }

    #[test]
    fn test_schedule_request_wire_format() {
        let json = r#"{
            "id": "s1",
            "request": "{\"x\":1}",
            "scheduledDate": 1700000000,
            "isRepeating": true,
            "repeatInterval": 3600
        }"#;
        let req: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.scheduled_date, Some(1_700_000_000));
        assert!(req.is_repeating);
        assert_eq!(req.repeat_interval, 3600);
    }
}
