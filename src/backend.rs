//! 后端能力接口 - 核心与 OS 通知设施之间的唯一边界
//!
//! 核心逻辑不依赖任何具体平台 API；每个目标平台实现一个适配器。
//! 徽标（badge）相关钩子带缺省实现：无原生支持的平台返回 0 / true。

use crate::request::NotificationRequest;
use anyhow::Result;

/// OS 通知设施的能力接口
pub trait NotificationBackend: Send + Sync {
    /// 渲染出的存活通知句柄；相等比较用于反向解析 id
    type Handle: Clone + PartialEq + Send;

    /// 初始化底层设施（对应 notify_init 之类的一次性准备）
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// 请求通知权限；无权限概念的平台直接返回 true
    fn request_permissions(&self) -> bool {
        true
    }

    /// 通知是否可用
    fn notifications_enabled(&self) -> bool {
        true
    }

    /// 由 title/body/actions 构造并显示 OS 通知，返回句柄
    fn render(&self, request: &NotificationRequest) -> Result<Self::Handle>;

    /// 关闭一条存活通知
    fn close(&self, handle: &Self::Handle) -> Result<()>;

    fn badge_count(&self) -> i64 {
        0
    }

    fn set_badge_count(&self, _count: i64) -> bool {
        true
    }

    fn clear_badge_count(&self) -> bool {
        true
    }
}
