//! 桌面后端 - notify-rust 适配器
//!
//! 动作映射为通知按钮；OS 侧的按钮/关闭信号经由每条通知一个的
//! 等待线程转成 `DesktopSignal`
//! 发到通道里，由宿主（CLI 或应用宿主）转发进代理的回调入口。
//! 纯机械绑定，无业务逻辑。

use crate::backend::NotificationBackend;
use crate::request::NotificationRequest;
use anyhow::{anyhow, Result};
use notify_rust::Notification;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::debug;

/// 等待线程转发出的 OS 信号
#[derive(Debug, Clone, PartialEq)]
pub enum DesktopSignal {
    /// 动作按钮被按下（包括通知服务器的 "default" 点击动作）
    Action { handle: u32, action_id: String },
    /// 通知被关闭或超时
    Closed { handle: u32 },
}

/// notify-rust 后端，句柄是通知服务器分配的 u32 id
pub struct DesktopBackend {
    app_name: String,
    signals: Sender<DesktopSignal>,
}

impl DesktopBackend {
    /// 创建后端和接收 OS 信号的通道
    pub fn new(app_name: impl Into<String>) -> (Self, Receiver<DesktopSignal>) {
        let (signals, receiver) = channel();
        (
            Self {
                app_name: app_name.into(),
                signals,
            },
            receiver,
        )
    }
}

impl NotificationBackend for DesktopBackend {
    type Handle = u32;

    fn render(&self, request: &NotificationRequest) -> Result<u32> {
        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&request.title)
            .body(&request.body);
        for action in &request.actions {
            // destructive 标记在 freedesktop 通知里没有对应概念，忽略
            notification.action(&action.id, &action.title);
        }

        let handle = notification
            .show()
            .map_err(|e| anyhow!("notification show failed: {e}"))?;
        let id = handle.id();

        // 等待线程独占句柄，动作或关闭后自然结束
        let signals = self.signals.clone();
        std::thread::spawn(move || {
            handle.wait_for_action(move |action| match action {
                "__closed" | "__timeout" => {
                    let _ = signals.send(DesktopSignal::Closed { handle: id });
                }
                action_id => {
                    let _ = signals.send(DesktopSignal::Action {
                        handle: id,
                        action_id: action_id.to_string(),
                    });
                }
            });
        });

        Ok(id)
    }

    fn close(&self, handle: &u32) -> Result<()> {
        // 真正的句柄归等待线程所有，这里无法主动关闭；
        // 通知由桌面环境超时回收，代理侧的注册表条目照常清理。
        debug!(handle = *handle, "Close requested; handle owned by wait loop");
        Ok(())
    }
}
