//! Notification Broker CLI
//!
//! 把代理接到 notify-rust 桌面后端上的小工具：显示/取消通知、
//! 登记和查询调度通知、检查去重状态、清空历史。

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use notification_broker::{
    ActionSpec, DesktopBackend, DesktopSignal, NotificationBroker, NotificationRequest,
    ScheduleRequest,
};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "nbk")]
#[command(about = "Notification Broker - 本地通知代理")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 显示一条通知
    Show {
        /// 通知 id（同 id 的新通知会取代旧的）
        id: String,
        title: String,
        body: String,
        /// 动作按钮，格式 "id=标题"，可重复
        #[arg(long, short)]
        action: Vec<String>,
        /// 不透明 payload，原样带回交互事件
        #[arg(long, default_value = "")]
        payload: String,
        /// 去重键；窗口内同 key 的通知会被抑制
        #[arg(long)]
        duplicate_key: Option<String>,
        /// 去重窗口（秒），缺省 300
        #[arg(long)]
        duplicate_window: Option<i64>,
        /// 显示后监听交互事件的秒数（事件以 JSON 行输出）
        #[arg(long, short, default_value = "0")]
        wait: u64,
    },
    /// 取消一条存活通知（未知 id 是无操作）
    Cancel {
        id: String,
    },
    /// 取消全部存活通知
    CancelAll,
    /// 登记一条调度通知（仅登记，不会在未来自动触发）
    Schedule {
        id: String,
        /// 序列化的请求 blob，由应用侧解释
        data: String,
        /// 预定触发时间（epoch 秒）
        #[arg(long)]
        at: i64,
        /// 重复间隔（秒）；提供时视为重复通知
        #[arg(long)]
        repeat_interval: Option<i64>,
    },
    /// 列出全部调度通知
    Scheduled {
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
    /// 取消一条调度通知
    CancelScheduled {
        id: String,
    },
    /// 取消全部调度通知
    CancelAllScheduled,
    /// 检查某个去重键是否在窗口内
    IsDuplicate {
        key: String,
        /// 窗口（秒）
        #[arg(long, default_value = "300")]
        window: i64,
    },
    /// 删除整个偏好文件（去重记录 + 调度记录）
    ClearHistory,
}

fn main() -> Result<()> {
    // RUST_LOG 控制日志级别，缺省 info，输出到 stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notification_broker=info,nbk=info"));
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let (backend, signals) = DesktopBackend::new("notification-broker");
    let broker = NotificationBroker::new(backend);
    if !broker.initialize() {
        bail!("broker initialization failed");
    }

    match cli.command {
        Commands::Show {
            id,
            title,
            body,
            action,
            payload,
            duplicate_key,
            duplicate_window,
            wait,
        } => {
            let mut request = NotificationRequest::new(id, title, body).with_payload(payload);
            for spec in &action {
                request = request.with_action(parse_action(spec)?);
            }
            if let Some(key) = duplicate_key {
                request = request.with_duplicate_key(key);
            }
            if let Some(window) = duplicate_window {
                request = request.with_duplicate_window(window);
            }

            let shown = broker.show_notification(&request);
            println!("{shown}");
            if shown && wait > 0 {
                pump_events(&broker, &signals, Duration::from_secs(wait));
            }
        }
        Commands::Cancel { id } => {
            println!("{}", broker.cancel_notification(&id));
        }
        Commands::CancelAll => {
            println!("{}", broker.cancel_all_notifications());
        }
        Commands::Schedule {
            id,
            data,
            at,
            repeat_interval,
        } => {
            let mut request = ScheduleRequest::new(id, data, at);
            if let Some(interval) = repeat_interval {
                request = request.repeating(interval);
            }
            println!("{}", broker.schedule_notification(&request));
        }
        Commands::Scheduled { json } => {
            let entries = broker.get_scheduled_notifications();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("（无调度通知）");
            } else {
                for entry in entries {
                    println!("{}\t{}", entry.id, entry.data);
                }
            }
        }
        Commands::CancelScheduled { id } => {
            println!("{}", broker.cancel_scheduled_notification(&id));
        }
        Commands::CancelAllScheduled => {
            println!("{}", broker.cancel_all_scheduled_notifications());
        }
        Commands::IsDuplicate { key, window } => {
            println!("{}", broker.is_duplicate_notification(&key, window));
        }
        Commands::ClearHistory => {
            println!("{}", broker.clear_notification_history());
        }
    }

    Ok(())
}

/// 解析 "id=标题" 形式的动作参数
fn parse_action(spec: &str) -> Result<ActionSpec> {
    match spec.split_once('=') {
        Some((id, title)) if !id.is_empty() && !title.is_empty() => {
            Ok(ActionSpec::new(id, title))
        }
        _ => bail!("invalid action spec {spec:?}, expected \"id=title\""),
    }
}

/// 把桌面信号转发进代理并以 JSON 行输出回传事件，直到超时
fn pump_events(
    broker: &NotificationBroker<DesktopBackend>,
    signals: &Receiver<DesktopSignal>,
    timeout: Duration,
) {
    broker.set_event_sink(Box::new(|event| {
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{line}");
        }
    }));

    info!(secs = timeout.as_secs(), "Listening for interaction events");
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = match deadline.checked_duration_since(Instant::now()) {
            Some(d) if !d.is_zero() => d,
            _ => break,
        };
        match signals.recv_timeout(remaining) {
            Ok(DesktopSignal::Action { handle, action_id }) => {
                broker.notify_action_invoked(&handle, &action_id);
            }
            Ok(DesktopSignal::Closed { handle }) => {
                broker.notify_closed(&handle);
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    broker.clear_event_sink();
}
