//! 偏好存储 - 单一 JSON 文件的键值持久化
//!
//! 所有键共享一个扁平命名空间，按前缀区分用途：
//! - `duplicate_<key>` → 去重时间戳（epoch 秒字符串）
//! - `scheduled_notification_<id>` → 序列化的调度请求
//! - 其余为普通偏好键值
//!
//! 每次写入都是 加载-合并-整体重写，通过临时文件 + rename 原子替换。
//! 读写失败一律降级为空值/无操作，不向调用方抛错。

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// 偏好文件名
pub const PREF_FILE: &str = "notification_broker_prefs.json";

/// 偏好存储（仅持有文件路径，无内存缓存）
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// 默认存储路径：`<用户数据目录>/notification-broker/notification_broker_prefs.json`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notification-broker")
            .join(PREF_FILE)
    }

    /// 使用默认路径创建存储
    pub fn new() -> Self {
        Self::at(Self::default_path())
    }

    /// 使用指定路径创建存储（测试用临时目录）
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 存储文件路径
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// 读取键值；键不存在、文件缺失或损坏时返回空字符串
    pub fn get(&self, key: &str) -> String {
        match self.load().get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// 写入键值：加载现有文件、合并、整体重写
    pub fn set(&self, key: &str, value: &str) {
        let mut map = self.load();
        map.insert(key.to_string(), Value::String(value.to_string()));
        if let Err(e) = self.write(&map) {
            warn!(key = %key, error = %e, "Preference write failed");
        }
    }

    /// 删除单个键；键不存在时无操作
    pub fn remove_key(&self, key: &str) {
        let mut map = self.load();
        if map.remove(key).is_some() {
            if let Err(e) = self.write(&map) {
                warn!(key = %key, error = %e, "Preference write failed");
            }
        }
    }

    /// 删除所有匹配前缀的键，其余键保持不动
    pub fn remove_by_prefix(&self, prefix: &str) {
        let mut map = self.load();
        let before = map.len();
        map.retain(|k, _| !k.starts_with(prefix));
        if map.len() != before {
            if let Err(e) = self.write(&map) {
                warn!(prefix = %prefix, error = %e, "Preference write failed");
            }
        }
    }

    /// 列出所有匹配前缀的键值对
    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.load()
            .into_iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect()
    }

    /// 删除整个偏好文件
    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(error = %e, "Preference file removal failed");
            }
        }
    }

    /// 加载整个文件为 JSON 对象；缺失或无法解析时从空对象开始
    fn load(&self) -> Map<String, Value> {
        if !self.path.exists() {
            return Map::new();
        }

        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                debug!(error = %e, "Preference file unreadable, treating as empty");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            _ => {
                debug!("Preference file malformed, treating as empty");
                Map::new()
            }
        }
    }

    /// 整体重写：独占锁 + 临时文件 + 原子 rename
    fn write(&self, map: &Map<String, Value>) -> Result<()> {
        use fs2::FileExt;

        // 首次使用时创建数据目录
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("create data dir")?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.path)
            .context("open preference file")?;
        lock_file.lock_exclusive().context("lock preference file")?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut temp = File::create(&temp_path).context("create temp file")?;
            let text = serde_json::to_string(&Value::Object(map.clone()))?;
            temp.write_all(text.as_bytes()).context("write temp file")?;
        }
        fs::rename(&temp_path, &self.path).context("replace preference file")?;

        lock_file.unlock().context("unlock preference file")?;
        Ok(())
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}
