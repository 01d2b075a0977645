//! 客户端状态 - 基础设施层
//!
//! 由核心之外持有的 key -> bool 存储（例如“参与中的课程”、购物车）。
//! 按需注入，测试中可替换为内存实现。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::FileError;

/// key -> bool 存储接口
pub trait ClientStateStore {
    /// 不存在的 key 读取为 `false`
    fn get(&self, key: &str) -> bool;

    fn set(&mut self, key: &str, value: bool) -> Result<(), FileError>;

    /// 当前为 `true` 的 key
    fn keys(&self) -> Vec<String>;
}

/// 内存存储
#[derive(Debug, Clone, Default)]
pub struct MemoryClientState {
    entries: BTreeMap<String, bool>,
}

impl MemoryClientState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStateStore for MemoryClientState {
    fn get(&self, key: &str) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: &str, value: bool) -> Result<(), FileError> {
        if value {
            self.entries.insert(key.to_string(), true);
        } else {
            self.entries.remove(key);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// 以 JSON 对象持久化的存储，每次修改立即写盘
#[derive(Debug)]
pub struct JsonFileClientState {
    path: PathBuf,
    entries: BTreeMap<String, bool>,
}

impl JsonFileClientState {
    /// 打开文件，文件不存在时从空状态开始
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref().to_path_buf();
        let shown = path.display().to_string();

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| FileError::JsonFailed {
                path: shown.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(FileError::read_failed(shown, e)),
        };

        debug!("客户端状态 {} 已打开，共 {} 条", shown, entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), FileError> {
        let shown = self.path.display().to_string();
        let raw = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            FileError::JsonFailed {
                path: shown.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, raw).map_err(|e| FileError::write_failed(shown, e))
    }
}

impl ClientStateStore for JsonFileClientState {
    fn get(&self, key: &str) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: &str, value: bool) -> Result<(), FileError> {
        let previous = self.entries.clone();
        if value {
            self.entries.insert(key.to_string(), true);
        } else {
            self.entries.remove(key);
        }
        if let Err(e) = self.save() {
            self.entries = previous;
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryClientState::new();
        assert!(!store.get("participating:1"));
        store.set("participating:1", true).unwrap();
        assert!(store.get("participating:1"));
        store.set("participating:1", false).unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_json_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = JsonFileClientState::open(&path).unwrap();
        store.set("cart:3", true).unwrap();
        store.set("participating:3", true).unwrap();
        drop(store);

        let reopened = JsonFileClientState::open(&path).unwrap();
        assert!(reopened.get("cart:3"));
        assert_eq!(reopened.keys().len(), 2);
    }

    #[test]
    fn test_json_store_opens_missing_file_with_debug_logging() {
        crate::utils::logging::init(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");

        let store = JsonFileClientState::open(&path).unwrap();
        assert!(store.keys().is_empty());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            JsonFileClientState::open(&path),
            Err(FileError::JsonFailed { .. })
        ));
    }
}
