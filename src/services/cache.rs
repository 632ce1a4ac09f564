//! 带过期时间的键值缓存
//!
//! 由调用方创建并注入，不使用全局单例。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 键值存储接口，每次写入都显式指定 TTL
pub trait KvStore<V: Clone>: Send + Sync {
    /// 读取未过期的值
    fn get(&self, key: &str) -> Option<V>;
    /// 写入并设置过期时间
    fn put(&self, key: String, value: V, ttl: Duration);
    /// 清理已过期条目，返回清理数量
    fn purge_expired(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// 进程内存储
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V: Clone + Send> KvStore<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.lock()
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    fn put(&self, key: String, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.lock().insert(key, Entry { value, expires_at });
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let store = MemoryStore::new();
        store.put("7203".to_string(), vec![1, 2, 3], Duration::from_secs(300));

        assert_eq!(store.get("7203"), Some(vec![1, 2, 3]));
        assert_eq!(store.get("6758"), None);
    }

    #[test]
    fn test_expired_entry_is_not_returned() {
        let store = MemoryStore::new();
        store.put("7203".to_string(), 42, Duration::ZERO);

        assert_eq!(store.get("7203"), None);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.purge_expired(), 0);
    }
}
