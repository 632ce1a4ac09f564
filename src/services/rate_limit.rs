//! 按客户端限流
//!
//! 令牌桶算法。限流器在 `main` 中创建，由 `AppState` 持有，随进程退出释放。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// 限流器
#[derive(Debug)]
pub struct RateLimiter {
    /// 桶容量（每分钟请求数），0 表示不限流
    capacity: f64,
    /// 每秒补充的令牌数
    refill_per_sec: f64,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            capacity: requests_per_minute as f64,
            refill_per_sec: requests_per_minute as f64 / 60.0,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0.0
    }

    /// 消耗一个令牌，返回是否放行
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let bucket = buckets.entry(client.to_string()).or_insert(TokenBucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            log::warn!("客户端 {} 请求过于频繁", client);
            false
        }
    }

    /// 清理长时间未访问的客户端，返回清理数量
    pub fn purge_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < idle);
        before - buckets.len()
    }
}
