//! 应用共享状态
//!
//! 在 `main` 中创建一次，通过 `web::Data` 注入处理器，进程退出时释放。

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::Bar;
use crate::services::cache::{KvStore, MemoryStore};
use crate::services::calendar::Clock;
use crate::services::chart_service::ChartService;
use crate::services::rate_limit::RateLimiter;
use crate::services::repository::{BarRepository, CachedBarRepository, JsonFileRepository};

pub struct AppState {
    pub chart: ChartService,
    pub limiter: RateLimiter,
    /// K线缓存，定期清理过期条目
    pub bar_cache: Option<Arc<dyn KvStore<Vec<Bar>>>>,
    /// Cache-Control 的 max-age（秒）
    pub cache_max_age: u64,
}

impl AppState {
    pub fn new(chart: ChartService, limiter: RateLimiter, cache_max_age: u64) -> Self {
        Self {
            chart,
            limiter,
            bar_cache: None,
            cache_max_age,
        }
    }

    /// 清理过期缓存和长时间未访问的限流记录
    pub fn purge(&self, idle: Duration) {
        let expired = self.bar_cache.as_ref().map_or(0, |store| store.purge_expired());
        let idle_clients = self.limiter.purge_idle(idle);
        if expired > 0 || idle_clients > 0 {
            log::debug!("清理过期缓存 {} 条，空闲客户端 {} 个", expired, idle_clients);
        }
    }

    /// 按配置组装：JSON 文件数据源 + 内存缓存 + 限流器
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let files = JsonFileRepository::new(&config.data.data_dir, config.data.consolidated_file.clone());
        let store: Arc<dyn KvStore<Vec<Bar>>> = Arc::new(MemoryStore::<Vec<Bar>>::new());
        let repository: Arc<dyn BarRepository> =
            Arc::new(CachedBarRepository::new(files, store.clone(), config.cache_ttl()));

        Self {
            bar_cache: Some(store),
            ..Self::new(
                ChartService::new(repository, clock),
                RateLimiter::new(config.api.rate_limit_per_minute),
                config.api.cache_ttl_secs,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::calendar::FixedClock;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_from_config_reads_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("7203.json"),
            r#"[{"code":"7203","date":"2024-03-28","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1}]"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.data.data_dir = dir.path().display().to_string();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap());
        let state = AppState::from_config(&config, Arc::new(clock));

        let series = state.chart.chart("7203", None).unwrap();
        assert_eq!(series.bars.len(), 1);
        assert!(state.bar_cache.as_ref().unwrap().get("7203").is_some());

        state.purge(Duration::from_secs(600));
        assert!(state.bar_cache.as_ref().unwrap().get("7203").is_some());
    }
}
