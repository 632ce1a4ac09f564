//! K线数据源
//!
//! 优先读取按代码拆分的文件 `<data_dir>/<code>.json`，
//! 不存在或为空时从汇总文件中按 `code` 字段筛选。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::cache::KvStore;
use crate::error::{ChartError, ChartResult};
use crate::models::Bar;

/// 汇总文件默认名称
pub const DEFAULT_CONSOLIDATED_FILE: &str = "all_bars.json";

/// K线数据源接口
///
/// 返回的序列按日期严格递增且每天只有一根K线。
pub trait BarRepository: Send + Sync {
    fn load_bars(&self, code: &str) -> ChartResult<Vec<Bar>>;
}

/// 代码只允许字母、数字和 `.`、`_`、`-`，且不能以 `.` 开头
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 32
        && !code.starts_with('.')
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// 本地 JSON 文件数据源
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    data_dir: PathBuf,
    consolidated_file: String,
}

impl JsonFileRepository {
    pub fn new<P: Into<PathBuf>>(data_dir: P, consolidated_file: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            consolidated_file: consolidated_file.into(),
        }
    }

    fn symbol_path(&self, code: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", code))
    }

    fn consolidated_path(&self) -> PathBuf {
        self.data_dir.join(&self.consolidated_file)
    }

    /// 读取并解析一个 JSON 数组文件，文件不存在时返回 `None`
    fn read_bars(path: &Path) -> ChartResult<Option<Vec<Bar>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let bars: Vec<Bar> = serde_json::from_str(&content).map_err(|e| {
            log::error!("解析数据源 {} 失败: {}", path.display(), e);
            ChartError::MalformedSource {
                source_id: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Some(bars))
    }
}

impl BarRepository for JsonFileRepository {
    fn load_bars(&self, code: &str) -> ChartResult<Vec<Bar>> {
        if !is_valid_code(code) {
            log::warn!("拒绝非法代码: {:?}", code);
            return Err(ChartError::NoData {
                code: code.to_string(),
            });
        }

        let symbol_path = self.symbol_path(code);
        if let Some(bars) = Self::read_bars(&symbol_path)? {
            if !bars.is_empty() {
                log::debug!("从 {} 读取 {} 根K线", symbol_path.display(), bars.len());
                return normalize(&symbol_path, bars);
            }
        }

        let consolidated_path = self.consolidated_path();
        if let Some(all) = Self::read_bars(&consolidated_path)? {
            let bars: Vec<Bar> = all.into_iter().filter(|bar| bar.code == code).collect();
            if !bars.is_empty() {
                log::debug!(
                    "{} 无单独文件，从汇总文件读取 {} 根K线",
                    code,
                    bars.len()
                );
                return normalize(&consolidated_path, bars);
            }
        }

        Err(ChartError::NoData {
            code: code.to_string(),
        })
    }
}

/// 校验价格并按日期排序去重，同一天出现多次时以后出现的记录为准
fn normalize(source: &Path, bars: Vec<Bar>) -> ChartResult<Vec<Bar>> {
    let mut by_date = BTreeMap::new();
    for bar in bars {
        bar.validate().map_err(|reason| {
            log::error!("数据源 {} 含无效K线: {}", source.display(), reason);
            ChartError::MalformedSource {
                source_id: source.display().to_string(),
                reason,
            }
        })?;
        by_date.insert(bar.date, bar);
    }
    Ok(by_date.into_values().collect())
}

/// 带缓存的数据源
///
/// 只缓存成功读取的结果，`NoData` 和解析错误不缓存。
pub struct CachedBarRepository<R> {
    inner: R,
    store: Arc<dyn KvStore<Vec<Bar>>>,
    ttl: Duration,
}

impl<R: BarRepository> CachedBarRepository<R> {
    pub fn new(inner: R, store: Arc<dyn KvStore<Vec<Bar>>>, ttl: Duration) -> Self {
        Self { inner, store, ttl }
    }
}

impl<R: BarRepository> BarRepository for CachedBarRepository<R> {
    fn load_bars(&self, code: &str) -> ChartResult<Vec<Bar>> {
        if let Some(bars) = self.store.get(code) {
            log::debug!("{} 命中缓存", code);
            return Ok(bars);
        }

        let bars = self.inner.load_bars(code)?;
        if !self.ttl.is_zero() {
            self.store.put(code.to_string(), bars.clone(), self.ttl);
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn repo(dir: &Path) -> JsonFileRepository {
        JsonFileRepository::new(dir, DEFAULT_CONSOLIDATED_FILE)
    }

    const SYMBOL_FILE: &str = r#"[
        {"code":"7203","date":"2024-03-26","open":10.0,"high":11.0,"low":9.0,"close":10.5,"volume":100},
        {"code":"7203","date":"2024-03-27","open":10.5,"high":11.5,"low":10.0,"close":11.0,"volume":120}
    ]"#;

    const CONSOLIDATED_FILE: &str = r#"[
        {"Code":"6758","Date":"2024-03-27","Open":20.0,"High":21.0,"Low":19.0,"Close":20.5,"Volume":50},
        {"Code":"7203","Date":"2024-03-27","Open":1.0,"High":1.0,"Low":1.0,"Close":1.0,"Volume":1},
        {"Code":"6758","Date":"2024-03-26","Open":19.0,"High":20.0,"Low":18.0,"Close":19.5,"Volume":40}
    ]"#;

    #[test]
    fn test_prefers_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "7203.json", SYMBOL_FILE);
        write(dir.path(), DEFAULT_CONSOLIDATED_FILE, CONSOLIDATED_FILE);

        let bars = repo(dir.path()).load_bars("7203").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, Some(11.0));
    }

    #[test]
    fn test_falls_back_to_consolidated_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DEFAULT_CONSOLIDATED_FILE, CONSOLIDATED_FILE);

        let bars = repo(dir.path()).load_bars("6758").unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars.iter().all(|b| b.code == "6758"));
        assert!(bars[0].date < bars[1].date);
    }

    #[test]
    fn test_empty_symbol_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "6758.json", "[]");
        write(dir.path(), DEFAULT_CONSOLIDATED_FILE, CONSOLIDATED_FILE);

        assert_eq!(repo(dir.path()).load_bars("6758").unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_symbol_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DEFAULT_CONSOLIDATED_FILE, CONSOLIDATED_FILE);

        let err = repo(dir.path()).load_bars("ZZZZ").unwrap_err();
        assert!(matches!(err, ChartError::NoData { .. }));

        let empty_dir = tempfile::tempdir().unwrap();
        let err = repo(empty_dir.path()).load_bars("ZZZZ").unwrap_err();
        assert!(matches!(err, ChartError::NoData { .. }));
    }

    #[test]
    fn test_malformed_file_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "7203.json", "{not json");

        match repo(dir.path()).load_bars("7203") {
            Err(ChartError::MalformedSource { source_id, .. }) => {
                assert!(source_id.ends_with("7203.json"));
            }
            other => panic!("expected MalformedSource, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_price_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "7203.json",
            r#"[{"code":"7203","date":"2024-03-26","open":-1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1}]"#,
        );

        let err = repo(dir.path()).load_bars("7203").unwrap_err();
        assert!(matches!(err, ChartError::MalformedSource { .. }));
    }

    #[test]
    fn test_duplicates_are_removed_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "7203.json",
            r#"[
                {"code":"7203","date":"2024-03-27","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1},
                {"code":"7203","date":"2024-03-26","open":2.0,"high":2.0,"low":2.0,"close":2.0,"volume":2},
                {"code":"7203","date":"2024-03-27","open":3.0,"high":3.0,"low":3.0,"close":3.0,"volume":3}
            ]"#,
        );

        let bars = repo(dir.path()).load_bars("7203").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, Some(2.0));
        assert_eq!(bars[1].close, Some(3.0));
    }

    #[test]
    fn test_path_like_codes_are_rejected() {
        assert!(is_valid_code("7203"));
        assert!(is_valid_code("BRK.B"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("../secret"));
        assert!(!is_valid_code(".hidden"));
        assert!(!is_valid_code("a/b"));
    }

    struct CountingRepository {
        calls: AtomicUsize,
    }

    impl BarRepository for CountingRepository {
        fn load_bars(&self, code: &str) -> ChartResult<Vec<Bar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if code == "ZZZZ" {
                return Err(ChartError::NoData {
                    code: code.to_string(),
                });
            }
            Ok(serde_json::from_str(SYMBOL_FILE).unwrap())
        }
    }

    #[test]
    fn test_cached_repository_reuses_result() {
        let cached = CachedBarRepository::new(
            CountingRepository {
                calls: AtomicUsize::new(0),
            },
            Arc::new(MemoryStore::<Vec<Bar>>::new()),
            Duration::from_secs(300),
        );

        let first = cached.load_bars("7203").unwrap();
        let second = cached.load_bars("7203").unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);

        assert!(cached.load_bars("ZZZZ").is_err());
        assert!(cached.load_bars("ZZZZ").is_err());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 3);
    }
}
