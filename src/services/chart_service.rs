//! 图表数据服务
//!
//! 数据源 → 剔除盘中K线 → 计算指标 → 区间截取 → 组装响应

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::assembler;
use super::calendar::{self, Clock};
use super::indicators::IndicatorEngine;
use super::range::slice_range;
use super::repository::BarRepository;
use crate::error::ChartResult;
use crate::models::{Bar, ChartSeries, RangeToken};

/// 由原始K线生成图表数据，不做任何 I/O
///
/// # 参数
/// - symbol: 证券代码
/// - bars: 数据源返回的K线（升序、无重复）
/// - range: 显示区间，`None` 表示完整序列
/// - now: 参考时间，决定“今天”
pub fn build_series(
    symbol: &str,
    bars: Vec<Bar>,
    range: Option<RangeToken>,
    now: DateTime<Utc>,
) -> ChartResult<ChartSeries> {
    assembler::ensure_has_data(symbol, &bars)?;

    let guarded = calendar::exclude_unconfirmed(bars, now);
    let enriched = IndicatorEngine::new().enrich(&guarded.finalized);
    let sliced = slice_range(enriched, range, calendar::jst_today(now));

    Ok(assembler::assemble(symbol, range, guarded.unconfirmed, sliced))
}

/// 图表服务
#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn BarRepository>,
    clock: Arc<dyn Clock>,
}

impl ChartService {
    pub fn new(repository: Arc<dyn BarRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// 读取数据源并生成图表数据（阻塞 I/O，需在阻塞线程池中调用）
    pub fn chart(&self, symbol: &str, range: Option<RangeToken>) -> ChartResult<ChartSeries> {
        let bars = self.repository.load_bars(symbol)?;
        build_series(symbol, bars, range, self.clock.now())
    }
}
