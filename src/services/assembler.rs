//! 响应组装
//!
//! 可见窗口过短时清空指标，避免展示超出可见数据的指标值。

use crate::error::{ChartError, ChartResult};
use crate::models::{Bar, ChartSeries, EnrichedBar, RangeToken};

/// 显示指标所需的最少K线数
pub const MIN_HISTORY_BARS: usize = 3;

pub fn has_minimum_history(len: usize) -> bool {
    len >= MIN_HISTORY_BARS
}

/// 数据源没有任何K线时返回 `NoData`
pub fn ensure_has_data(code: &str, bars: &[Bar]) -> ChartResult<()> {
    if bars.is_empty() {
        return Err(ChartError::NoData {
            code: code.to_string(),
        });
    }
    Ok(())
}

/// 组装最终的图表数据
pub fn assemble(
    symbol: &str,
    range: Option<RangeToken>,
    latest: Option<Bar>,
    sliced: Vec<EnrichedBar>,
) -> ChartSeries {
    let bars = if has_minimum_history(sliced.len()) {
        sliced
    } else {
        if sliced.iter().any(|b| !b.indicators.is_empty()) {
            log::debug!("{} 可见K线仅 {} 根，不显示指标", symbol, sliced.len());
        }
        sliced
            .into_iter()
            .map(EnrichedBar::without_indicators)
            .collect()
    };

    ChartSeries {
        symbol: symbol.to_string(),
        range,
        latest,
        bars,
    }
}
