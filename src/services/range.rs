//! 区间截取
//!
//! 以日本时间的今天为锚点，按区间参数截取序列的尾部。

use chrono::{Months, NaiveDate};

use crate::models::{EnrichedBar, RangeToken};

/// 区间的起始日期（含）
///
/// 先按月份回退（目标月份没有该日时取月末），再取其次日，
/// 使窗口恰好覆盖一个完整跨度。例如今天为 2024-03-31、区间 1m 时，
/// 回退得到 2024-02-29，起始日为 2024-03-01。
pub fn lower_bound(token: RangeToken, today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(token.months()))
        .and_then(|anniversary| anniversary.succ_opt())
        .unwrap_or(NaiveDate::MIN)
}

/// 截取日期不早于起始日的K线，保持原有顺序
///
/// 未指定区间时原样返回；起始日早于最早的K线时从最早的K线开始，不做填充。
pub fn slice_range(
    mut series: Vec<EnrichedBar>,
    token: Option<RangeToken>,
    today: NaiveDate,
) -> Vec<EnrichedBar> {
    let Some(token) = token else {
        return series;
    };

    let bound = lower_bound(token, today);
    let start = series.partition_point(|bar| bar.date() < bound);
    log::debug!(
        "区间 {} 起始日 {}，保留 {}/{} 根K线",
        token,
        bound,
        series.len() - start,
        series.len()
    );

    series.split_off(start)
}
