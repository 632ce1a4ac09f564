//! 交易日判定
//!
//! 所有“今天”的判断都以日本时间（Asia/Tokyo）为准。
//! 最后一根K线若属于今天，则视为盘中未确定，不参与指标计算。

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Tokyo;
use chrono_tz::Tz;

use crate::models::Bar;

/// 时间来源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定时钟，用于测试和回放
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 转换为日本时间
pub fn to_jst(now: DateTime<Utc>) -> DateTime<Tz> {
    now.with_timezone(&Tokyo)
}

/// 日本时间的当天日期
pub fn jst_today(now: DateTime<Utc>) -> NaiveDate {
    to_jst(now).date_naive()
}

/// 日本时间字符串（ISO 8601 格式，带+09:00时区）
pub fn jst_timestamp(now: DateTime<Utc>) -> String {
    to_jst(now).to_rfc3339()
}

/// K线日期不早于今天时，该交易日尚未收盘
pub fn is_unconfirmed_session(bar_date: NaiveDate, today: NaiveDate) -> bool {
    bar_date >= today
}

/// 剔除盘中K线后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct GuardedBars {
    /// 已收盘的K线
    pub finalized: Vec<Bar>,
    /// 被剔除的当日K线
    pub unconfirmed: Option<Bar>,
}

/// 只检查最后一根K线，属于今天则移出已确定序列
pub fn exclude_unconfirmed(mut bars: Vec<Bar>, now: DateTime<Utc>) -> GuardedBars {
    let today = jst_today(now);
    let in_session = bars
        .last()
        .map_or(false, |last| is_unconfirmed_session(last.date, today));
    let unconfirmed = if in_session { bars.pop() } else { None };

    if let Some(bar) = &unconfirmed {
        log::debug!("{} {} 尚未收盘，不参与指标计算", bar.code, bar.date);
    }

    GuardedBars {
        finalized: bars,
        unconfirmed,
    }
}
