//! K线数据模型
//!
//! 定义日K线（Bar）与带技术指标的K线（EnrichedBar）

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 单个交易日的K线（日本时间 JST 的自然日）
///
/// 同时兼容小写字段和数据商的大写字段（`Date`、`Open` 等）。
/// 价格为 `null` 表示数据商当天未给出成交价（缺口K线）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 证券代码
    #[serde(alias = "Code")]
    pub code: String,
    /// 交易日期（YYYY-MM-DD）
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    /// 开盘价
    #[serde(default, alias = "Open")]
    pub open: Option<f64>,
    /// 最高价
    #[serde(default, alias = "High")]
    pub high: Option<f64>,
    /// 最低价
    #[serde(default, alias = "Low")]
    pub low: Option<f64>,
    /// 收盘价
    #[serde(default, alias = "Close")]
    pub close: Option<f64>,
    /// 成交量
    #[serde(default, alias = "Volume")]
    pub volume: Option<u64>,
}

impl Bar {
    /// 校验价格字段：出现的价格必须是有限正数
    pub fn validate(&self) -> Result<(), String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in prices {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(format!("{} {} 的 {} 无效: {}", self.code, self.date, name, v));
                }
            }
        }
        Ok(())
    }
}

/// 技术指标字段
///
/// 历史数据不足时对应字段为 `None`，序列化时直接省略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma_5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma_25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma_75: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_12: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_26: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd_hist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi_14: Option<f64>,
}

impl Indicators {
    /// 所有指标均缺失
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 带技术指标的K线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBar {
    #[serde(flatten)]
    pub bar: Bar,
    #[serde(flatten)]
    pub indicators: Indicators,
}

impl EnrichedBar {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    /// 清空指标，只保留原始 OHLCV
    pub fn without_indicators(self) -> Self {
        Self {
            bar: self.bar,
            indicators: Indicators::default(),
        }
    }
}
