//! 区间参数模型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChartError;

/// 图表显示区间
///
/// 只影响截取的窗口，不影响指标的计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeToken {
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1m")]
    OneMonth,
}

impl RangeToken {
    /// 区间跨度（月）
    pub fn months(self) -> u32 {
        match self {
            RangeToken::FiveYears => 60,
            RangeToken::OneYear => 12,
            RangeToken::ThreeMonths => 3,
            RangeToken::OneMonth => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RangeToken::FiveYears => "5y",
            RangeToken::OneYear => "1y",
            RangeToken::ThreeMonths => "3m",
            RangeToken::OneMonth => "1m",
        }
    }

    /// 解析查询参数，无法识别时按“不限区间”处理
    pub fn parse_lenient(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
        match raw.parse() {
            Ok(token) => Some(token),
            Err(e) => {
                log::warn!("{}，返回完整区间", e);
                None
            }
        }
    }
}

impl FromStr for RangeToken {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "5y" => Ok(RangeToken::FiveYears),
            "1y" => Ok(RangeToken::OneYear),
            "3m" => Ok(RangeToken::ThreeMonths),
            "1m" => Ok(RangeToken::OneMonth),
            _ => Err(ChartError::InvalidRangeToken(s.to_string())),
        }
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 图表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    /// 区间：5y / 1y / 3m / 1m
    pub range: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tokens() {
        assert_eq!("5y".parse::<RangeToken>().unwrap(), RangeToken::FiveYears);
        assert_eq!("1Y".parse::<RangeToken>().unwrap(), RangeToken::OneYear);
        assert_eq!("3m".parse::<RangeToken>().unwrap(), RangeToken::ThreeMonths);
        assert_eq!("1m".parse::<RangeToken>().unwrap(), RangeToken::OneMonth);
    }

    #[test]
    fn test_unknown_token_falls_back_to_full_range() {
        assert!(matches!(
            "2w".parse::<RangeToken>(),
            Err(ChartError::InvalidRangeToken(_))
        ));
        assert_eq!(RangeToken::parse_lenient(Some("2w")), None);
        assert_eq!(RangeToken::parse_lenient(Some("")), None);
        assert_eq!(RangeToken::parse_lenient(None), None);
        assert_eq!(RangeToken::parse_lenient(Some(" 3m ")), Some(RangeToken::ThreeMonths));
    }

    #[test]
    fn test_serializes_as_token() {
        assert_eq!(serde_json::to_string(&RangeToken::OneMonth).unwrap(), "\"1m\"");
        assert_eq!(RangeToken::FiveYears.to_string(), "5y");
    }
}
