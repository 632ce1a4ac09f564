//! 通用 API 响应模型
//!
//! 定义统一的 API 响应格式

use serde::Serialize;

use super::{Bar, EnrichedBar, RangeToken};
use crate::error::ErrorCode;

/// 统一 API 响应结构
///
/// 所有接口返回统一格式，包含：
/// - success: 请求是否成功
/// - code: 错误码（仅失败时出现）
/// - data: 响应数据（仅成功时出现）
/// - message: 响应消息
/// - timestamp: 响应时间戳（日本时间）
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 错误码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 响应消息
    pub message: String,
    /// 响应时间戳（ISO 8601 格式）
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    ///
    /// # 参数
    /// - data: 响应数据
    /// - timestamp: 响应时间
    pub fn success(data: T, timestamp: String) -> Self {
        Self {
            success: true,
            code: None,
            data: Some(data),
            message: "Success".to_string(),
            timestamp,
        }
    }

    /// 创建错误响应
    ///
    /// # 参数
    /// - code: 错误码
    /// - message: 错误信息
    pub fn error(code: ErrorCode, message: String, timestamp: String) -> Self {
        Self {
            success: false,
            code: Some(code),
            data: None,
            message,
            timestamp,
        }
    }
}

/// 图表数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// 证券代码
    pub symbol: String,
    /// 实际使用的区间（未指定时为 null）
    pub range: Option<RangeToken>,
    /// 盘中未确定的当日K线，只作为最新价展示
    pub latest: Option<Bar>,
    /// 按日期升序的K线及指标
    pub bars: Vec<EnrichedBar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let response = ApiResponse::<ChartSeries>::error(
            ErrorCode::NoData,
            "没有数据".to_string(),
            "2024-03-31T09:00:00+09:00".to_string(),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["code"], "no_data");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_success_response_has_no_code() {
        let series = ChartSeries {
            symbol: "7203".to_string(),
            range: None,
            latest: None,
            bars: Vec::new(),
        };
        let value = serde_json::to_value(ApiResponse::success(series, String::new())).unwrap();

        assert_eq!(value["success"], true);
        assert!(value.get("code").is_none());
        assert!(value["data"]["range"].is_null());
    }
}
