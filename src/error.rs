//! 错误定义
//!
//! 数据源读取与图表流水线共用的错误类型

use actix_web::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// 对外暴露的稳定错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NoData,
    InternalError,
    RateLimited,
    Unauthorized,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NoData => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

/// 图表服务错误
#[derive(Debug, Error)]
pub enum ChartError {
    /// 数据源中没有该代码的任何K线
    #[error("没有找到代码 {code} 的K线数据")]
    NoData { code: String },

    /// 数据源内容无法解析为K线
    #[error("数据源 {source_id} 解析失败: {reason}")]
    MalformedSource { source_id: String, reason: String },

    /// 无法识别的区间参数
    #[error("无效的区间参数: {0}")]
    InvalidRangeToken(String),

    #[error("读取数据源失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("请求过于频繁，请稍后再试")]
    RateLimited,

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type ChartResult<T> = Result<T, ChartError>;

impl ChartError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ChartError::NoData { .. } => ErrorCode::NoData,
            ChartError::RateLimited => ErrorCode::RateLimited,
            ChartError::MalformedSource { .. }
            | ChartError::InvalidRangeToken(_)
            | ChartError::Io(_)
            | ChartError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// 返回给调用方的提示信息，不包含文件路径等内部细节
    pub fn public_message(&self) -> String {
        match self {
            ChartError::NoData { .. } | ChartError::RateLimited => self.to_string(),
            ChartError::MalformedSource { .. } => "K线数据格式错误".to_string(),
            ChartError::InvalidRangeToken(_) | ChartError::Io(_) | ChartError::Internal(_) => {
                "服务内部错误".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_status() {
        let no_data = ChartError::NoData { code: "ZZZZ".to_string() };
        assert_eq!(no_data.code(), ErrorCode::NoData);
        assert_eq!(no_data.code().status(), StatusCode::NOT_FOUND);

        let malformed = ChartError::MalformedSource {
            source_id: "/data/7203.json".to_string(),
            reason: "expected value".to_string(),
        };
        assert_eq!(malformed.code(), ErrorCode::InternalError);
        assert_eq!(malformed.code().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!malformed.public_message().contains("/data"));
    }

    #[test]
    fn test_error_code_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ErrorCode::NoData).unwrap(), "\"no_data\"");
        assert_eq!(
            serde_json::to_string(&ErrorCode::InternalError).unwrap(),
            "\"internal_error\""
        );
    }
}
