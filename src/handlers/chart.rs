//! 图表接口处理器
//!
//! GET /api/v1/chart/{symbol}?range=5y|1y|3m|1m

use actix_web::{http::header, web, HttpRequest, HttpResponse, Result};

use crate::error::ChartError;
use crate::models::{ApiResponse, ChartQuery, ChartSeries, RangeToken};
use crate::services::calendar::jst_timestamp;
use crate::state::AppState;

/// 把错误转换为统一的错误响应
pub fn error_response(err: &ChartError, timestamp: String) -> HttpResponse {
    let code = err.code();
    HttpResponse::build(code.status()).json(ApiResponse::<ChartSeries>::error(
        code,
        err.public_message(),
        timestamp,
    ))
}

/// 获取带技术指标的日K线
///
/// # 参数
/// - symbol: 证券代码（如 7203）
/// - range: 可选区间，无法识别时返回完整序列
pub async fn get_chart(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ChartQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let timestamp = jst_timestamp(state.chart.now());

    // 按连接的对端地址限流，不信任客户端可伪造的转发头
    let client = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    if !state.limiter.check(&client) {
        return Ok(error_response(&ChartError::RateLimited, timestamp));
    }

    let range = RangeToken::parse_lenient(query.range.as_deref());
    let service = state.chart.clone();
    let code = symbol.clone();
    let result = web::block(move || service.chart(&code, range)).await;

    match result {
        Ok(Ok(series)) => {
            let response = ApiResponse::success(series, timestamp);
            Ok(HttpResponse::Ok()
                .insert_header((
                    header::CACHE_CONTROL,
                    format!("public, max-age={}", state.cache_max_age),
                ))
                .json(response))
        }
        Ok(Err(e)) => {
            match &e {
                ChartError::NoData { .. } => log::info!("{}", e),
                _ => log::error!("生成 {} 图表数据失败: {}", symbol, e),
            }
            Ok(error_response(&e, timestamp))
        }
        Err(e) => {
            log::error!("生成 {} 图表数据的任务失败: {}", symbol, e);
            Ok(error_response(&ChartError::Internal(e.to_string()), timestamp))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/chart/{symbol}", web::get().to(get_chart));
}
