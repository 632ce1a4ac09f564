use actix_web::{web, HttpResponse, Result};
use crate::models::ApiResponse;
use crate::services::calendar::jst_timestamp;
use crate::state::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let response = ApiResponse::success("Service is healthy", jst_timestamp(state.chart.now()));
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
