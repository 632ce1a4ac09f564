//! 日本股票图表数据服务
//!
//! 读取日K线，计算技术指标（SMA / EMA / MACD / RSI），按区间返回图表数据
//! 交易日以日本时间（JST）为准

mod config;     // 配置加载
mod error;      // 错误定义
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务
mod state;      // 共享状态

use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::{AppConfig, ConfigSource};
use crate::middleware::ApiKeyMiddleware;
use crate::services::calendar::SystemClock;
use crate::state::AppState;

/// 应用程序入口
///
/// 启动 HTTP 服务器，监听地址来自配置（默认 0.0.0.0:8080）
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (config, source) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    match source {
        ConfigSource::File(path) => log::info!("从 {} 加载配置成功", path),
        ConfigSource::Invalid { path, error } => {
            log::warn!("加载配置文件 {} 失败: {}，使用默认配置", path, error)
        }
        ConfigSource::Default => log::info!("使用默认配置"),
    }

    if config.api.api_key.is_empty() {
        log::warn!("未设置 API_KEY，接口不做认证");
    }

    let state = web::Data::new(AppState::from_config(&config, Arc::new(SystemClock)));
    // 定期清理过期缓存和空闲的限流记录
    let janitor = state.clone();
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            janitor.purge(Duration::from_secs(600));
        }
    });

    let api_key = config.api.api_key.clone();
    let bind_addr = config.bind_addr();

    log::info!("启动图表数据服务，数据目录 {}，监听 {}", config.data.data_dir, bind_addr);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(ApiKeyMiddleware::new(api_key.clone()))  // API Key 认证
            .wrap(Logger::default())  // 添加请求日志中间件
            .configure(handlers::config)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
