//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，环境变量 `API_KEY`、`DATA_DIR` 可覆盖文件中的值

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::services::repository::DEFAULT_CONSOLIDATED_FILE;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
    /// K线缓存时间（秒），同时作为 Cache-Control 的 max-age
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// 每个客户端每分钟最大请求数（0 表示不限流）
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// K线 JSON 文件所在目录
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// 汇总文件名
    #[serde(default = "default_consolidated_file")]
    pub consolidated_file: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 数据源配置
    #[serde(default)]
    pub data: DataConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 配置来源，日志系统初始化后再输出
#[derive(Debug)]
pub enum ConfigSource {
    File(String),
    Default,
    Invalid { path: String, error: String },
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_cache_ttl() -> u64 { 300 }
fn default_rate_limit() -> u32 { 120 }
fn default_data_dir() -> String { "data".to_string() }
fn default_consolidated_file() -> String { DEFAULT_CONSOLIDATED_FILE.to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cache_ttl_secs: default_cache_ttl(),
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            consolidated_file: default_consolidated_file(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后应用环境变量
    pub fn load() -> (Self, ConfigSource) {
        let config_paths = ["config.json", "config/config.json"];

        let mut loaded = None;
        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        loaded = Some((config, ConfigSource::File(path.to_string())));
                        break;
                    }
                    Err(e) => {
                        loaded = Some((
                            Self::default(),
                            ConfigSource::Invalid {
                                path: path.to_string(),
                                error: e.to_string(),
                            },
                        ));
                    }
                }
            }
        }

        let (mut config, source) = loaded.unwrap_or_else(|| (Self::default(), ConfigSource::Default));
        config.apply_env();
        (config, source)
    }

    fn apply_env(&mut self) {
        if let Ok(api_key) = env::var("API_KEY") {
            self.api.api_key = api_key;
        }
        if let Ok(data_dir) = env::var("DATA_DIR") {
            self.data.data_dir = data_dir;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.api.cache_ttl_secs)
    }
}
