//! 业务逻辑服务模块
//!
//! 数据读取、交易日判定、指标计算、区间截取和响应组装

pub mod assembler;     // 最少K线数规则
pub mod cache;         // 带 TTL 的键值缓存
pub mod calendar;      // 日本时间与盘中K线判定
pub mod chart_service; // 图表流水线
pub mod indicators;    // 技术指标
pub mod range;         // 区间截取
pub mod rate_limit;    // 客户端限流
pub mod repository;    // K线数据源
