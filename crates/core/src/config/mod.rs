//! 应用配置
//!
//! - **app_config**: 顶层 `AppConfig`，负责加载、解析和校验
//! - **sections**: 各配置段（数据库、缓存、内容源、流水线、API、可观测性、定时任务）
//!
//! 加载顺序：默认值 → TOML 配置文件 → `PAPERBOY__` 前缀的环境变量。

pub mod app_config;
pub mod sections;

pub use app_config::AppConfig;
pub use sections::*;
