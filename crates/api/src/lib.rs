//! # Paperboy API
//!
//! 摘要读取服务的HTTP接口，所有读取都经过带缓存的摘要仓库。
//!
//! ## API 端点
//!
//! - `GET /health` - 健康检查
//! - `GET /api/summary?id=` - 按ID获取单条摘要
//! - `GET /api/summaries?q=&size=` - 全文搜索摘要
//! - `GET /api/summaries/{section}?before=&size=` - 按栏目分页，`all` 表示所有栏目

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

use axum::Router;
use paperboy_core::config::ApiConfig;
use paperboy_core::traits::SummaryRepository;
use std::sync::Arc;
use tower::ServiceBuilder;

use middleware::{request_logging, timeout_layer, trace_layer};
use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(summary_repo: Arc<dyn SummaryRepository>, api_config: &ApiConfig) -> Router {
    let state = AppState {
        summary_repo,
        default_page_size: api_config.default_page_size,
        max_page_size: api_config.max_page_size,
    };

    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(timeout_layer(api_config.request_timeout()))
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
