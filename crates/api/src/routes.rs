use axum::{routing::get, Router};
use paperboy_core::traits::SummaryRepository;
use std::sync::Arc;

use crate::handlers::{
    health::health_check,
    summaries::{get_summary, list_summaries, search_summaries},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub summary_repo: Arc<dyn SummaryRepository>,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 摘要读取API
        .route("/api/summary", get(get_summary))
        .route("/api/summaries", get(search_summaries))
        .route("/api/summaries/{section}", get(list_summaries))
        .with_state(state)
}
