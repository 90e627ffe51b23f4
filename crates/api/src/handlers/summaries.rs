use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use paperboy_core::models::{RangeQuery, Summary, SummaryPage};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ApiResult},
    routes::AppState,
};

/// 代表所有栏目的路径参数
pub const ALL_SECTIONS: &str = "all";

/// 单条摘要查询参数
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub id: Option<String>,
}

/// 搜索参数
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub size: Option<String>,
}

/// 栏目分页参数，`before` 为上一页返回的 `last`
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub before: Option<String>,
    pub size: Option<String>,
}

impl AppState {
    /// 无法解析的 size 使用默认值，超过上限时截断
    fn page_size(&self, raw: Option<&str>) -> usize {
        let size = match raw.map(str::parse::<usize>) {
            None => self.default_page_size,
            Some(Ok(size)) if size > 0 => size,
            Some(_) => {
                warn!("无效的分页大小 {:?}，使用默认值 {}", raw, self.default_page_size);
                self.default_page_size
            }
        };
        size.min(self.max_page_size)
    }
}

fn parse_before(raw: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| ApiError::BadRequest(format!("before={raw}: {e}"))),
    }
}

/// 按ID获取单条摘要
pub async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<Summary>> {
    let id = params
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("缺少参数 id".to_string()))?;

    match state.summary_repo.find_by_key(&id).await? {
        Some(summary) => Ok(Json(summary)),
        None => Err(ApiError::NotFound(format!("摘要 {id} 不存在"))),
    }
}

/// 全文搜索摘要
pub async fn search_summaries(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Summary>>> {
    let query = params.q.unwrap_or_default();
    let limit = state.page_size(params.size.as_deref());

    let summaries = state.summary_repo.search(&query, limit).await?;
    debug!("搜索 {:?} 命中 {} 条摘要", query, summaries.len());

    Ok(Json(summaries))
}

/// 按栏目分页获取摘要
pub async fn list_summaries(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<SummaryPage>> {
    let section = (section != ALL_SECTIONS).then_some(section);
    let query = RangeQuery {
        section,
        before: parse_before(params.before.as_deref())?,
        limit: state.page_size(params.size.as_deref()),
    };

    let page = state.summary_repo.find_range(&query).await?;
    debug!("栏目 {:?} 返回 {} 条摘要", query.section, page.summaries.len());

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperboy_testing_utils::MockSummaryRepository;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState {
            summary_repo: Arc::new(MockSummaryRepository::new()),
            default_page_size: 10,
            max_page_size: 50,
        }
    }

    #[test]
    fn test_page_size() {
        let state = state();

        assert_eq!(state.page_size(None), 10);
        assert_eq!(state.page_size(Some("25")), 25);
        assert_eq!(state.page_size(Some("abc")), 10);
        assert_eq!(state.page_size(Some("0")), 10);
        assert_eq!(state.page_size(Some("500")), 50);
    }

    #[test]
    fn test_parse_before() {
        assert_eq!(parse_before(None).unwrap(), None);
        assert_eq!(parse_before(Some("")).unwrap(), None);

        let before = parse_before(Some("2024-03-01T10:00:00.000Z")).unwrap().unwrap();
        assert_eq!(before.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        assert!(matches!(
            parse_before(Some("yesterday")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
