use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use paperboy_core::PaperboyError;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("服务错误: {0}")]
    Paperboy(#[from] PaperboyError),

    #[error("未找到资源: {0}")]
    NotFound(String),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), "NOT_FOUND"),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {msg}"),
                "BAD_REQUEST",
            ),
            ApiError::Paperboy(err) => {
                error!("请求处理失败: {}", err);
                let error_type = match err {
                    PaperboyError::StoreFailed(_) => "STORE_ERROR",
                    _ => "INTERNAL_ERROR",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), error_type)
            }
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_is_server_error() {
        let error: ApiError = PaperboyError::StoreFailed("disk I/O error".to_string()).into();
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found() {
        let response = ApiError::NotFound("摘要 world/1 不存在".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_request() {
        let error = ApiError::BadRequest("before".to_string());
        assert_eq!(error.to_string(), "请求参数错误: before");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
