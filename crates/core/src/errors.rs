use thiserror::Error;

/// 摘要服务错误类型定义
#[derive(Debug, Error)]
pub enum PaperboyError {
    #[error("无效的调度配置 [{name}]: {message}")]
    InvalidSchedule { name: String, message: String },

    #[error("抓取内容失败: {message}")]
    FetchFailed { message: String },

    #[error("摘要生成失败 (已持久化 {persisted} 条): {source}")]
    TransformFailed {
        persisted: usize,
        #[source]
        source: Box<PaperboyError>,
    },

    #[error("文章解析失败 [{content_id}]: {message}")]
    Extraction { content_id: String, message: String },

    #[error("存储错误: {0}")]
    StoreFailed(String),

    #[error("缓存不可用: {0}")]
    CacheUnavailable(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("运行已取消")]
    Cancelled,
}

impl PaperboyError {
    pub fn fetch(message: impl std::fmt::Display) -> Self {
        Self::FetchFailed {
            message: message.to_string(),
        }
    }

    pub fn extraction(content_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Extraction {
            content_id: content_id.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_schedule(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PaperboyError {
    fn from(e: serde_json::Error) -> Self {
        PaperboyError::Serialization(e.to_string())
    }
}

/// 统一的Result类型
pub type PaperboyResult<T> = std::result::Result<T, PaperboyError>;
