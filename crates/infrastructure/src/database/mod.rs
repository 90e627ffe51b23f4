pub mod sqlite;

pub use sqlite::{SqliteSummaryRepository, create_pool};

use paperboy_core::PaperboyError;

/// 把数据库错误转换为存储错误，附带操作上下文
pub(crate) fn database_error(operation: &str, e: impl std::fmt::Display) -> PaperboyError {
    PaperboyError::StoreFailed(format!("{operation}: {e}"))
}
