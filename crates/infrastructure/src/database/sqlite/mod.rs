pub mod sqlite_summary_repository;

pub use sqlite_summary_repository::SqliteSummaryRepository;

use paperboy_core::config::DatabaseConfig;
use paperboy_core::PaperboyResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use super::database_error;

/// 创建SQLite连接池，数据库文件不存在时自动创建
pub async fn create_pool(config: &DatabaseConfig) -> PaperboyResult<SqlitePool> {
    debug!("Connecting to SQLite database at: {}", config.url);

    let connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| database_error("解析数据库URL", e))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await
        .map_err(|e| database_error("连接数据库", e))
}
