use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paperboy_core::models::{
    RangeQuery, Summary, SummaryArticle, SummaryImage, SummaryInfo, SummaryPage,
};
use paperboy_core::traits::SummaryRepository;
use paperboy_core::{PaperboyError, PaperboyResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use crate::database::database_error;

const SUMMARY_COLUMNS: &str = "content_id, section_id, section_name, url, authors, published_at, \
     title, trail_text, summary_text, full_word_count, summary_word_count, image_url, image_caption";

pub struct SqliteSummaryRepository {
    pool: SqlitePool,
}

impl SqliteSummaryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 运行数据库迁移
    pub async fn migrate(&self) -> PaperboyResult<()> {
        debug!("Running SQLite database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS summaries (
                content_id TEXT PRIMARY KEY,
                section_id TEXT NOT NULL,
                section_name TEXT NOT NULL,
                url TEXT NOT NULL,
                authors TEXT NOT NULL DEFAULT '[]',
                published_at INTEGER NOT NULL,
                title TEXT NOT NULL,
                trail_text TEXT NOT NULL,
                summary_text TEXT NOT NULL DEFAULT '[]',
                full_word_count INTEGER NOT NULL DEFAULT 0,
                summary_word_count INTEGER NOT NULL DEFAULT 0,
                image_url TEXT,
                image_caption TEXT,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("创建摘要表", e))?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_summaries_published_at ON summaries(published_at)",
            "CREATE INDEX IF NOT EXISTS idx_summaries_section_published ON summaries(section_id, published_at)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql)
                .execute(&self.pool)
                .await
                .map_err(|e| database_error("创建索引", e))?;
        }

        debug!("Successfully completed SQLite database migrations");
        Ok(())
    }

    fn row_to_summary(row: &SqliteRow) -> PaperboyResult<Summary> {
        let get_err = |e: sqlx::Error| database_error("读取摘要记录", e);

        let authors: String = row.try_get("authors").map_err(get_err)?;
        let summary_text: String = row.try_get("summary_text").map_err(get_err)?;
        let published_at: i64 = row.try_get("published_at").map_err(get_err)?;
        let date = DateTime::<Utc>::from_timestamp_millis(published_at).ok_or_else(|| {
            PaperboyError::StoreFailed(format!("无效的发布时间: {published_at}"))
        })?;

        let image_url: Option<String> = row.try_get("image_url").map_err(get_err)?;
        let image_caption: Option<String> = row.try_get("image_caption").map_err(get_err)?;
        let full_word_count: i64 = row.try_get("full_word_count").map_err(get_err)?;
        let summary_word_count: i64 = row.try_get("summary_word_count").map_err(get_err)?;

        Ok(Summary {
            info: SummaryInfo {
                content_id: row.try_get("content_id").map_err(get_err)?,
                section_id: row.try_get("section_id").map_err(get_err)?,
                section_name: row.try_get("section_name").map_err(get_err)?,
                url: row.try_get("url").map_err(get_err)?,
                authors: serde_json::from_str(&authors)?,
                date,
            },
            article: SummaryArticle {
                title: row.try_get("title").map_err(get_err)?,
                trail_text: row.try_get("trail_text").map_err(get_err)?,
                summary_text: serde_json::from_str(&summary_text)?,
                full_word_count: full_word_count as u32,
                summary_word_count: summary_word_count as u32,
            },
            image: image_url.map(|url| SummaryImage {
                url,
                caption: image_caption.unwrap_or_default(),
            }),
        })
    }

    fn rows_to_summaries(rows: &[SqliteRow]) -> PaperboyResult<Vec<Summary>> {
        rows.iter().map(Self::row_to_summary).collect()
    }
}

/// 转义 LIKE 通配符
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl SummaryRepository for SqliteSummaryRepository {
    #[instrument(skip(self, summary), fields(content_id = %summary.info.content_id))]
    async fn create(&self, summary: &Summary) -> PaperboyResult<()> {
        let authors = serde_json::to_string(&summary.info.authors)?;
        let summary_text = serde_json::to_string(&summary.article.summary_text)?;

        sqlx::query(
            r#"
            INSERT INTO summaries (
                content_id, section_id, section_name, url, authors, published_at,
                title, trail_text, summary_text, full_word_count, summary_word_count,
                image_url, image_caption
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(content_id) DO UPDATE SET
                section_id = excluded.section_id,
                section_name = excluded.section_name,
                url = excluded.url,
                authors = excluded.authors,
                published_at = excluded.published_at,
                title = excluded.title,
                trail_text = excluded.trail_text,
                summary_text = excluded.summary_text,
                full_word_count = excluded.full_word_count,
                summary_word_count = excluded.summary_word_count,
                image_url = excluded.image_url,
                image_caption = excluded.image_caption,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&summary.info.content_id)
        .bind(&summary.info.section_id)
        .bind(&summary.info.section_name)
        .bind(&summary.info.url)
        .bind(authors)
        .bind(summary.info.date.timestamp_millis())
        .bind(&summary.article.title)
        .bind(&summary.article.trail_text)
        .bind(summary_text)
        .bind(summary.article.full_word_count as i64)
        .bind(summary.article.summary_word_count as i64)
        .bind(summary.image.as_ref().map(|i| i.url.clone()))
        .bind(summary.image.as_ref().map(|i| i.caption.clone()))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("写入摘要", e))?;

        debug!("Summary upserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_key(&self, content_id: &str) -> PaperboyResult<Option<Summary>> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE content_id = ?1");
        let row = sqlx::query(&sql)
            .bind(content_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("查询摘要", e))?;

        row.as_ref().map(Self::row_to_summary).transpose()
    }

    #[instrument(skip(self))]
    async fn find_range(&self, query: &RangeQuery) -> PaperboyResult<SummaryPage> {
        let before = query.before.unwrap_or_else(Utc::now);

        let rows = match &query.section {
            Some(section) => {
                let sql = format!(
                    "SELECT {SUMMARY_COLUMNS} FROM summaries \
                     WHERE section_id = ?1 AND published_at < ?2 \
                     ORDER BY published_at DESC LIMIT ?3"
                );
                sqlx::query(&sql)
                    .bind(section)
                    .bind(before.timestamp_millis())
                    .bind(query.limit as i64)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {SUMMARY_COLUMNS} FROM summaries \
                     WHERE published_at < ?1 \
                     ORDER BY published_at DESC LIMIT ?2"
                );
                sqlx::query(&sql)
                    .bind(before.timestamp_millis())
                    .bind(query.limit as i64)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| database_error("按范围查询摘要", e))?;

        let summaries = Self::rows_to_summaries(&rows)?;
        let last = summaries.last().map(|s| s.info.date).unwrap_or(before);

        Ok(SummaryPage { summaries, last })
    }

    /// 按命中的关键词数量排序，相同时按发布时间倒序
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> PaperboyResult<Vec<Summary>> {
        let terms: Vec<String> = query.split_whitespace().map(like_pattern).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let score = (1..=terms.len())
            .map(|i| {
                format!(
                    "(CASE WHEN title LIKE ?{i} ESCAPE '\\' OR trail_text LIKE ?{i} ESCAPE '\\' \
                     OR summary_text LIKE ?{i} ESCAPE '\\' THEN 1 ELSE 0 END)"
                )
            })
            .collect::<Vec<_>>()
            .join(" + ");
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS}, ({score}) AS score FROM summaries \
             WHERE score > 0 ORDER BY score DESC, published_at DESC LIMIT {limit}"
        );

        let mut statement = sqlx::query(&sql);
        for term in &terms {
            statement = statement.bind(term);
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("搜索摘要", e))?;

        Self::rows_to_summaries(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_pool;
    use chrono::{Duration, TimeZone};
    use paperboy_core::config::DatabaseConfig;
    use paperboy_testing_utils::SummaryBuilder;

    async fn repository() -> SqliteSummaryRepository {
        let pool = create_pool(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();
        let repo = SqliteSummaryRepository::new(pool);
        repo.migrate().await.unwrap();
        repo
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_key() {
        let repo = repository().await;
        let summary = SummaryBuilder::new("world/1")
            .with_authors(&["Jane Doe"])
            .with_summary_text(&["One.", "Two."])
            .with_image("https://i.guim.co.uk/1000.jpg", "Caption")
            .build();

        repo.create(&summary).await.unwrap();

        assert_eq!(repo.find_by_key("world/1").await.unwrap(), Some(summary));
        assert_eq!(repo.find_by_key("world/2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_with_latest_values() {
        let repo = repository().await;
        repo.create(&SummaryBuilder::new("world/1").with_title("First").build())
            .await
            .unwrap();
        repo.create(&SummaryBuilder::new("world/1").with_title("Second").build())
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summaries")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            repo.find_by_key("world/1").await.unwrap().unwrap().article.title,
            "Second"
        );
    }

    #[tokio::test]
    async fn test_find_range_pages_by_date() {
        let repo = repository().await;
        for hour in 1..=5 {
            repo.create(&SummaryBuilder::new(&format!("world/{hour}")).with_date(at(hour)).build())
                .await
                .unwrap();
        }
        repo.create(
            &SummaryBuilder::new("tech/1")
                .with_section("technology", "Technology")
                .with_date(at(6))
                .build(),
        )
        .await
        .unwrap();

        let first = repo
            .find_range(&RangeQuery::latest(Some("world".to_string()), 2))
            .await
            .unwrap();
        let ids: Vec<_> = first.summaries.iter().map(|s| s.natural_key()).collect();
        assert_eq!(ids, vec!["world/5", "world/4"]);
        assert_eq!(first.last, at(4));

        let second = repo
            .find_range(&RangeQuery::latest(Some("world".to_string()), 2).before(first.last))
            .await
            .unwrap();
        let ids: Vec<_> = second.summaries.iter().map(|s| s.natural_key()).collect();
        assert_eq!(ids, vec!["world/3", "world/2"]);

        let all = repo.find_range(&RangeQuery::latest(None, 10)).await.unwrap();
        assert_eq!(all.summaries.len(), 6);
        assert_eq!(all.summaries[0].natural_key(), "tech/1");
    }

    #[tokio::test]
    async fn test_empty_range_reports_query_instant() {
        let repo = repository().await;
        let before = at(12) - Duration::minutes(30);

        let page = repo
            .find_range(&RangeQuery::latest(None, 10).before(before))
            .await
            .unwrap();
        assert!(page.summaries.is_empty());
        assert_eq!(page.last, before);
    }

    #[tokio::test]
    async fn test_search_ranks_by_matched_terms() {
        let repo = repository().await;
        repo.create(
            &SummaryBuilder::new("world/1")
                .with_title("Climate summit opens")
                .with_date(at(1))
                .build(),
        )
        .await
        .unwrap();
        repo.create(
            &SummaryBuilder::new("world/2")
                .with_title("Summit ends")
                .with_summary_text(&["Climate pledges were weak."])
                .with_date(at(2))
                .build(),
        )
        .await
        .unwrap();
        repo.create(
            &SummaryBuilder::new("world/3")
                .with_title("Football results")
                .with_date(at(3))
                .build(),
        )
        .await
        .unwrap();

        let results = repo.search("climate summit", 10).await.unwrap();
        let ids: Vec<_> = results.iter().map(|s| s.natural_key()).collect();
        assert_eq!(ids, vec!["world/2", "world/1"]);

        assert_eq!(repo.search("summit", 1).await.unwrap().len(), 1);
        assert!(repo.search("   ", 10).await.unwrap().is_empty());
        assert!(repo.search("100%", 10).await.unwrap().is_empty());
    }
}
