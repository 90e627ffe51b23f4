use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 文章元信息，`content_id` 为去重用的自然键
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryInfo {
    pub content_id: String,
    pub section_id: String,
    pub section_name: String,
    pub url: String,
    pub authors: Vec<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryArticle {
    pub title: String,
    pub trail_text: String,
    pub summary_text: Vec<String>,
    pub full_word_count: u32,
    pub summary_word_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryImage {
    pub url: String,
    pub caption: String,
}

/// 由一篇文章生成的摘要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub info: SummaryInfo,
    pub article: SummaryArticle,
    pub image: Option<SummaryImage>,
}

impl Summary {
    pub fn natural_key(&self) -> &str {
        &self.info.content_id
    }
}

/// 分页查询结果，`last` 为本页最后一条的发布时间，用作下一页的游标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryPage {
    pub summaries: Vec<Summary>,
    pub last: DateTime<Utc>,
}

/// 按栏目和时间游标的范围查询
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    /// None 表示所有栏目
    pub section: Option<String>,
    /// 只返回早于该时间的摘要，None 表示从当前时间开始
    pub before: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl RangeQuery {
    pub fn latest(section: Option<String>, limit: usize) -> Self {
        Self {
            section,
            before: None,
            limit,
        }
    }

    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }
}
