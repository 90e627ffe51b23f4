//! # 数据模型
//!
//! - `Article`: 内容源返回的原始文章
//! - `Summary`: 由文章生成并持久化的摘要，以 `content_id` 作为自然键
//! - `SummaryPage` / `RangeQuery`: 分页读取
//! - `FilterParams`: 一次抓取的查询参数

pub mod article;
pub mod summary;

use std::collections::BTreeMap;

pub use article::*;
pub use summary::*;

/// 抓取参数，有序存储以保证生成的查询串稳定
pub type FilterParams = BTreeMap<String, String>;
