//! 内容抓取与摘要生成
//!
//! - **pipeline**: 一次抓取运行，扇出转换、扇入持久化
//! - **filter**: 进入转换前的文章过滤规则
//! - **extractor**: 文章到摘要的转换实现
//! - **news**: 按栏目定时抓取的新闻任务

pub mod extractor;
pub mod filter;
pub mod news;
pub mod pipeline;

pub use extractor::ArticleExtractor;
pub use filter::{ItemFilter, Rejection};
pub use news::NewsJob;
pub use pipeline::{ContentPipeline, RunReport};
