//! 摘要仓储接口定义
//!
//! `SummaryRepository` 是持久化层的唯一抽象：
//! - SQLite 实现负责持久化
//! - 缓存装饰器实现同一接口，可以直接替换底层仓储
//! - 内存实现（测试用）
//!
//! 所有方法都是异步的，返回 `PaperboyResult<T>`，实现必须是 `Send + Sync`。

use crate::models::{RangeQuery, Summary, SummaryPage};
use crate::PaperboyResult;
use async_trait::async_trait;

/// 摘要仓储接口
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    /// 按 `content_id` 插入或覆盖摘要
    ///
    /// 同一篇文章重复写入时不会产生重复记录，以最后一次写入的字段为准。
    async fn create(&self, summary: &Summary) -> PaperboyResult<()>;

    /// 按自然键查找单条摘要，不存在时返回 `None`
    async fn find_by_key(&self, content_id: &str) -> PaperboyResult<Option<Summary>>;

    /// 按栏目和时间游标读取最近的摘要，按发布时间倒序
    ///
    /// 返回页中的 `last` 为最后一条的发布时间；结果为空时为查询时刻。
    async fn find_range(&self, query: &RangeQuery) -> PaperboyResult<SummaryPage>;

    /// 全文检索标题、导语和摘要正文
    async fn search(&self, query: &str, limit: usize) -> PaperboyResult<Vec<Summary>>;
}
