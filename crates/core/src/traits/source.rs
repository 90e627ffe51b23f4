use crate::models::{Article, FilterParams, Summary};
use crate::PaperboyResult;
use async_trait::async_trait;

/// 远程内容源，一次调用返回一批原始文章
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, params: &FilterParams) -> PaperboyResult<Vec<Article>>;
}

/// 单篇文章到摘要的转换
///
/// 同步的纯函数，可能较耗CPU，调用方负责把它放到阻塞线程池上执行。
pub trait Transformer: Send + Sync {
    fn transform(&self, article: &Article) -> PaperboyResult<Summary>;
}
