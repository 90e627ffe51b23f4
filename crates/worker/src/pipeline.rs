use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use paperboy_core::models::{Article, FilterParams, Summary};
use paperboy_core::traits::{ContentSource, SummaryRepository, Transformer};
use paperboy_core::{PaperboyError, PaperboyResult};

use crate::filter::ItemFilter;

const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// 一次运行的统计
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub fetched: usize,
    pub rejected: usize,
    pub persisted: usize,
    pub elapsed: Duration,
}

/// 结果通道上的消息，`Finished` 在所有工作单元结束后由监督任务发送
enum Outcome {
    Item(PaperboyResult<Summary>),
    Finished,
}

/// 抓取一批文章，并发转换后逐条持久化
pub struct ContentPipeline {
    source: Arc<dyn ContentSource>,
    transformer: Arc<dyn Transformer>,
    repository: Arc<dyn SummaryRepository>,
    filter: ItemFilter,
    max_concurrency: usize,
}

impl ContentPipeline {
    pub fn new(
        source: Arc<dyn ContentSource>,
        transformer: Arc<dyn Transformer>,
        repository: Arc<dyn SummaryRepository>,
    ) -> Self {
        Self {
            source,
            transformer,
            repository,
            filter: ItemFilter::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_filter(mut self, filter: ItemFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// 执行一次完整的抓取运行
    ///
    /// 1. 调用内容源一次，失败时返回 `FetchFailed`，不处理任何文章
    /// 2. 过滤文章，被拒绝的文章不会进入转换
    /// 3. 每篇文章作为一个工作单元在有界并发池中转换，结果写入共享通道
    /// 4. 监督任务等待所有工作单元结束后发送结束信号
    /// 5. 消费者逐条持久化收到的摘要；遇到第一个错误立即中止本次运行，
    ///    已持久化的摘要保留
    pub async fn run_once(
        &self,
        params: &FilterParams,
        cancel: CancellationToken,
    ) -> PaperboyResult<RunReport> {
        let started = Instant::now();
        let section = params.get("section").map(String::as_str).unwrap_or("all");

        let articles = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PaperboyError::Cancelled),
            fetched = self.source.fetch(params) => fetched.map_err(|e| match e {
                PaperboyError::FetchFailed { .. } => e,
                other => PaperboyError::fetch(other),
            })?,
        };
        let fetched = articles.len();

        let (accepted, rejected): (Vec<Article>, Vec<Article>) =
            articles.into_iter().partition(|article| match self.filter.check(article) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(content_id = %article.content_id, %reason, "过滤文章");
                    false
                }
            });
        let rejected = rejected.len();

        let run_token = cancel.child_token();
        let (tx, mut rx) = mpsc::channel(accepted.len() + 1);
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut units = JoinSet::new();

        for article in accepted {
            let tx = tx.clone();
            let permits = Arc::clone(&permits);
            let transformer = Arc::clone(&self.transformer);
            let token = run_token.clone();

            units.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                };
                if token.is_cancelled() {
                    return;
                }

                let content_id = article.content_id.clone();
                let result =
                    match tokio::task::spawn_blocking(move || transformer.transform(&article))
                        .await
                    {
                        Ok(result) => result,
                        Err(e) => Err(PaperboyError::extraction(
                            content_id,
                            format!("转换任务异常退出: {e}"),
                        )),
                    };

                if token.is_cancelled() {
                    return;
                }
                let _ = tx.send(Outcome::Item(result)).await;
            });
        }

        tokio::spawn(async move {
            while units.join_next().await.is_some() {}
            let _ = tx.send(Outcome::Finished).await;
        });

        let mut persisted = 0;
        let outcome = loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Err(PaperboyError::Cancelled),
                message = rx.recv() => message,
            };

            match message {
                Some(Outcome::Item(Ok(summary))) => match self.repository.create(&summary).await {
                    Ok(()) => persisted += 1,
                    Err(e) => {
                        break Err(match e {
                            PaperboyError::StoreFailed(_) => e,
                            other => PaperboyError::StoreFailed(other.to_string()),
                        })
                    }
                },
                Some(Outcome::Item(Err(e))) => {
                    break Err(PaperboyError::TransformFailed {
                        persisted,
                        source: Box::new(e),
                    })
                }
                Some(Outcome::Finished) | None => break Ok(()),
            }
        };

        let elapsed = started.elapsed();
        match outcome {
            Ok(()) => {
                info!(
                    section,
                    fetched,
                    rejected,
                    persisted,
                    ?elapsed,
                    "抓取运行完成"
                );
                Ok(RunReport {
                    fetched,
                    rejected,
                    persisted,
                    elapsed,
                })
            }
            Err(e) => {
                run_token.cancel();
                warn!(
                    section,
                    fetched,
                    rejected,
                    persisted,
                    ?elapsed,
                    error = %e,
                    "抓取运行中止"
                );
                Err(e)
            }
        }
    }
}
