use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use paperboy_api::create_app;
use paperboy_core::config::{AppConfig, JobConfig};
use paperboy_core::traits::{ContentSource, SummaryRepository, Transformer};
use paperboy_dispatcher::{work_unit, ScheduleConfig, ScheduledTask, TaskFactory, TaskGroup};
use paperboy_infrastructure::{create_pool, CacheFactory, GuardianSource, SqliteSummaryRepository};
use paperboy_worker::{ArticleExtractor, ContentPipeline, ItemFilter, NewsJob};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 定时任务收到关闭信号后的最长等待时间
const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(20);

/// 主应用程序
pub struct Application {
    config: AppConfig,
    summary_repo: Arc<dyn SummaryRepository>,
    tasks: Vec<ScheduledTask>,
}

impl Application {
    /// 创建新的应用实例，完成所有组件的装配
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let db_pool = create_pool(&config.database)
            .await
            .context("创建数据库连接池失败")?;
        let store = SqliteSummaryRepository::new(db_pool);
        store.migrate().await.context("数据库迁移失败")?;

        let mut cache_factory = CacheFactory::new(config.cache.clone());
        cache_factory.initialize().await;
        let summary_repo = cache_factory.create_cached_summary_repository(Arc::new(store));

        let pipeline = Arc::new(build_pipeline(&config, Arc::clone(&summary_repo))?);

        let factory = TaskFactory::new();
        let tasks = config
            .jobs
            .iter()
            .map(|job| create_news_task(&factory, job, &config, Arc::clone(&pipeline)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            summary_repo,
            tasks,
        })
    }

    /// 运行定时任务和API服务器，直到 `shutdown` 被触发
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let Self {
            config,
            summary_repo,
            tasks,
        } = self;

        let mut group = TaskGroup::new(shutdown.clone());
        for task in tasks {
            info!(
                "启动定时任务: {} (周期 {:?}, 恢复周期 {:?})",
                task.name(),
                task.config().normal_period,
                task.config().recovery_period
            );
            group.spawn(task);
        }

        if config.api.enabled {
            run_api(&config, summary_repo, shutdown.clone()).await?;
        } else {
            info!("API服务器已禁用");
            shutdown.cancelled().await;
        }

        info!("等待 {} 个定时任务停止", group.len());
        if !group.shutdown(TASK_SHUTDOWN_TIMEOUT).await {
            warn!("部分定时任务未能在 {:?} 内停止，已强制中止", TASK_SHUTDOWN_TIMEOUT);
        }

        Ok(())
    }
}

fn build_pipeline(
    config: &AppConfig,
    summary_repo: Arc<dyn SummaryRepository>,
) -> Result<ContentPipeline> {
    let source: Arc<dyn ContentSource> =
        Arc::new(GuardianSource::new(&config.source).context("创建内容源失败")?);
    let transformer: Arc<dyn Transformer> = Arc::new(
        ArticleExtractor::new(config.pipeline.summary_sentences).context("创建摘要提取器失败")?,
    );
    let filter = ItemFilter::new(&config.pipeline.exclude_patterns).context("解析过滤规则失败")?;

    Ok(ContentPipeline::new(source, transformer, summary_repo)
        .with_filter(filter)
        .with_max_concurrency(config.pipeline.max_concurrency))
}

fn create_news_task(
    factory: &TaskFactory,
    job: &JobConfig,
    config: &AppConfig,
    pipeline: Arc<ContentPipeline>,
) -> Result<ScheduledTask> {
    let news = NewsJob::new(job.section.clone(), config.source.lookback(), pipeline);
    let schedule = ScheduleConfig::new(job.name.clone(), job.period(), job.recovery_period());

    let task = factory.create(
        schedule,
        work_unit(move |cancel| {
            let news = news.clone();
            async move { news.run(cancel).await }
        }),
    )?;

    Ok(task)
}

async fn run_api(
    config: &AppConfig,
    summary_repo: Arc<dyn SummaryRepository>,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = create_app(summary_repo, &config.api);

    let listener = TcpListener::bind(&config.api.bind_address)
        .await
        .with_context(|| format!("绑定地址失败: {}", config.api.bind_address))?;

    info!("API服务器启动在 http://{}", config.api.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("API服务器运行失败")?;

    info!("API服务器已停止");
    Ok(())
}
