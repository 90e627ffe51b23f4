use std::sync::Arc;
use std::time::Duration;

use paperboy_dispatcher::{work_unit, PeriodState, ScheduleConfig, ScheduledTask, TaskFactory};
use paperboy_testing_utils::{MockContentSource, MockSummaryRepository, MockTransformer};
use paperboy_worker::{ContentPipeline, NewsJob};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const NORMAL: Duration = Duration::from_secs(3600);
const RECOVERY: Duration = Duration::from_secs(300);

fn news_task(source: &MockContentSource, repository: &MockSummaryRepository) -> ScheduledTask {
    let pipeline = ContentPipeline::new(
        Arc::new(source.clone()),
        Arc::new(MockTransformer::new()),
        Arc::new(repository.clone()),
    );
    let news = NewsJob::new("world", Duration::from_secs(3600), Arc::new(pipeline));

    TaskFactory::new()
        .create(
            ScheduleConfig::new("guardian-world", NORMAL, RECOVERY),
            work_unit(move |cancel| {
                let news = news.clone();
                async move { news.run(cancel).await }
            }),
        )
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_source_outage_retries_after_recovery_period() {
    let source = MockContentSource::failing("guardian returned 503");
    let repository = MockSummaryRepository::new();
    let task = news_task(&source, &repository);
    let mut state = task.subscribe();

    let shutdown = CancellationToken::new();
    let handle = task.start(shutdown.clone());

    let after_outage = state.wait_for(|s| s.runs >= 1).await.unwrap().clone();
    let failed_at = Instant::now();
    assert_eq!(after_outage.period, PeriodState::Recovery);
    assert!(after_outage.last_error.unwrap().contains("guardian returned 503"));
    assert_eq!(source.call_count(), 1);

    source.set_failure(None);

    let after_retry = state.wait_for(|s| s.runs >= 2).await.unwrap().clone();
    assert_eq!(failed_at.elapsed(), RECOVERY);
    assert_eq!(after_retry.period, PeriodState::Normal);
    assert_eq!(source.call_count(), 2);

    shutdown.cancel();
    handle.await.unwrap();
}
