use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio_util::sync::CancellationToken;

use paperboy_core::models::FilterParams;
use paperboy_core::{PaperboyError, PaperboyResult};

use crate::pipeline::ContentPipeline;

/// 按栏目抓取最近新闻的定时任务
#[derive(Clone)]
pub struct NewsJob {
    section: String,
    lookback: Duration,
    pipeline: Arc<ContentPipeline>,
}

impl NewsJob {
    pub fn new(section: impl Into<String>, lookback: Duration, pipeline: Arc<ContentPipeline>) -> Self {
        Self {
            section: section.into(),
            lookback,
            pipeline,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// 本次运行的查询参数，只抓取 `now - lookback` 之后发布的文章
    pub fn params(&self, now: DateTime<Utc>) -> PaperboyResult<FilterParams> {
        let lookback = chrono::Duration::from_std(self.lookback)
            .map_err(|e| PaperboyError::Configuration(format!("无效的回溯时间窗口: {e}")))?;
        let from = now - lookback;

        Ok(FilterParams::from([
            ("section".to_string(), self.section.clone()),
            ("type".to_string(), "article".to_string()),
            ("show-fields".to_string(), "trailText,wordcount,bodyText".to_string()),
            ("show-tags".to_string(), "contributor".to_string()),
            ("show-blocks".to_string(), "main".to_string()),
            ("from-date".to_string(), from.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]))
    }

    pub async fn run(&self, cancel: CancellationToken) -> PaperboyResult<()> {
        let params = self.params(Utc::now())?;
        self.pipeline.run_once(&params, cancel).await.map(|_| ())
    }
}
