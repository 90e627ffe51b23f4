//! Mock implementations for the repository, source and transformer traits
//!
//! In-memory implementations with call counters and switchable failures,
//! usable without a database, Redis or network access.

use async_trait::async_trait;
use chrono::Utc;
use paperboy_core::models::{Article, FilterParams, RangeQuery, Summary, SummaryPage};
use paperboy_core::traits::{ContentSource, SummaryRepository, Transformer};
use paperboy_core::{PaperboyError, PaperboyResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::builders::summary_for;

/// Mock implementation of SummaryRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockSummaryRepository {
    summaries: Arc<Mutex<HashMap<String, Summary>>>,
    create_calls: Arc<AtomicUsize>,
    read_calls: Arc<AtomicUsize>,
    search_calls: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MockSummaryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summaries(summaries: Vec<Summary>) -> Self {
        let repo = Self::new();
        {
            let mut stored = repo.summaries.lock().unwrap();
            for summary in summaries {
                stored.insert(summary.info.content_id.clone(), summary);
            }
        }
        repo
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.summaries.lock().unwrap().len()
    }

    pub fn get(&self, content_id: &str) -> Option<Summary> {
        self.summaries.lock().unwrap().get(content_id).cloned()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of `find_by_key` and `find_range` calls
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> PaperboyResult<()> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PaperboyError::StoreFailed("mock read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SummaryRepository for MockSummaryRepository {
    async fn create(&self, summary: &Summary) -> PaperboyResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PaperboyError::StoreFailed("mock write failure".to_string()));
        }

        self.summaries
            .lock()
            .unwrap()
            .insert(summary.info.content_id.clone(), summary.clone());
        Ok(())
    }

    async fn find_by_key(&self, content_id: &str) -> PaperboyResult<Option<Summary>> {
        self.check_reads()?;
        Ok(self.get(content_id))
    }

    async fn find_range(&self, query: &RangeQuery) -> PaperboyResult<SummaryPage> {
        self.check_reads()?;
        let before = query.before.unwrap_or_else(Utc::now);

        let mut summaries: Vec<Summary> = self
            .summaries
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.info.date < before)
            .filter(|s| {
                query
                    .section
                    .as_deref()
                    .map_or(true, |section| s.info.section_id == section)
            })
            .cloned()
            .collect();
        summaries.sort_by(|a, b| b.info.date.cmp(&a.info.date));
        summaries.truncate(query.limit);

        let last = summaries.last().map(|s| s.info.date).unwrap_or(before);
        Ok(SummaryPage { summaries, last })
    }

    async fn search(&self, query: &str, limit: usize) -> PaperboyResult<Vec<Summary>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let needle = query.to_lowercase();

        Ok(self
            .summaries
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.article.title.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Mock implementation of ContentSource for testing
#[derive(Debug, Clone, Default)]
pub struct MockContentSource {
    articles: Arc<Mutex<Vec<Article>>>,
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<FilterParams>>>,
}

impl MockContentSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles: Arc::new(Mutex::new(articles)),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        let source = Self::default();
        source.set_failure(Some(message));
        source
    }

    pub fn set_articles(&self, articles: Vec<Article>) {
        *self.articles.lock().unwrap() = articles;
    }

    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_params(&self) -> Option<FilterParams> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch(&self, params: &FilterParams) -> PaperboyResult<Vec<Article>> {
        self.calls.lock().unwrap().push(params.clone());
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(PaperboyError::fetch(message));
        }
        Ok(self.articles.lock().unwrap().clone())
    }
}

/// Mock implementation of Transformer for testing
///
/// Fails for the configured content ids and optionally sleeps to simulate
/// a slow transform.
#[derive(Debug, Clone, Default)]
pub struct MockTransformer {
    fail_on: Arc<HashSet<String>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(content_ids: &[&str]) -> Self {
        Self {
            fail_on: Arc::new(content_ids.iter().map(|id| id.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transformer for MockTransformer {
    fn transform(&self, article: &Article) -> PaperboyResult<Summary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if self.fail_on.contains(&article.content_id) {
            return Err(PaperboyError::extraction(
                &article.content_id,
                "mock transform failure",
            ));
        }
        Ok(summary_for(article))
    }
}
