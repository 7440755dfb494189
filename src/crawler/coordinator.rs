//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Building seed tasks from the configuration
//! - Dispatching frontier tasks to a bounded, adaptive worker pool
//! - Turning list pages into detail tasks and the next list page
//! - Retrying failed tasks with backoff
//! - Stopping on the target count, an empty frontier or cancellation
//!
//! The coordinator is the single writer of the frontier. Workers only
//! fetch and process one page each and report back; every enqueue happens
//! here, after the report for the page that discovered it.

use crate::config::Config;
use crate::crawler::block::{BlockDetector, PhraseBlockDetector};
use crate::crawler::fetcher::{FetchedPage, HttpFetcher, PageFetcher, RequestProfile};
use crate::crawler::frontier::{Frontier, FrontierTask, TaskKind};
use crate::crawler::parser::{parse_list_page, ListPage};
use crate::crawler::scheduler::{retry_backoff, ConcurrencyGovernor};
use crate::extract::DetailExtractor;
use crate::output::{ResultSink, RunSummary};
use crate::state::{Admission, FailureKind, RunState, TaskError};
use crate::storage::RecordStore;
use crate::url::{build_search_url, is_job_url, keyword_from_search_url, page_from_search_url};
use crate::{Result, ScrapeError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;

/// What a worker did with its task
enum TaskOutcome {
    /// A list page was parsed
    Listed(ListPage),

    /// A record was accepted by the sink
    Saved,

    /// The sink refused the record because the target was met meanwhile
    Dropped,

    /// The target was met before the page was fetched
    Skipped,

    /// The page had no title
    Discarded,
}

struct TaskReport {
    task: FrontierTask,
    result: std::result::Result<TaskOutcome, TaskError>,
}

/// Everything a worker needs, shared read-only across workers
struct TaskContext {
    fetcher: Arc<dyn PageFetcher>,
    profile: RequestProfile,
    block_detector: Arc<dyn BlockDetector>,
    extractor: DetailExtractor,
    sink: ResultSink,
    state: Arc<RunState>,
    request_timeout: Duration,
    pacing_delay: Duration,
    retry_backoff: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    state: Arc<RunState>,
    frontier: Frontier,
    governor: ConcurrencyGovernor,
    ctx: Arc<TaskContext>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `store` - Where accepted records are persisted
    /// * `cancel` - Token that stops dispatch when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created and seeded coordinator
    /// * `Err(ScrapeError)` - The client could not be built or no seed task was possible
    pub fn new(
        config: Config,
        store: Box<dyn RecordStore>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
        Self::with_fetcher(config, fetcher, store, cancel)
    }

    /// Creates a coordinator around a caller-supplied fetcher
    pub fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        store: Box<dyn RecordStore>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let block_detector = Arc::new(PhraseBlockDetector::new(&config.crawler.block_phrases));
        Self::with_components(config, fetcher, block_detector, store, cancel)
    }

    /// Creates a coordinator around a caller-supplied fetcher and block detector
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        block_detector: Arc<dyn BlockDetector>,
        store: Box<dyn RecordStore>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let state = Arc::new(RunState::new(config.search.results_wanted as usize));

        let ctx = TaskContext {
            fetcher,
            profile: RequestProfile::from_config(&config.request)?,
            block_detector,
            extractor: DetailExtractor::new(config.site.source.clone()),
            sink: ResultSink::new(
                store,
                Arc::clone(&state),
                config.output.batch_size as usize,
            ),
            state: Arc::clone(&state),
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            pacing_delay: Duration::from_millis(config.crawler.pacing_delay_ms),
            retry_backoff: Duration::from_millis(config.crawler.retry_backoff_ms),
        };

        let mut frontier = Frontier::new(Arc::clone(&state));
        let mut seeded = 0;
        for task in seed_tasks(&config)? {
            let accepted = if task.is_detail() {
                frontier.enqueue_detail(task) == Admission::Accepted
            } else {
                frontier.enqueue_list(task)
            };
            if accepted {
                seeded += 1;
            }
        }

        if seeded == 0 {
            return Err(ScrapeError::NoSeeds);
        }
        tracing::info!("Seeded frontier with {} tasks", seeded);

        Ok(Self {
            governor: ConcurrencyGovernor::from_config(&config.crawler),
            config: Arc::new(config),
            state,
            frontier,
            ctx: Arc::new(ctx),
            cancel,
        })
    }

    /// Runs the main crawl loop
    ///
    /// This is the core crawling logic that:
    /// 1. Dispatches frontier tasks while the pool has room
    /// 2. Handles each worker report as it completes
    /// 3. Stops dispatching once the target is met or the run is cancelled
    /// 4. Waits for in-flight tasks, then flushes the result sink
    pub async fn run(mut self) -> Result<RunSummary> {
        let started = Instant::now();
        let cancel = self.cancel.clone();
        let mut workers: JoinSet<TaskReport> = JoinSet::new();
        // Dispatched tasks by worker id, so a panicked worker can be settled
        let mut in_flight: HashMap<Id, FrontierTask> = HashMap::new();
        let mut cancelled = false;
        let mut target_logged = false;

        tracing::info!(
            "Starting crawl: target {} records, up to {} list pages",
            self.state.target(),
            self.config.search.max_pages
        );
        tracing::info!("Writing records to {}", self.ctx.sink.describe().await);

        loop {
            if !cancelled && cancel.is_cancelled() {
                tracing::warn!(
                    "Cancellation requested, waiting for {} in-flight tasks",
                    workers.len()
                );
                cancelled = true;
            }

            let target_reached = self.state.target_reached();
            if target_reached && !target_logged {
                tracing::info!(
                    "Target of {} records reached, waiting for {} in-flight tasks",
                    self.state.target(),
                    workers.len()
                );
                target_logged = true;
            }

            if !cancelled && !target_reached {
                while workers.len() < self.governor.limit() {
                    let Some(task) = self.frontier.dequeue() else {
                        break;
                    };
                    tracing::debug!("Dispatching {} (attempt {})", task.label(), task.attempt + 1);
                    let handle = workers.spawn(process_task(Arc::clone(&self.ctx), task.clone()));
                    in_flight.insert(handle.id(), task);
                }
            }

            if workers.is_empty() {
                break;
            }

            tokio::select! {
                joined = workers.join_next_with_id() => match joined {
                    Some(Ok((id, report))) => {
                        in_flight.remove(&id);
                        self.handle_report(report);
                    }
                    Some(Err(e)) => {
                        let task = in_flight.remove(&e.id());
                        self.handle_crashed_worker(task, e);
                    }
                    None => break,
                },
                _ = cancel.cancelled(), if !cancelled => {
                    tracing::warn!(
                        "Cancellation requested, waiting for {} in-flight tasks",
                        workers.len()
                    );
                    cancelled = true;
                }
            }
        }

        if !self.frontier.is_empty() {
            tracing::debug!("{} tasks left in the frontier", self.frontier.len());
        }

        let persisted = match self.ctx.sink.finish().await {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::error!("Failed to persist final batch: {}", e);
                return Err(e.into());
            }
        };

        let counters = self.state.snapshot();
        if counters.saved == 0 {
            tracing::warn!(
                "Run finished without saving any records; the search may be empty or requests may be blocked"
            );
        }

        let summary = RunSummary::from_counters(
            self.state.target(),
            counters,
            persisted,
            cancelled,
            started.elapsed(),
        );

        tracing::info!(
            "Crawl finished: {} of {} records saved in {:.1}s ({} list pages, {} failed)",
            summary.saved,
            summary.target,
            summary.elapsed.as_secs_f64(),
            summary.list_pages,
            summary.failed
        );

        Ok(summary)
    }

    fn handle_report(&mut self, report: TaskReport) {
        let TaskReport { task, result } = report;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                self.handle_failure(task, error);
                return;
            }
        };

        self.governor.on_success();
        match outcome {
            TaskOutcome::Listed(page) => self.handle_list_page(&task, page),
            TaskOutcome::Saved => {}
            TaskOutcome::Dropped => {
                tracing::debug!("{} dropped, target already met", task.label());
            }
            TaskOutcome::Skipped => {
                self.state.release_detail();
                tracing::debug!("{} skipped, target already met", task.label());
            }
            TaskOutcome::Discarded => {
                self.state.record_discarded();
                tracing::debug!("{} discarded, no title at {}", task.label(), task.url);
            }
        }
    }

    /// Settles a task whose worker panicked or was aborted
    ///
    /// The task is abandoned without a retry; a detail task gives back its
    /// pending slot.
    fn handle_crashed_worker(&mut self, task: Option<FrontierTask>, error: JoinError) {
        self.state.record_failure();

        let Some(task) = task else {
            tracing::error!("Worker task failed: {}", error);
            return;
        };

        tracing::error!("Worker for {} failed: {}", task.label(), error);
        if task.is_detail() {
            self.state.release_detail();
        }
    }

    fn handle_failure(&mut self, task: FrontierTask, error: TaskError) {
        let retries = self.config.crawler.max_request_retries;

        match error.kind() {
            FailureKind::Retryable if task.attempt < retries => {
                self.governor.on_retryable_failure();
                tracing::warn!(
                    "{} failed: {} (retry {}/{})",
                    task.label(),
                    error,
                    task.attempt + 1,
                    retries
                );
                self.frontier.requeue(task);
                return;
            }
            FailureKind::Retryable => {
                self.governor.on_retryable_failure();
                tracing::warn!(
                    "Abandoning {} after {} attempts: {}",
                    task.label(),
                    task.attempt + 1,
                    error
                );
            }
            FailureKind::Permanent => {
                tracing::warn!("Skipping {}: {}", task.label(), error);
            }
        }

        self.state.record_failure();
        if task.is_detail() {
            self.state.release_detail();
        }
    }

    fn handle_list_page(&mut self, task: &FrontierTask, page: ListPage) {
        let TaskKind::List {
            page: page_number,
            keyword,
            search_base,
        } = &task.kind
        else {
            return;
        };

        self.state.record_list_page();

        let found = page.job_urls.len();
        let mut enqueued = 0;
        let mut over_ceiling = 0;
        for url in page.job_urls {
            match self.frontier.enqueue_detail(FrontierTask::detail(url)) {
                Admission::Accepted => enqueued += 1,
                Admission::CeilingReached => over_ceiling += 1,
                Admission::Duplicate => {}
            }
        }

        tracing::info!(
            "{} | found {}, enqueued {}, saved {}",
            task.label(),
            found,
            enqueued,
            self.state.saved_count()
        );
        if over_ceiling > 0 {
            tracing::debug!("{} postings beyond the target were not enqueued", over_ceiling);
        }

        let scope = task.list_scope().unwrap_or(task.url.as_str());
        if let Some(next) = self.next_list_task(
            *page_number,
            keyword.as_deref(),
            search_base,
            scope,
            page.next_page_url,
            found,
            enqueued,
        ) {
            self.frontier.enqueue_list(next);
        }
    }

    /// Decides whether the page after `page_number` is worth requesting
    fn next_list_task(
        &self,
        page_number: u32,
        keyword: Option<&str>,
        search_base: &str,
        scope: &str,
        next_link: Option<Url>,
        found: usize,
        enqueued: usize,
    ) -> Option<FrontierTask> {
        if found == 0 {
            tracing::info!("No postings on page {}, stopping pagination", page_number);
            return None;
        }

        let threshold = self.config.crawler.min_new_details_to_paginate as usize;
        if threshold > 0 && enqueued < threshold {
            tracing::info!(
                "Only {} new postings on page {}, stopping pagination",
                enqueued,
                page_number
            );
            return None;
        }

        let next_page = page_number + 1;
        if next_page > self.config.search.max_pages {
            tracing::info!("Reached max pages ({})", self.config.search.max_pages);
            return None;
        }

        if !self.state.detail_capacity_left() {
            tracing::debug!("Detail ceiling reached, not requesting page {}", next_page);
            return None;
        }

        let url = match keyword {
            Some(keyword) => match build_search_url(search_base, keyword, next_page) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Cannot build URL for page {}: {}", next_page, e);
                    return None;
                }
            },
            None => next_link?,
        };

        Some(FrontierTask::list_in_scope(
            url,
            next_page,
            keyword.map(String::from),
            search_base.to_string(),
            scope.to_string(),
        ))
    }
}

/// Builds the initial frontier tasks
///
/// Without explicit start URLs the run starts at page 1 of the keyword
/// search. Explicit start URLs carrying a `-jobs-<digits>` marker become
/// detail tasks; any other start URL is a list page, paginated through the
/// canonical search form when its keyword can be recovered.
pub fn seed_tasks(config: &Config) -> Result<Vec<FrontierTask>> {
    let explicit = config.search.explicit_seeds();

    if explicit.is_empty() {
        let keyword = config.search.keyword.trim().to_string();
        let url = build_search_url(&config.site.base_url, &keyword, 1)?;
        return Ok(vec![FrontierTask::list(
            url,
            1,
            Some(keyword),
            config.site.base_url.clone(),
        )]);
    }

    explicit
        .iter()
        .map(|raw| -> Result<FrontierTask> {
            let url = Url::parse(raw)?;
            if is_job_url(url.path()) {
                return Ok(FrontierTask::detail(url));
            }

            let keyword = keyword_from_search_url(&url);
            let page = if keyword.is_some() {
                page_from_search_url(&url)
            } else {
                1
            };
            let search_base = url.origin().ascii_serialization();
            Ok(FrontierTask::list(url, page, keyword, search_base))
        })
        .collect()
}

async fn process_task(ctx: Arc<TaskContext>, task: FrontierTask) -> TaskReport {
    let result = execute_task(&ctx, &task).await;
    TaskReport { task, result }
}

/// Runs one task's fetch, parse, extract and persist pipeline
async fn execute_task(
    ctx: &TaskContext,
    task: &FrontierTask,
) -> std::result::Result<TaskOutcome, TaskError> {
    let delay = retry_backoff(ctx.retry_backoff, task.attempt) + ctx.pacing_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if task.is_detail() && ctx.state.target_reached() {
        return Ok(TaskOutcome::Skipped);
    }

    let page = fetch_page(ctx, task).await?;

    match &task.kind {
        TaskKind::List { .. } => {
            if ctx.block_detector.is_blocked(&page.body) {
                return Err(TaskError::Blocked {
                    url: task.url.to_string(),
                });
            }

            let base_url = Url::parse(&page.final_url).unwrap_or_else(|_| task.url.clone());
            Ok(TaskOutcome::Listed(parse_list_page(&page.body, &base_url)))
        }
        TaskKind::Detail { job_id } => {
            let record = ctx
                .extractor
                .extract(&page.body, task.url.as_str(), job_id.clone());

            let Some(record) = record else {
                return Ok(TaskOutcome::Discarded);
            };

            if ctx.sink.record(record).await {
                Ok(TaskOutcome::Saved)
            } else {
                Ok(TaskOutcome::Dropped)
            }
        }
    }
}

async fn fetch_page(
    ctx: &TaskContext,
    task: &FrontierTask,
) -> std::result::Result<FetchedPage, TaskError> {
    let url = task.url.as_str();
    let page = tokio::time::timeout(
        ctx.request_timeout,
        ctx.fetcher.fetch(url, ctx.profile.headers()),
    )
    .await
    .map_err(|_| TaskError::Timeout {
        url: url.to_string(),
    })??;

    if page.status_code != 200 {
        return Err(TaskError::HttpStatus {
            url: url.to_string(),
            status: page.status_code,
        });
    }

    Ok(page)
}

/// Runs a complete crawl operation over HTTP
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `store` - Where accepted records are persisted
/// * `cancel` - Token that stops dispatch when cancelled
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run finished, possibly short of its target
/// * `Err(ScrapeError)` - Startup failed or the final batch could not be persisted
pub async fn run_crawl(
    config: Config,
    store: Box<dyn RecordStore>,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    Coordinator::new(config, store, cancel)?.run().await
}
