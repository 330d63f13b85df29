//! Crawler coordinator - the crawl session loop
//!
//! This module ties the session together:
//! - Seeding the frontier according to the spider mode
//! - Keeping up to `max-concurrent-requests` fetches in flight
//! - Running the parser and rule engine on each fetched page
//! - Routing asset bytes to the asset sink and items to the item sink
//! - Offsite and duplicate filtering on every discovered request
//! - Cancellation and end-of-session statistics

use crate::config::{Config, SiteConfig, SpiderMode, StorageConfig};
use crate::crawler::parsers::run_parser;
use crate::crawler::scheduler::{Frontier, ScheduledFetch, Scheduler};
use crate::crawler::{FetchedPage, Fetcher, HttpFetcher, ParserKind, Request, RuleEngine};
use crate::extract::{Item, Page, SelectorSet};
use crate::output::{CrawlStats, ItemSink, JsonLinesWriter};
use crate::state::RequestOutcome;
use crate::storage::{retrieve_asset, AssetSink, FsAssetSink};
use crate::url::is_allowed_domain;
use crate::{FetchError, SweepError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a crawl task needs, shared read-only across tasks
struct SessionContext {
    fetcher: Arc<dyn Fetcher>,
    assets: Arc<dyn AssetSink>,
    selectors: SelectorSet,
    rules: RuleEngine,
    storage: StorageConfig,
    fetch_timeout: Duration,
}

/// Result of one dispatched request, applied by the session loop
struct Completion {
    request: Request,
    outcome: RequestOutcome,
    requests: Vec<Request>,
    item: Option<Item>,
    malformed: bool,
}

impl Completion {
    fn bare(request: Request, outcome: RequestOutcome) -> Self {
        Self {
            request,
            outcome,
            requests: Vec::new(),
            item: None,
            malformed: false,
        }
    }
}

impl SessionContext {
    async fn execute(&self, request: Request) -> Completion {
        let fetched = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(request.url())).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: request.url().to_string(),
            }),
        };

        let fetched = match fetched {
            Ok(page) => page,
            Err(e) => {
                let outcome = RequestOutcome::from_fetch_error(&e);
                tracing::warn!("Dropping {}: {}", request, e);
                return Completion::bare(request, outcome);
            }
        };

        match request.parser() {
            Some(ParserKind::Asset(tier)) => {
                let stored = retrieve_asset(
                    self.assets.as_ref(),
                    &self.storage,
                    fetched.final_url.as_str(),
                    tier,
                    &fetched.body,
                )
                .await;

                let outcome = match stored {
                    Ok(_) => RequestOutcome::Stored,
                    Err(e) => {
                        tracing::warn!("Failed to store {} asset from {}: {}", tier, fetched.final_url, e);
                        RequestOutcome::StorageFailed
                    }
                };
                Completion::bare(request, outcome)
            }
            parser => self.process_page(request, parser, &fetched),
        }
    }

    /// Parses the page and runs the rules; the document never crosses an await
    fn process_page(&self, request: Request, parser: Option<ParserKind>, fetched: &FetchedPage) -> Completion {
        let page = Page::parse(fetched.final_url.clone(), &fetched.text());

        let mut output = parser
            .map(|kind| run_parser(kind, &page, &self.selectors))
            .unwrap_or_default();

        if request.follows() {
            // Links the parser already emitted for this page are not repeated
            let emitted: HashSet<Url> = output.requests.iter().map(|r| r.url().clone()).collect();
            output.requests.extend(
                self.rules
                    .apply(&page)
                    .into_iter()
                    .filter(|r| !emitted.contains(r.url())),
            );
        }

        tracing::debug!(
            "Processed {} ({} new request(s), item: {})",
            request,
            output.requests.len(),
            output.item.is_some()
        );

        Completion {
            request,
            outcome: RequestOutcome::Processed,
            requests: output.requests,
            item: output.item,
            malformed: output.malformed.is_some(),
        }
    }
}

/// Builds the seed requests for the configured spider mode
///
/// Single-level seeds are listing pages parsed without rule evaluation;
/// recursive seeds are discover-only so the rule table drives traversal.
pub fn seed_requests(site: &SiteConfig) -> Result<Vec<Request>, SweepError> {
    site.start_urls
        .iter()
        .map(|raw| -> Result<Request, SweepError> {
            let url = Url::parse(raw)?;
            Ok(match site.mode {
                SpiderMode::SingleLevel => Request::parse_only(url, ParserKind::Listing),
                SpiderMode::Recursive => Request::discover(url),
            })
        })
        .collect()
}

/// Flags a rule table that does not fit the spider mode
fn rule_table_warning(mode: SpiderMode, rules: &RuleEngine) -> Option<String> {
    match mode {
        SpiderMode::SingleLevel if !rules.is_empty() => Some(format!(
            "{} rule(s) configured but ignored in single-level mode",
            rules.rules().len()
        )),
        SpiderMode::Recursive if rules.is_empty() => Some(
            "No rules configured in recursive mode; only the seed pages will be fetched".to_string(),
        ),
        _ => None,
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S: ItemSink> {
    context: Arc<SessionContext>,
    frontier: Arc<Frontier>,
    scheduler: Scheduler,
    allowed_domains: Vec<String>,
    seeds: Vec<Request>,
    items: S,
    stats: CrawlStats,
    progress_interval: u64,
    cancel: CancellationToken,
}

impl<S: ItemSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `fetcher` - Fetch boundary used for pages and assets
    /// * `assets` - Where fetched image bytes are stored
    /// * `items` - Downstream consumer of parsed items
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SweepError)` - A selector, rule or seed URL is invalid
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        assets: Arc<dyn AssetSink>,
        items: S,
    ) -> Result<Self, SweepError> {
        let selectors = SelectorSet::compile(&config.selectors)?;
        let rules = RuleEngine::from_config(&config.rules)?;
        let seeds = seed_requests(&config.site)?;

        if let Some(warning) = rule_table_warning(config.site.mode, &rules) {
            tracing::warn!("{}", warning);
        }

        let frontier = Arc::new(Frontier::new());
        let scheduler = Scheduler::new(
            Arc::clone(&frontier),
            config.crawler.max_concurrent_requests as usize,
        );

        Ok(Self {
            context: Arc::new(SessionContext {
                fetcher,
                assets,
                selectors,
                rules,
                storage: config.storage.clone(),
                fetch_timeout: config.crawler.fetch_timeout(),
            }),
            frontier,
            scheduler,
            allowed_domains: config.site.allowed_domains.clone(),
            seeds,
            items,
            stats: CrawlStats::new(),
            progress_interval: config.crawler.progress_interval.max(1),
            cancel: CancellationToken::new(),
        })
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops this session when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    /// Gives back the item sink once the session is over
    pub fn into_items(self) -> S {
        self.items
    }

    /// Runs the crawl session until the frontier is exhausted or cancelled
    ///
    /// Fetch, parse and storage failures are counted and logged; the session
    /// carries on. The session fails only when no seed could be fetched, when
    /// the item sink rejects a write, or when a crawl task panics.
    pub async fn run(&mut self) -> Result<CrawlStats, SweepError> {
        let mut seed_keys = HashSet::new();
        for request in self.seeds.clone() {
            let key = Frontier::fingerprint(&request);
            if self.submit(request) {
                seed_keys.insert(key);
            }
        }

        let attempted = seed_keys.len();
        if attempted == 0 {
            tracing::error!("No usable seed URLs");
            return Err(SweepError::SeedsUnreachable { attempted });
        }

        tracing::info!("Starting crawl session with {} seed URL(s)", attempted);

        let mut tasks: JoinSet<Completion> = JoinSet::new();
        let mut seeds_reached = 0usize;

        loop {
            while let Some(ScheduledFetch { request, _permit }) = self.scheduler.try_next() {
                let context = Arc::clone(&self.context);
                tasks.spawn(async move {
                    let completion = context.execute(request).await;
                    drop(_permit);
                    completion
                });
            }

            if tasks.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    tracing::info!("Crawl cancelled, abandoning {} in-flight request(s)", tasks.len());
                    tasks.abort_all();
                    self.stats.cancelled = true;
                    break;
                }

                joined = tasks.join_next() => {
                    let Some(joined) = joined else {
                        break;
                    };
                    let completion = joined?;

                    if completion.outcome.is_success()
                        && seed_keys.contains(&Frontier::fingerprint(&completion.request))
                    {
                        seeds_reached += 1;
                    }

                    self.apply(completion)?;
                }
            }
        }

        self.items.finish()?;
        self.stats.finish();

        if seeds_reached == 0 && !self.stats.cancelled {
            tracing::error!("None of the {} seed URL(s) could be fetched", attempted);
            return Err(SweepError::SeedsUnreachable { attempted });
        }

        tracing::info!(
            "Crawl completed: {} requests, {} items in {}s",
            self.stats.completed(),
            self.stats.items_emitted,
            self.stats.duration_seconds().unwrap_or(0)
        );

        Ok(self.stats.clone())
    }

    /// Applies one task's results to the session
    fn apply(&mut self, completion: Completion) -> Result<(), SweepError> {
        self.frontier.complete();
        self.stats.record(completion.outcome);

        if completion.malformed {
            self.stats.malformed_descriptors += 1;
        }

        for request in completion.requests {
            self.submit(request);
        }

        if let Some(item) = completion.item {
            self.items.emit(&item)?;
            self.stats.items_emitted += 1;
        }

        let completed = self.stats.completed();
        if completed % self.progress_interval == 0 {
            tracing::info!(
                "Progress: {} requests completed, {} pending, {} in flight, {} items",
                completed,
                self.frontier.pending_len(),
                self.frontier.in_flight(),
                self.stats.items_emitted
            );
        }

        Ok(())
    }

    /// Offsite check, then frontier dedup
    fn submit(&mut self, request: Request) -> bool {
        if !is_allowed_domain(request.url(), &self.allowed_domains) {
            tracing::debug!("Filtered offsite request {}", request);
            self.stats.record(RequestOutcome::Offsite);
            return false;
        }

        let description = request.to_string();
        if !self.frontier.enqueue(request) {
            tracing::debug!("Filtered duplicate request {}", description);
            self.stats.record(RequestOutcome::Duplicate);
            return false;
        }

        true
    }
}

/// Runs a complete crawl session with the default collaborators
///
/// Pages and assets are fetched over HTTP, assets are written into
/// `[output].images-dir` and items into the JSON Lines file at
/// `[output].items-path`.
///
/// # Example
///
/// ```no_run
/// use shutter_sweep::config::load_config;
/// use shutter_sweep::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = run_crawl(config, CancellationToken::new()).await?;
/// println!("{} items", stats.items_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, cancel: CancellationToken) -> Result<CrawlStats, SweepError> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;
    let assets = FsAssetSink::new(&config.output.images_dir);
    let items = JsonLinesWriter::create(Path::new(&config.output.items_path))?;

    let mut coordinator = Coordinator::new(&config, Arc::new(fetcher), Arc::new(assets), items)?
        .with_cancellation(cancel);
    coordinator.run().await
}
