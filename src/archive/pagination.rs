//! Pagination driver
//!
//! Drives the pipeline one page at a time: rotate a search term, fetch hits,
//! enrich them, keep the displayable ones and drop anything already emitted
//! this session. Empty pages are retried with a fresh term; once retries run
//! out the bundled fallback set is served instead.
//!
//! Session state (rotator, dedup set, page counter, epoch) is shared with the
//! background prefetch task through a mutex that is never held across an
//! `.await`. Every refresh bumps the epoch; a fetch started under an older
//! epoch checks it before admitting ids and gives up with
//! [`PipelineError::Stale`], so it cannot leak ids into the new session.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::ArchiveSource;
use super::dedup::DedupFilter;
use super::enricher::ItemEnricher;
use super::fallback::FallbackSet;
use super::rotator::SearchTermRotator;
use crate::config::{ArchiveConfig, FeedConfig};
use crate::types::CanonicalItem;

/// Pipeline errors surfaced to the feed consumer
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No search terms configured")]
    EmptyCatalog,

    #[error("Page {page} stayed empty after {attempts} attempts{}", last_error_suffix(.last_error))]
    Exhausted {
        page: u32,
        attempts: u32,
        last_error: Option<String>,
    },

    #[error("Session was refreshed while fetching page {0}")]
    Stale(u32),

    #[error("Prefetch task failed: {0}")]
    Task(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_deref()
        .map(|e| format!(" (last error: {})", e))
        .unwrap_or_default()
}

/// Consumer-visible driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Loading(u32),
    Ready(u32),
    Refreshing,
}

/// One served page
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub page: u32,
    pub items: Vec<CanonicalItem>,
}

/// Per-session state shared between the driver and its prefetch task
struct SessionState {
    rotator: SearchTermRotator,
    dedup: DedupFilter,
    /// Next page `next_page` will serve
    page: u32,
    epoch: u64,
    /// Survives refresh so regenerated fallback ids stay unique
    fallback_serial: u64,
}

impl SessionState {
    fn check_epoch(&self, epoch: u64, page: u32) -> Result<(), PipelineError> {
        if self.epoch == epoch {
            Ok(())
        } else {
            Err(PipelineError::Stale(page))
        }
    }

    /// Forget everything emitted; the rotator keeps its cycle
    fn reset(&mut self) {
        self.epoch += 1;
        self.page = 1;
        self.dedup.clear();
    }
}

/// Runs the retry-then-fallback cycle for one page
#[derive(Clone)]
struct PageFetcher {
    source: Arc<dyn ArchiveSource>,
    enricher: Arc<ItemEnricher>,
    fallback: Arc<FallbackSet>,
    session: Arc<Mutex<SessionState>>,
    max_retries: u32,
    fallback_enabled: bool,
}

impl PageFetcher {
    async fn fetch(&self, page: u32, epoch: u64) -> Result<Vec<CanonicalItem>, PipelineError> {
        let attempts = self.max_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            let term = {
                let mut session = self.session.lock();
                session.check_epoch(epoch, page)?;
                session.rotator.next_term().to_string()
            };

            let hits = match self.source.search(&term, page).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(
                        "Search '{}' page {} failed (attempt {}/{}): {}",
                        term, page, attempt, attempts, e
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            let candidates: Vec<CanonicalItem> = self
                .enricher
                .enrich_all(hits)
                .await
                .into_iter()
                .filter(CanonicalItem::is_displayable)
                .collect();

            let admitted = {
                let mut session = self.session.lock();
                session.check_epoch(epoch, page)?;
                session.dedup.admit_all(candidates)
            };

            if !admitted.is_empty() {
                info!("Page {} ready: {} items for '{}'", page, admitted.len(), term);
                return Ok(admitted);
            }

            debug!(
                "Search '{}' page {} yielded nothing new (attempt {}/{})",
                term, page, attempt, attempts
            );
        }

        if !self.fallback_enabled {
            return Err(PipelineError::Exhausted {
                page,
                attempts,
                last_error,
            });
        }

        let mut session = self.session.lock();
        session.check_epoch(epoch, page)?;
        let SessionState {
            dedup,
            fallback_serial,
            ..
        } = &mut *session;
        let items = dedup.admit_all(self.fallback.regenerate(page, fallback_serial));

        warn!("Serving {} fallback items for page {}", items.len(), page);
        Ok(items)
    }
}

struct Prefetch {
    page: u32,
    epoch: u64,
    handle: JoinHandle<Result<Vec<CanonicalItem>, PipelineError>>,
}

/// Pull-based infinite feed over the archive
pub struct PaginationDriver {
    fetcher: PageFetcher,
    prefetch_enabled: bool,
    state: DriverState,
    /// At most one lookahead in flight
    slot: Option<Prefetch>,
}

impl PaginationDriver {
    pub fn new(
        source: Arc<dyn ArchiveSource>,
        archive: ArchiveConfig,
        feed: &FeedConfig,
    ) -> Result<Self, PipelineError> {
        let rotator = SearchTermRotator::new(feed.search_terms.clone())
            .ok_or(PipelineError::EmptyCatalog)?;
        let fallback = FallbackSet::new(archive.base());
        let enricher = ItemEnricher::new(Arc::clone(&source), archive);

        let session = SessionState {
            rotator,
            dedup: DedupFilter::new(),
            page: 1,
            epoch: 0,
            fallback_serial: 0,
        };

        Ok(Self {
            fetcher: PageFetcher {
                source,
                enricher: Arc::new(enricher),
                fallback: Arc::new(fallback),
                session: Arc::new(Mutex::new(session)),
                max_retries: feed.max_retries,
                fallback_enabled: feed.fallback_enabled,
            },
            prefetch_enabled: feed.prefetch,
            state: DriverState::Idle,
            slot: None,
        })
    }

    /// Fetch page `page` of the current session, retrying and falling back
    /// as needed. With the fallback enabled the result is never empty.
    pub async fn request_page(&mut self, page: u32) -> Result<Vec<CanonicalItem>, PipelineError> {
        let epoch = self.epoch();
        let previous = self.state;
        self.state = DriverState::Loading(page);

        let result = self.fetcher.fetch(page, epoch).await;
        self.state = match &result {
            Ok(_) => DriverState::Ready(page),
            Err(_) => previous,
        };
        result
    }

    /// Serve the next page, from the prefetch slot when it holds it, then
    /// start prefetching the page after.
    pub async fn next_page(&mut self) -> Result<FeedPage, PipelineError> {
        let (page, epoch) = {
            let session = self.fetcher.session.lock();
            (session.page, session.epoch)
        };

        let prefetched = if self.holds_prefetch(page, epoch) {
            self.state = DriverState::Loading(page);
            // The handle stays in the slot until the task completes, so a
            // cancelled pull leaves the finished page for the next one.
            let joined = match self.slot.as_mut() {
                Some(prefetch) => Some((&mut prefetch.handle).await),
                None => None,
            };
            self.slot = None;

            match joined {
                Some(Ok(Ok(items))) => {
                    debug!("Serving page {} from prefetch", page);
                    self.state = DriverState::Ready(page);
                    Some(items)
                }
                Some(Ok(Err(e))) => {
                    warn!("Prefetch of page {} failed: {}", page, e);
                    None
                }
                Some(Err(e)) => {
                    warn!("{}", PipelineError::Task(e.to_string()));
                    None
                }
                None => None,
            }
        } else {
            None
        };

        let items = match prefetched {
            Some(items) => items,
            None => self.request_page(page).await?,
        };

        self.fetcher.session.lock().page = page + 1;
        if self.prefetch_enabled {
            self.spawn_prefetch(page + 1, epoch);
        }

        Ok(FeedPage { page, items })
    }

    /// Start a new session and return its first page.
    ///
    /// Clears the emitted-id set and discards any in-flight prefetch; the
    /// term rotator keeps its cycle.
    pub async fn refresh(&mut self) -> Result<FeedPage, PipelineError> {
        self.state = DriverState::Refreshing;
        self.discard_prefetch();
        {
            let mut session = self.fetcher.session.lock();
            session.reset();
            info!("Feed refreshed (epoch {})", session.epoch);
        }
        self.next_page().await
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.fetcher.session.lock().epoch
    }

    /// Ids admitted in the current session
    pub fn admitted(&self) -> usize {
        self.fetcher.session.lock().dedup.len()
    }

    /// Whether a prefetch task currently occupies the slot
    pub fn has_prefetch(&self) -> bool {
        self.slot.is_some()
    }

    /// Whether the slot holds the lookahead for `page`; any other
    /// occupant is aborted and cleared
    fn holds_prefetch(&mut self, page: u32, epoch: u64) -> bool {
        match &self.slot {
            Some(prefetch) if prefetch.page == page && prefetch.epoch == epoch => true,
            Some(prefetch) => {
                debug!(
                    "Discarding prefetch of page {} (epoch {})",
                    prefetch.page, prefetch.epoch
                );
                self.discard_prefetch();
                false
            }
            None => false,
        }
    }

    fn spawn_prefetch(&mut self, page: u32, epoch: u64) {
        if self.slot.is_some() {
            return;
        }

        let fetcher = self.fetcher.clone();
        let handle = tokio::spawn(async move { fetcher.fetch(page, epoch).await });
        debug!("Prefetching page {}", page);
        self.slot = Some(Prefetch {
            page,
            epoch,
            handle,
        });
    }

    fn discard_prefetch(&mut self) {
        if let Some(prefetch) = self.slot.take() {
            debug!("Dropping prefetch of page {}", prefetch.page);
            prefetch.handle.abort();
        }
    }
}

impl Drop for PaginationDriver {
    fn drop(&mut self) {
        self.discard_prefetch();
    }
}
