//! Application root.
//!
//! Owns the process-wide pieces that every view shares: the remote store,
//! the toast queue, the invalidation signal and the progress stats cache.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::events::InvalidationSignal;
use crate::notify::{Notifier, Toast};
use crate::query::PageQuery;
use crate::remote::{HttpStore, RemoteStore};
use crate::types::{ProgressStats, ViewKey};
use crate::view::{CollectionView, FetchOutcome, Pending};

const PROGRESS_FAILED_MESSAGE: &str = "Failed to load progress";

/// Last successfully read progress stats
#[derive(Debug, Default)]
pub struct StatsCache {
    last: Mutex<Option<ProgressStats>>,
}

impl StatsCache {
    pub fn get(&self) -> Option<ProgressStats> {
        *self.last.lock()
    }

    pub fn store(&self, stats: ProgressStats) {
        *self.last.lock() = Some(stats);
    }
}

pub struct App {
    config: Config,
    store: Arc<dyn RemoteStore>,
    notifier: Notifier,
    invalidation: InvalidationSignal,
    stats: StatsCache,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(config: Config, store: Arc<dyn RemoteStore>) -> Self {
        let notifier = Notifier::new(config.notifications);
        Self {
            config,
            store,
            notifier,
            invalidation: InvalidationSignal::new(),
            stats: StatsCache::default(),
        }
    }

    /// Build an app talking to the HTTP store named in `config`
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let store = HttpStore::from_config(&config)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn invalidation(&self) -> &InvalidationSignal {
        &self.invalidation
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Open a tab on a company/bucket list and start its first read.
    ///
    /// The view follows invalidations until it is closed or dropped.
    pub fn open_view(&self, view_key: ViewKey) -> (CollectionView, Pending<FetchOutcome>) {
        self.open_query(PageQuery::new(view_key, self.config.page_size))
    }

    /// Open a tab already positioned on `query`
    pub fn open_query(&self, query: PageQuery) -> (CollectionView, Pending<FetchOutcome>) {
        let view = CollectionView::new(
            Arc::clone(&self.store),
            self.notifier.clone(),
            query,
            self.config.search_debounce(),
        );
        view.subscribe_to(&self.invalidation);
        let first_read = view.load();
        (view, first_read)
    }

    /// Read overall progress, falling back to the last good value on failure
    pub async fn progress(&self) -> Option<ProgressStats> {
        match self.store.read_stats().await {
            Ok(stats) => {
                self.stats.store(stats);
                Some(stats)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read progress stats");
                let cached = self.stats.get();
                // Stale numbers are still shown, so that case is only a warning
                match cached {
                    Some(_) => self.notifier.enqueue(Toast::warning(PROGRESS_FAILED_MESSAGE)),
                    None => self.notifier.error(PROGRESS_FAILED_MESSAGE),
                }
                cached
            }
        }
    }

    /// The background sync finished; tell the user and refresh open views
    pub fn sync_completed(&self, count: usize) {
        tracing::info!(count, "sync completed");
        self.notifier.success(format!("Synced {count} questions"));
        let reached = self.invalidation.invalidate();
        tracing::debug!(reached, "views invalidated");
    }

    pub fn sync_failed(&self, err: &TrackerError) {
        tracing::warn!(error = %err, "sync failed");
        self.notifier.error(format!("Sync failed: {err}"));
    }
}
