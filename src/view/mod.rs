//! Collection view controller.
//!
//! A `CollectionView` owns one company/bucket tab: the current query, the
//! loaded page, the selection and the pending search. UI intents go in as
//! method calls; the view issues reads and writes against the shared
//! [`RemoteStore`] and reports failures through the [`Notifier`].
//!
//! Reads and writes run on spawned tasks. Methods that start one return a
//! [`Pending`] that can be awaited for the outcome or simply dropped; the
//! task runs to completion either way and its result lands in the view.

pub mod debounce;
pub mod fetch;
pub mod reconcile;
pub mod selection;

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::{JoinError, JoinHandle};

use crate::error::TrackerError;
use crate::events::InvalidationSignal;
use crate::notify::Notifier;
use crate::query::{PageQuery, SortField, SortOrder};
use crate::remote::{PageRequest, RemoteStore};
use crate::types::{Difficulty, FieldUpdate, Fragment, QuestionId, Record, RecordPatch, ViewKey};

pub use debounce::Debouncer;
pub use fetch::{FetchCoordinator, FetchOutcome, FetchTicket};
pub use selection::SelectionSet;

/// Message shown when a page read fails
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load questions";

/// Result of a single or batch write
#[derive(Debug)]
pub enum WriteOutcome {
    /// The store accepted the write; `matched` loaded rows were updated
    Applied { matched: usize },
    /// Nothing to write (empty selection or no batch difficulty chosen)
    Skipped,
    /// The store refused or the request failed; rows are unchanged
    Rejected(TrackerError),
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied { .. })
    }
}

impl From<JoinError> for WriteOutcome {
    fn from(err: JoinError) -> Self {
        WriteOutcome::Rejected(TrackerError::Task(err.to_string()))
    }
}

/// Outcome of work started by the view.
///
/// Await it to learn the outcome; drop it to let the work finish unobserved.
#[derive(Debug)]
pub enum Pending<T> {
    Ready(Ready<T>),
    Spawned(JoinHandle<T>),
}

impl<T> Pending<T> {
    fn ready(value: T) -> Self {
        Pending::Ready(ready(value))
    }
}

impl<T: From<JoinError>> Future for Pending<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        match self.get_mut() {
            Pending::Ready(value) => Pin::new(value).poll(cx),
            Pending::Spawned(handle) => Pin::new(handle)
                .poll(cx)
                .map(|joined| joined.unwrap_or_else(T::from)),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub query: PageQuery,
    pub rows: Vec<Record>,
    pub total_pages: u32,
    pub loading: bool,
    pub selected: Vec<QuestionId>,
    pub all_selected: bool,
    /// Search box contents, which run ahead of the query while debouncing
    pub search_input: String,
    pub batch_difficulty: Option<Difficulty>,
}

#[derive(Debug)]
struct ViewState {
    fetch: FetchCoordinator,
    selection: SelectionSet,
    search_input: String,
    batch_difficulty: Option<Difficulty>,
}

impl ViewState {
    /// Merge write results, then drop selected ids whose rows were masked out
    fn apply_fragments(&mut self, fragments: &[Fragment]) -> usize {
        let matched = self.fetch.apply_fragments(fragments);
        self.selection.retain_loaded(self.fetch.rows());
        matched
    }
}

struct ViewInner {
    store: Arc<dyn RemoteStore>,
    notifier: Notifier,
    state: Mutex<ViewState>,
    debouncer: Mutex<Debouncer>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ViewInner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

/// Cloneable handle to one open question list
#[derive(Clone)]
pub struct CollectionView {
    inner: Arc<ViewInner>,
}

impl std::fmt::Debug for CollectionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionView")
            .field("query", &self.query())
            .finish_non_exhaustive()
    }
}

impl CollectionView {
    /// Create a view on `query`. No read is issued until [`Self::load`].
    pub fn new(
        store: Arc<dyn RemoteStore>,
        notifier: Notifier,
        query: PageQuery,
        search_debounce: Duration,
    ) -> Self {
        let search_input = query.search_text.clone().unwrap_or_default();
        Self {
            inner: Arc::new(ViewInner {
                store,
                notifier,
                state: Mutex::new(ViewState {
                    fetch: FetchCoordinator::new(query),
                    selection: SelectionSet::new(),
                    search_input,
                    batch_difficulty: None,
                }),
                debouncer: Mutex::new(Debouncer::new(search_debounce)),
                listener: Mutex::new(None),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Read the current query
    pub fn load(&self) -> Pending<FetchOutcome> {
        let query = self.query();
        self.set_query(query)
    }

    /// Re-read the current query unchanged, e.g. after an invalidation
    pub fn refresh(&self) -> Pending<FetchOutcome> {
        self.load()
    }

    /// Make `query` current and read it
    pub fn set_query(&self, query: PageQuery) -> Pending<FetchOutcome> {
        let ticket = self.inner.state.lock().fetch.begin(query);
        let request = PageRequest::from(&ticket.query);
        let inner = Arc::clone(&self.inner);

        Pending::Spawned(tokio::spawn(async move {
            let result = inner.store.read_page(&request).await;
            inner.settle(&ticket, result)
        }))
    }

    fn update_query(&self, change: impl FnOnce(&PageQuery) -> PageQuery) -> Pending<FetchOutcome> {
        let next = change(&self.query());
        self.set_query(next)
    }

    pub fn go_to_page(&self, page: u32) -> Pending<FetchOutcome> {
        self.update_query(|q| q.with_page(page))
    }

    /// Column-header click
    pub fn toggle_sort(&self, field: SortField) -> Pending<FetchOutcome> {
        self.update_query(|q| q.with_sort_toggled(field))
    }

    pub fn set_sort(&self, field: Option<SortField>, order: SortOrder) -> Pending<FetchOutcome> {
        self.update_query(|q| q.with_sort(field, order))
    }

    pub fn set_tag_filter(&self, tag: Option<&str>) -> Pending<FetchOutcome> {
        self.update_query(|q| q.with_tag_filter(tag))
    }

    pub fn set_unsolved_only(&self, unsolved_only: bool) -> Pending<FetchOutcome> {
        self.update_query(|q| q.with_unsolved_only(unsolved_only))
    }

    /// Show another company/bucket list in this tab
    pub fn switch_view(&self, view_key: ViewKey) -> Pending<FetchOutcome> {
        self.inner.state.lock().selection.clear();
        self.update_query(|q| q.with_view(view_key))
    }

    /// Apply search text immediately, bypassing the debounce
    pub fn set_search(&self, text: &str) -> Pending<FetchOutcome> {
        self.inner.debouncer.lock().cancel();
        self.inner.state.lock().search_input = text.to_string();
        self.update_query(|q| q.with_search(text))
    }

    /// Keystroke in the search box. The read happens once typing pauses.
    pub fn type_search(&self, text: &str) {
        self.inner.state.lock().search_input = text.to_string();

        let weak: Weak<ViewInner> = Arc::downgrade(&self.inner);
        let text = text.to_string();
        self.inner.debouncer.lock().schedule(async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let view = CollectionView { inner };
            let next = view.query().with_search(&text);
            // Detach; the read settles into the view on its own
            drop(view.set_query(next));
        });
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Edit one field of one row. Rows change only once the store confirms.
    pub fn update_record(&self, id: QuestionId, update: FieldUpdate) -> Pending<WriteOutcome> {
        let patch = RecordPatch::from(update);
        let inner = Arc::clone(&self.inner);

        Pending::Spawned(tokio::spawn(async move {
            match inner.store.write_record(id, &patch).await {
                Ok(fragments) => {
                    let matched = inner.state.lock().apply_fragments(&fragments);
                    tracing::debug!(%id, matched, "record updated");
                    WriteOutcome::Applied { matched }
                }
                Err(err) => inner.write_failed(err),
            }
        }))
    }

    /// Apply `patch` to every selected row in one write.
    ///
    /// With nothing selected no write is issued. On success the selection
    /// and the chosen batch difficulty are cleared.
    pub fn batch_update(&self, patch: RecordPatch) -> Pending<WriteOutcome> {
        let ids = self.inner.state.lock().selection.snapshot();
        if ids.is_empty() || patch.is_empty() {
            return Pending::ready(WriteOutcome::Skipped);
        }

        let inner = Arc::clone(&self.inner);
        Pending::Spawned(tokio::spawn(async move {
            match inner.store.write_batch(&ids, &patch).await {
                Ok(fragments) => {
                    let mut state = inner.state.lock();
                    let matched = state.apply_fragments(&fragments);
                    state.selection.clear();
                    state.batch_difficulty = None;
                    tracing::debug!(count = ids.len(), matched, "batch updated");
                    WriteOutcome::Applied { matched }
                }
                Err(err) => inner.write_failed(err),
            }
        }))
    }

    /// Pick the difficulty the batch action will apply
    pub fn choose_batch_difficulty(&self, difficulty: Option<Difficulty>) {
        self.inner.state.lock().batch_difficulty = difficulty;
    }

    /// Rate every selected row with the chosen batch difficulty
    pub fn apply_batch_difficulty(&self) -> Pending<WriteOutcome> {
        let Some(difficulty) = self.inner.state.lock().batch_difficulty else {
            return Pending::ready(WriteOutcome::Skipped);
        };
        self.batch_update(RecordPatch::from(FieldUpdate::UserDifficulty(Some(
            difficulty,
        ))))
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Flip selection of a loaded row. Ids not on the page are ignored.
    pub fn toggle_selected(&self, id: QuestionId) -> bool {
        let mut state = self.inner.state.lock();
        if !state.fetch.rows().iter().any(|r| r.id == id) {
            return false;
        }
        state.selection.toggle(id)
    }

    pub fn select_all(&self) {
        let mut state = self.inner.state.lock();
        let ViewState {
            fetch, selection, ..
        } = &mut *state;
        selection.select_all(fetch.rows());
    }

    pub fn clear_selection(&self) {
        self.inner.state.lock().selection.clear();
    }

    pub fn is_all_selected(&self) -> bool {
        let state = self.inner.state.lock();
        state.selection.is_all_selected(state.fetch.rows())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Re-read the current page whenever `signal` fires, until the view
    /// is closed or dropped. Replaces any previous subscription.
    pub fn subscribe_to(&self, signal: &InvalidationSignal) {
        let mut receiver = signal.subscribe();
        let weak = Arc::downgrade(&self.inner);

        let listener = tokio::spawn(async move {
            while receiver.changed().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                tracing::debug!("invalidated, refreshing view");
                drop(CollectionView { inner }.refresh());
            }
        });

        if let Some(previous) = self.inner.listener.lock().replace(listener) {
            previous.abort();
        }
    }

    /// Stop the pending search and the invalidation listener. Reads and
    /// writes already issued still settle.
    pub fn close(&self) {
        self.inner.debouncer.lock().cancel();
        if let Some(listener) = self.inner.listener.lock().take() {
            listener.abort();
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn query(&self) -> PageQuery {
        self.inner.state.lock().fetch.query().clone()
    }

    pub fn rows(&self) -> Vec<Record> {
        self.inner.state.lock().fetch.rows().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().fetch.is_loading()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.inner.state.lock();
        ViewSnapshot {
            query: state.fetch.query().clone(),
            rows: state.fetch.rows().to_vec(),
            total_pages: state.fetch.total_pages(),
            loading: state.fetch.is_loading(),
            selected: state.selection.snapshot(),
            all_selected: state.selection.is_all_selected(state.fetch.rows()),
            search_input: state.search_input.clone(),
            batch_difficulty: state.batch_difficulty,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}

impl ViewInner {
    fn settle(
        &self,
        ticket: &FetchTicket,
        result: crate::error::Result<crate::remote::PageResult>,
    ) -> FetchOutcome {
        let outcome = {
            let mut state = self.state.lock();
            let outcome = state.fetch.settle(ticket, result);
            // Applied and failed reads both replace the rows on screen
            if !matches!(outcome, FetchOutcome::Stale) {
                state.selection.clear();
            }
            outcome
        };

        if matches!(outcome, FetchOutcome::Failed(_)) {
            self.notifier.error(LOAD_FAILED_MESSAGE);
        }
        outcome
    }

    fn write_failed(&self, err: TrackerError) -> WriteOutcome {
        tracing::warn!(error = %err, "write failed");
        self.notifier.error(format!("Update failed: {err}"));
        WriteOutcome::Rejected(err)
    }
}
