//! In-memory question store.
//!
//! Mirrors the behaviour of the remote service closely enough to drive the
//! controller without a network: filtering, delegated sorting, pagination
//! and cascading writes. A question listed under several companies is
//! stored once per listing; all listings sharing a `link` share their
//! solved flag and rating.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::query::SortOrder;
use crate::query::sort::compare_delegated;
use crate::types::{Fragment, ProgressStats, QuestionId, Record, RecordPatch, ViewKey};

use super::{PageRequest, PageResult, RemoteStore};

/// On-disk fixture layout: a list of company/bucket views with their rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub views: Vec<FixtureView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureView {
    pub company: String,
    pub bucket: String,
    #[serde(default)]
    pub questions: Vec<Record>,
}

#[derive(Debug, Clone)]
struct Listing {
    view_key: ViewKey,
    record: Record,
}

#[derive(Debug, Default)]
struct MemoryState {
    listings: Vec<Listing>,
    failing_reads: u32,
    failing_writes: u32,
    reads: usize,
    writes: usize,
    batch_writes: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON fixture file
    pub fn from_fixture(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TrackerError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read fixture at {}: {}", path.display(), e),
            ))
        })?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        Ok(Self::from(fixture))
    }

    /// Add a row to a company/bucket list
    pub fn insert(&self, view_key: ViewKey, record: Record) {
        self.state.lock().listings.push(Listing { view_key, record });
    }

    /// Make the next `n` reads fail
    pub fn fail_next_reads(&self, n: u32) {
        self.state.lock().failing_reads = n;
    }

    /// Make the next `n` writes (single or batch) fail
    pub fn fail_next_writes(&self, n: u32) {
        self.state.lock().failing_writes = n;
    }

    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }

    pub fn batch_write_count(&self) -> usize {
        self.state.lock().batch_writes
    }

    /// Current stored copy of a row
    pub fn get(&self, id: QuestionId) -> Option<Record> {
        self.state
            .lock()
            .listings
            .iter()
            .find(|l| l.record.id == id)
            .map(|l| l.record.clone())
    }

    /// Out-of-band update of solved flags, as an account sync would do.
    ///
    /// Returns the number of distinct questions whose flag changed.
    pub fn sync_solved(&self, links: &[&str]) -> usize {
        let mut state = self.state.lock();
        let mut changed: HashSet<String> = HashSet::new();
        for listing in state.listings.iter_mut() {
            if links.contains(&listing.record.link.as_str()) && !listing.record.solved {
                listing.record.solved = true;
                changed.insert(listing.record.link.clone());
            }
        }
        changed.len()
    }
}

impl From<Fixture> for InMemoryStore {
    fn from(fixture: Fixture) -> Self {
        let listings = fixture
            .views
            .into_iter()
            .flat_map(|view| {
                let view_key = ViewKey::new(view.company, view.bucket);
                view.questions.into_iter().map(move |record| Listing {
                    view_key: view_key.clone(),
                    record,
                })
            })
            .collect();

        Self {
            state: Mutex::new(MemoryState {
                listings,
                ..Default::default()
            }),
        }
    }
}

impl MemoryState {
    fn take_read_failure(&mut self) -> bool {
        self.reads += 1;
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return true;
        }
        false
    }

    fn take_write_failure(&mut self) -> bool {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return true;
        }
        false
    }

    fn link_of(&self, id: QuestionId) -> Option<String> {
        self.listings
            .iter()
            .find(|l| l.record.id == id)
            .map(|l| l.record.link.clone())
    }

    /// Apply a patch to every listing of the question behind `id`
    fn apply(&mut self, link: &str, patch: &RecordPatch, out: &mut Vec<Fragment>) {
        for listing in self.listings.iter_mut().filter(|l| l.record.link == link) {
            let record = &mut listing.record;
            if let Some(solved) = patch.solved {
                record.solved = solved;
            }
            match patch.user_difficulty {
                Some(difficulty) => record.user_difficulty = difficulty,
                // Solving an unrated question rates it at its catalog difficulty
                None if patch.solved == Some(true) && record.user_difficulty.is_none() => {
                    record.user_difficulty = Some(record.remote_difficulty);
                }
                None => {}
            }

            let fragment = Fragment {
                id: record.id,
                solved: record.solved,
                user_difficulty: record.user_difficulty,
            };
            match out.iter_mut().find(|f| f.id == fragment.id) {
                Some(existing) => *existing = fragment,
                None => out.push(fragment),
            }
        }
    }
}

fn matches(request: &PageRequest, listing: &Listing) -> bool {
    if listing.view_key != request.view_key {
        return false;
    }
    let record = &listing.record;
    if request.unsolved_only && record.solved {
        return false;
    }
    if let Some(text) = &request.search_text
        && !record.title.to_lowercase().contains(&text.to_lowercase())
    {
        return false;
    }
    if let Some(tag) = &request.tag_filter
        && !record.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    {
        return false;
    }
    true
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn read_page(&self, request: &PageRequest) -> Result<PageResult> {
        let mut state = self.state.lock();
        if state.take_read_failure() {
            return Err(TrackerError::TransientFetch(
                "store unavailable".to_string(),
            ));
        }

        let mut rows: Vec<Record> = state
            .listings
            .iter()
            .filter(|l| matches(request, l))
            .map(|l| l.record.clone())
            .collect();

        if let Some((field, order)) = request.sort {
            rows.sort_by(|a, b| {
                let ordering = compare_delegated(a, b, field);
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let total_count = rows.len() as u64;
        let size = request.page_size.max(1) as usize;
        let skip = (request.page.max(1) as usize - 1) * size;
        let rows = rows.into_iter().skip(skip).take(size).collect();

        Ok(PageResult { rows, total_count })
    }

    async fn write_record(&self, id: QuestionId, patch: &RecordPatch) -> Result<Vec<Fragment>> {
        let mut state = self.state.lock();
        state.writes += 1;
        if state.take_write_failure() {
            return Err(TrackerError::WriteRejected("store unavailable".to_string()));
        }

        let link = state
            .link_of(id)
            .ok_or_else(|| TrackerError::WriteRejected(format!("question {id} not found")))?;

        let mut fragments = Vec::new();
        state.apply(&link, patch, &mut fragments);
        Ok(fragments)
    }

    async fn write_batch(
        &self,
        ids: &[QuestionId],
        patch: &RecordPatch,
    ) -> Result<Vec<Fragment>> {
        let mut state = self.state.lock();
        state.batch_writes += 1;
        if state.take_write_failure() {
            return Err(TrackerError::WriteRejected("store unavailable".to_string()));
        }

        // Resolve everything first so a bad id rejects the whole batch
        let links = ids
            .iter()
            .map(|id| {
                state
                    .link_of(*id)
                    .ok_or_else(|| TrackerError::WriteRejected(format!("question {id} not found")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut fragments = Vec::new();
        for link in links {
            state.apply(&link, patch, &mut fragments);
        }
        Ok(fragments)
    }

    async fn read_stats(&self) -> Result<ProgressStats> {
        let mut state = self.state.lock();
        if state.take_read_failure() {
            return Err(TrackerError::TransientFetch(
                "store unavailable".to_string(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut stats = ProgressStats::default();
        for listing in &state.listings {
            if !seen.insert(listing.record.link.as_str()) {
                continue;
            }
            stats.total += 1;
            if listing.record.solved {
                stats.record_solved(listing.record.remote_difficulty);
            }
        }
        Ok(stats)
    }
}
