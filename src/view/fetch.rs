//! Read bookkeeping for one view.
//!
//! Reads are never cancelled. Instead each one carries a [`FetchTicket`]
//! naming the query it was built from and a sequence number. When a read
//! settles, its result is applied only if the ticket's query is still the
//! current query and nothing newer for that query has been applied yet.
//! Anything else is stale and dropped.

use std::collections::HashSet;

use crate::error::TrackerError;
use crate::query::{PageQuery, sort_locally};
use crate::remote::PageResult;
use crate::types::{Fragment, Record};

use super::reconcile::{reconcile, retain_unsolved};

/// Identity of one issued read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub query: PageQuery,
    pub seq: u64,
}

/// What happened to a settled read
#[derive(Debug)]
pub enum FetchOutcome {
    /// Rows and page count were replaced
    Applied,
    /// Superseded by a newer query or a newer read; nothing changed
    Stale,
    /// The read failed while it was current; rows were cleared
    Failed(TrackerError),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied)
    }
}

impl From<tokio::task::JoinError> for FetchOutcome {
    fn from(err: tokio::task::JoinError) -> Self {
        FetchOutcome::Failed(TrackerError::Task(err.to_string()))
    }
}

#[derive(Debug)]
pub struct FetchCoordinator {
    query: PageQuery,
    rows: Vec<Record>,
    /// None until a read succeeds
    total_pages: Option<u32>,
    next_seq: u64,
    /// Reads issued for the current query that have not settled
    in_flight: HashSet<u64>,
    /// Newest read applied for the current query
    applied_seq: Option<u64>,
}

impl FetchCoordinator {
    pub fn new(query: PageQuery) -> Self {
        Self {
            query,
            rows: Vec::new(),
            total_pages: None,
            next_seq: 0,
            in_flight: HashSet::new(),
            applied_seq: None,
        }
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Last known page count, 1 before any read has succeeded
    pub fn total_pages(&self) -> u32 {
        self.total_pages.unwrap_or(1)
    }

    /// True while a read for the current query is outstanding
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Make `query` current and hand out a ticket for reading it.
    ///
    /// Reads outstanding for a previous query stop counting towards the
    /// loading flag. Rows stay in place until the new read settles.
    pub fn begin(&mut self, query: PageQuery) -> FetchTicket {
        if query != self.query {
            self.query = query;
            self.in_flight.clear();
            self.applied_seq = None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert(seq);
        tracing::debug!(seq, query = ?self.query, "read issued");

        FetchTicket {
            query: self.query.clone(),
            seq,
        }
    }

    /// Record the result of a read
    pub fn settle(
        &mut self,
        ticket: &FetchTicket,
        result: crate::error::Result<PageResult>,
    ) -> FetchOutcome {
        if ticket.query != self.query {
            tracing::debug!(seq = ticket.seq, "discarding read for superseded query");
            return FetchOutcome::Stale;
        }
        // Only reads begun for the current query are in the set
        self.in_flight.remove(&ticket.seq);

        if self.applied_seq.is_some_and(|applied| applied > ticket.seq) {
            tracing::debug!(
                seq = ticket.seq,
                applied = ?self.applied_seq,
                "discarding read older than applied result"
            );
            return FetchOutcome::Stale;
        }
        self.applied_seq = Some(ticket.seq);

        match result {
            Ok(page) => {
                let mut rows = page.rows;
                if self.query.unsolved_only {
                    retain_unsolved(&mut rows);
                }
                if let Some(field) = self.query.sort {
                    sort_locally(&mut rows, field, self.query.order);
                }
                self.rows = rows;
                self.total_pages = Some(self.query.total_pages(page.total_count));
                FetchOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(seq = ticket.seq, error = %err, "read failed");
                self.rows.clear();
                FetchOutcome::Failed(err)
            }
        }
    }

    /// Merge write results into the loaded rows. Returns the matched count.
    pub fn apply_fragments(&mut self, fragments: &[Fragment]) -> usize {
        let matched = reconcile(&mut self.rows, fragments);
        if self.query.unsolved_only {
            retain_unsolved(&mut self.rows);
        }
        matched
    }
}
