//! Row selection for batch actions

use std::collections::HashSet;

use crate::types::{QuestionId, Record};

/// Ids selected on the loaded page.
///
/// The set is only meaningful for the rows it was built against, so the
/// owning view clears it whenever a read replaces the rows.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: HashSet<QuestionId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: QuestionId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select exactly the given rows, dropping anything else
    pub fn select_all(&mut self, rows: &[Record]) {
        self.ids = rows.iter().map(|r| r.id).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids whose rows are no longer loaded
    pub fn retain_loaded(&mut self, rows: &[Record]) {
        self.ids.retain(|id| rows.iter().any(|r| r.id == *id));
    }

    /// True iff there are rows and every one of them is selected
    pub fn is_all_selected(&self, rows: &[Record]) -> bool {
        !rows.is_empty() && rows.iter().all(|r| self.ids.contains(&r.id))
    }

    /// Selected ids in ascending order
    pub fn snapshot(&self) -> Vec<QuestionId> {
        let mut ids: Vec<QuestionId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
