//! Candidate dashboard: search, sort and pagination over stored candidates.
//!
//! Everything here is derived from a copy of the stored list; nothing is
//! written back.

pub mod detail;
pub mod handlers;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::candidate::{CandidateEntry, CandidateStatus};

pub const PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Email,
    FinalScore,
}

impl SortKey {
    /// Direction used when this key is first selected.
    fn default_dir(self) -> SortDir {
        match self {
            SortKey::FinalScore => SortDir::Desc,
            SortKey::Name | SortKey::Email => SortDir::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn flipped(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// Dashboard controls. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub search: String,
    pub sort: SortKey,
    pub dir: SortDir,
    pub page: usize,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::FinalScore,
            dir: SortDir::Desc,
            page: 1,
        }
    }
}

impl DashboardQuery {
    pub fn set_search(&mut self, search: &str) {
        let search = search.trim();
        if search != self.search {
            self.search = search.to_string();
            self.page = 1;
        }
    }

    /// Selecting the active key flips its direction; a new key starts at its
    /// default direction. Either way the listing returns to page 1.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.dir = if key == self.sort {
            self.dir.flipped()
        } else {
            key.default_dir()
        };
        self.sort = key;
        self.page = 1;
    }

    pub fn set_sort(&mut self, key: SortKey, dir: SortDir) {
        if (key, dir) != (self.sort, self.dir) {
            self.sort = key;
            self.dir = dir;
            self.page = 1;
        }
    }

    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}

/// One line of the candidate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub final_score: u32,
    pub status: CandidateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&CandidateEntry> for CandidateRow {
    fn from(c: &CandidateEntry) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            email: c.email.clone(),
            final_score: c.final_score,
            status: c.status,
            completed_at: c.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPage {
    pub query: DashboardQuery,
    pub items: Vec<CandidateRow>,
    /// Matches after filtering, across all pages.
    pub total: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Case-insensitive substring match on name or email. A blank search keeps
/// everything.
pub fn filter_candidates<'a>(candidates: &'a [CandidateEntry], search: &str) -> Vec<&'a CandidateEntry> {
    let needle = search.trim().to_lowercase();
    candidates
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.email.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Total order: the sort key first, then name, email and id. Reversing the
/// direction yields exactly the reverse sequence.
pub fn sort_candidates(candidates: &mut [&CandidateEntry], key: SortKey, dir: SortDir) {
    candidates.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &CandidateEntry, b: &CandidateEntry, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        SortKey::FinalScore => a.final_score.cmp(&b.final_score),
    };
    primary
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.email.to_lowercase().cmp(&b.email.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.email.cmp(&b.email))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Filters, sorts and slices one page. The requested page is clamped into
/// range and the clamped value is reported back in `query`.
pub fn build_page(candidates: &[CandidateEntry], query: &DashboardQuery) -> DashboardPage {
    let mut matches = filter_candidates(candidates, &query.search);
    sort_candidates(&mut matches, query.sort, query.dir);

    let total = matches.len();
    let total_pages = total_pages(total);
    let page = query.page.clamp(1, total_pages);

    let items = matches
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .map(CandidateRow::from)
        .collect();

    DashboardPage {
        query: DashboardQuery {
            page,
            ..query.clone()
        },
        items,
        total,
        total_pages,
        has_previous: page > 1,
        has_next: page < total_pages,
    }
}
