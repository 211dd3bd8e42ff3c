use serde::{Deserialize, Serialize};

use super::domain::{Candidate, Job, JobStatus, Stage};

/// Sort key for job listings. Jobs default to their display rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSort {
    #[default]
    Order,
    Title,
}

/// Filter applied to the job listing before pagination.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub search: Option<String>,
    pub status: Option<JobStatus>,
    pub sort: JobSort,
}

impl JobFilter {
    /// Case-insensitive substring match over title and tags, plus status
    /// equality. An empty filter matches everything.
    pub fn matches(&self, job: &Job) -> bool {
        let matches_search = match self.search.as_deref() {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                job.title.to_lowercase().contains(&needle)
                    || job.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
            }
        };
        let matches_status = self.status.map_or(true, |status| job.status == status);
        matches_search && matches_status
    }
}

/// Filter applied to the candidate listing before pagination.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub search: Option<String>,
    pub stage: Option<Stage>,
}

impl CandidateFilter {
    /// Case-insensitive substring match over name and email, plus stage
    /// equality.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        let matches_search = match self.search.as_deref() {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                candidate.name.to_lowercase().contains(&needle)
                    || candidate.email.to_lowercase().contains(&needle)
            }
        };
        let matches_stage = self.stage.map_or(true, |stage| candidate.stage == stage);
        matches_search && matches_stage
    }
}

/// Offset-based page request. Pages are 1-indexed; zero values are
/// clamped so arithmetic stays well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

/// Pagination metadata returned alongside every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Slice a filtered set into the requested page. `total_pages` is
/// `ceil(total / page_size)`; a page past the end yields empty data with
/// the same metadata.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let total_pages = total.div_ceil(request.page_size);
    let start = (request.page - 1).saturating_mul(request.page_size);

    let data = if start >= total {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start)
            .take(request.page_size)
            .collect()
    };

    Page {
        data,
        pagination: Pagination {
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages,
        },
    }
}
