use super::assessment::{Assessment, AssessmentResponse};
use super::domain::{Candidate, CandidateId, Job, JobId, TimelineEvent};

/// Error enumeration for record-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction over the four record kinds, so the sync engine can
/// be exercised against any key-indexed backend. Point lookups go by
/// primary id; `events_for` and `assessment_for_job` are equality queries
/// on a secondary key; the bulk inserts exist for seeding.
///
/// Implementations must be atomic per call: a method either fully applies
/// its write or returns an error having changed nothing.
pub trait RecordStore: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<(), StoreError>;
    fn put_job(&self, job: Job) -> Result<(), StoreError>;
    fn job(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
    fn jobs(&self) -> Result<Vec<Job>, StoreError>;

    fn insert_candidate(&self, candidate: Candidate) -> Result<(), StoreError>;
    fn put_candidate(&self, candidate: Candidate) -> Result<(), StoreError>;
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError>;
    fn candidates(&self) -> Result<Vec<Candidate>, StoreError>;

    /// Append an immutable timeline event. There is no update or delete
    /// counterpart; the audit trail only grows.
    fn append_event(&self, event: TimelineEvent) -> Result<(), StoreError>;
    fn events_for(&self, candidate_id: &CandidateId) -> Result<Vec<TimelineEvent>, StoreError>;

    fn insert_assessment(&self, assessment: Assessment) -> Result<(), StoreError>;
    fn put_assessment(&self, assessment: Assessment) -> Result<(), StoreError>;
    fn assessment_for_job(&self, job_id: &JobId) -> Result<Option<Assessment>, StoreError>;

    fn insert_response(&self, response: AssessmentResponse) -> Result<(), StoreError>;

    fn insert_jobs(&self, jobs: Vec<Job>) -> Result<(), StoreError> {
        for job in jobs {
            self.insert_job(job)?;
        }
        Ok(())
    }

    fn insert_candidates(&self, candidates: Vec<Candidate>) -> Result<(), StoreError> {
        for candidate in candidates {
            self.insert_candidate(candidate)?;
        }
        Ok(())
    }
}
