use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::assessment::{
    Assessment, AssessmentDraft, AssessmentId, AssessmentResponse, ResponseId, ResponseScorer,
    UniformScorer, validate_conditionals,
};
use super::domain::{
    slugify, Candidate, CandidateId, CandidatePatch, Job, JobDraft, JobId, JobPatch, JobStatus,
    TimelineEvent, TimelineEventId,
};
use super::fault::{FaultPolicy, WriteOp, WriteVerdict};
use super::query::{paginate, CandidateFilter, JobFilter, JobSort, Page, PageRequest};
use super::store::{RecordStore, StoreError};

/// Error raised by the synchronization engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("transient server error during {}", .0.label())]
    Transient(WriteOp),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn not_found(kind: &'static str, id: &str) -> EngineError {
    EngineError::NotFound {
        kind,
        id: id.to_string(),
    }
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static TIMELINE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RESPONSE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

fn next_timeline_id() -> TimelineEventId {
    let id = TIMELINE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TimelineEventId(format!("timeline-{id:06}"))
}

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("assessment-{id:06}"))
}

fn next_response_id() -> ResponseId {
    let id = RESPONSE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResponseId(format!("response-{id:06}"))
}

/// Translates client intents into record-store operations, derives audit
/// records, and reports success or failure per intent.
///
/// Every operation first suspends for the fault policy's latency; writes
/// then consult the policy's verdict and abort before touching the store
/// when rejected, so a failed call never partially applies. The engine
/// does not retry; retry and rollback policy belong to the caller.
pub struct SyncEngine<S> {
    store: Arc<S>,
    faults: Arc<dyn FaultPolicy>,
    scorer: Arc<dyn ResponseScorer>,
}

impl<S> SyncEngine<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>, faults: Arc<dyn FaultPolicy>) -> Self {
        Self::with_scorer(store, faults, Arc::new(UniformScorer::new()))
    }

    pub fn with_scorer(
        store: Arc<S>,
        faults: Arc<dyn FaultPolicy>,
        scorer: Arc<dyn ResponseScorer>,
    ) -> Self {
        Self {
            store,
            faults,
            scorer,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn suspend(&self) {
        let latency = self.faults.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    /// Latency plus write verdict. Rejection surfaces before any store
    /// access, which is what makes failed writes atomic.
    async fn gate(&self, op: WriteOp) -> Result<(), EngineError> {
        self.suspend().await;
        match self.faults.write_verdict(op) {
            WriteVerdict::Commit => Ok(()),
            WriteVerdict::Reject => Err(EngineError::Transient(op)),
        }
    }

    // --- Jobs ---

    pub async fn list_jobs(
        &self,
        filter: JobFilter,
        page: PageRequest,
    ) -> Result<Page<Job>, EngineError> {
        self.suspend().await;
        let mut jobs = self.store.jobs()?;
        match filter.sort {
            JobSort::Order => jobs.sort_by_key(|job| job.order),
            JobSort::Title => jobs.sort_by(|a, b| a.title.cmp(&b.title)),
        }
        jobs.retain(|job| filter.matches(job));
        Ok(paginate(jobs, page))
    }

    pub async fn create_job(&self, draft: JobDraft) -> Result<Job, EngineError> {
        self.gate(WriteOp::CreateJob).await?;

        if draft.title.trim().is_empty() {
            return Err(EngineError::Validation(
                "job title must not be empty".to_string(),
            ));
        }

        let slug = match draft.slug.filter(|slug| !slug.trim().is_empty()) {
            Some(slug) => slug,
            None => slugify(&draft.title),
        };
        let order = self.store.jobs()?.len();
        let now = Utc::now();
        let job = Job {
            id: next_job_id(),
            title: draft.title,
            slug,
            status: draft.status.unwrap_or(JobStatus::Active),
            tags: draft.tags,
            order,
            description: draft.description,
            requirements: draft.requirements,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_job(job.clone())?;
        info!(job = %job.id.0, order, "job created");
        Ok(job)
    }

    pub async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<Job, EngineError> {
        self.gate(WriteOp::UpdateJob).await?;

        let mut job = self.store.job(id)?.ok_or_else(|| not_found("job", &id.0))?;

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(EngineError::Validation(
                    "job title must not be empty".to_string(),
                ));
            }
            job.title = title;
        }
        if let Some(slug) = patch.slug {
            job.slug = slug;
        }
        if let Some(status) = patch.status {
            job.status = status;
        }
        if let Some(tags) = patch.tags {
            job.tags = tags;
        }
        if let Some(description) = patch.description {
            job.description = Some(description);
        }
        if let Some(requirements) = patch.requirements {
            job.requirements = requirements;
        }
        job.updated_at = Utc::now();

        self.store.put_job(job.clone())?;
        Ok(job)
    }

    /// Move one job from `from_order` to `to_order`, shifting every job
    /// strictly between toward the vacated slot so the set of orders stays
    /// exactly {0..N-1}.
    ///
    /// This reads the full job list and recomputes shifts per call with no
    /// compare-and-swap guard: callers are a single logical actor per
    /// client session, and the dense-order invariant is not protected
    /// against concurrent cross-client writers.
    pub async fn reorder_job(
        &self,
        id: &JobId,
        from_order: usize,
        to_order: usize,
    ) -> Result<(), EngineError> {
        // Elevated failure rate lives behind this gate; nothing below it
        // runs for a rejected call, so the stored orders stay untouched.
        self.gate(WriteOp::ReorderJob).await?;

        let jobs = self.store.jobs()?;
        let count = jobs.len();
        if from_order >= count || to_order >= count {
            return Err(EngineError::Validation(format!(
                "order out of range: {from_order} -> {to_order} with {count} jobs"
            )));
        }

        let moving = jobs
            .iter()
            .find(|job| job.id == *id)
            .ok_or_else(|| not_found("job", &id.0))?;
        if moving.order != from_order {
            return Err(EngineError::Validation(format!(
                "job '{}' is at order {}, not {from_order}",
                id.0, moving.order
            )));
        }
        if from_order == to_order {
            return Ok(());
        }

        let now = Utc::now();
        for mut job in jobs {
            if job.id == *id {
                job.order = to_order;
                job.updated_at = now;
                self.store.put_job(job)?;
            } else if from_order < to_order && job.order > from_order && job.order <= to_order {
                job.order -= 1;
                self.store.put_job(job)?;
            } else if from_order > to_order && job.order >= to_order && job.order < from_order {
                job.order += 1;
                self.store.put_job(job)?;
            }
        }

        info!(job = %id.0, from_order, to_order, "job reordered");
        Ok(())
    }

    // --- Candidates ---

    pub async fn list_candidates(
        &self,
        filter: CandidateFilter,
        page: PageRequest,
    ) -> Result<Page<Candidate>, EngineError> {
        self.suspend().await;
        let mut candidates = self.store.candidates()?;
        candidates.retain(|candidate| filter.matches(candidate));
        Ok(paginate(candidates, page))
    }

    pub async fn candidate(&self, id: &CandidateId) -> Result<Candidate, EngineError> {
        self.suspend().await;
        self.store
            .candidate(id)?
            .ok_or_else(|| not_found("candidate", &id.0))
    }

    /// Merge a candidate patch. A stage value differing from the stored
    /// stage synthesizes the timeline event and persists it before the
    /// candidate record, so the audit trail never lags a realized
    /// transition.
    pub async fn update_candidate(
        &self,
        id: &CandidateId,
        patch: CandidatePatch,
    ) -> Result<Candidate, EngineError> {
        self.gate(WriteOp::UpdateCandidate).await?;

        let mut candidate = self
            .store
            .candidate(id)?
            .ok_or_else(|| not_found("candidate", &id.0))?;

        let stage_change = patch.stage.filter(|stage| *stage != candidate.stage);
        if let Some(to_stage) = stage_change {
            let event = TimelineEvent {
                id: next_timeline_id(),
                candidate_id: id.clone(),
                event: format!(
                    "Moved from {} to {}",
                    candidate.stage.label(),
                    to_stage.label()
                ),
                from_stage: Some(candidate.stage),
                to_stage: Some(to_stage),
                timestamp: Utc::now(),
                notes: Some("Stage updated via kanban board".to_string()),
            };
            self.store.append_event(event)?;
            info!(
                candidate = %id.0,
                from = candidate.stage.label(),
                to = to_stage.label(),
                "stage transition recorded"
            );
        }

        if let Some(name) = patch.name {
            candidate.name = name;
        }
        if let Some(email) = patch.email {
            candidate.email = email;
        }
        if let Some(stage) = patch.stage {
            candidate.stage = stage;
        }
        if let Some(job_id) = patch.job_id {
            candidate.job_id = job_id;
        }
        if let Some(notes) = patch.notes {
            candidate.notes = notes;
        }
        if let Some(resume) = patch.resume {
            candidate.resume = Some(resume);
        }
        if let Some(phone) = patch.phone {
            candidate.phone = Some(phone);
        }

        self.store.put_candidate(candidate.clone())?;
        Ok(candidate)
    }

    pub async fn timeline(&self, id: &CandidateId) -> Result<Vec<TimelineEvent>, EngineError> {
        self.suspend().await;
        let mut events = self.store.events_for(id)?;
        events.sort_by_key(|event| event.timestamp);
        Ok(events)
    }

    // --- Assessments ---

    pub async fn assessment(&self, job_id: &JobId) -> Result<Option<Assessment>, EngineError> {
        self.suspend().await;
        Ok(self.store.assessment_for_job(job_id)?)
    }

    pub async fn upsert_assessment(
        &self,
        job_id: &JobId,
        draft: AssessmentDraft,
    ) -> Result<Assessment, EngineError> {
        self.gate(WriteOp::UpsertAssessment).await?;

        validate_conditionals(&draft.sections)
            .map_err(|violation| EngineError::Validation(violation.to_string()))?;

        let now = Utc::now();
        match self.store.assessment_for_job(job_id)? {
            Some(mut assessment) => {
                assessment.title = draft.title;
                assessment.description = draft.description;
                assessment.sections = draft.sections;
                assessment.updated_at = now;
                self.store.put_assessment(assessment.clone())?;
                Ok(assessment)
            }
            None => {
                let assessment = Assessment {
                    id: next_assessment_id(),
                    job_id: job_id.clone(),
                    title: draft.title,
                    description: draft.description,
                    sections: draft.sections,
                    created_at: now,
                    updated_at: now,
                };
                self.store.insert_assessment(assessment.clone())?;
                Ok(assessment)
            }
        }
    }

    pub async fn submit_response(
        &self,
        job_id: &JobId,
        candidate_id: CandidateId,
        responses: BTreeMap<String, Value>,
    ) -> Result<AssessmentResponse, EngineError> {
        self.gate(WriteOp::SubmitResponse).await?;

        let assessment = self
            .store
            .assessment_for_job(job_id)?
            .ok_or_else(|| not_found("assessment", &job_id.0))?;

        let score = self.scorer.score(&assessment, &responses);
        let response = AssessmentResponse {
            id: next_response_id(),
            assessment_id: assessment.id.clone(),
            candidate_id,
            responses,
            submitted_at: Utc::now(),
            score,
        };

        self.store.insert_response(response.clone())?;
        Ok(response)
    }
}
