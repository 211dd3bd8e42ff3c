//! Shared fixtures for the integration suites: an in-memory record store
//! and seed helpers that go through the engine's own write paths.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use talentflow::pipeline::{
    Assessment, AssessmentId, AssessmentResponse, Candidate, CandidateId, FaultPolicy, Job,
    JobDraft, JobId, NoFaults, RecordStore, Stage, StoreError, SyncEngine, TimelineEvent,
};

#[derive(Default, Clone)]
pub struct MemoryStore {
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
    candidates: Arc<Mutex<HashMap<CandidateId, Candidate>>>,
    events: Arc<Mutex<Vec<TimelineEvent>>>,
    assessments: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
    responses: Arc<Mutex<Vec<AssessmentResponse>>>,
}

impl MemoryStore {
    pub fn responses(&self) -> Vec<AssessmentResponse> {
        self.responses.lock().expect("lock").clone()
    }

    pub fn events(&self) -> Vec<TimelineEvent> {
        self.events.lock().expect("lock").clone()
    }
}

impl RecordStore for MemoryStore {
    fn insert_job(&self, job: Job) -> Result<(), StoreError> {
        let mut guard = self.jobs.lock().expect("lock");
        if guard.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(job.id.clone(), job);
        Ok(())
    }

    fn put_job(&self, job: Job) -> Result<(), StoreError> {
        let mut guard = self.jobs.lock().expect("lock");
        if !guard.contains_key(&job.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(job.id.clone(), job);
        Ok(())
    }

    fn job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.lock().expect("lock").get(id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.jobs.lock().expect("lock").values().cloned().collect())
    }

    fn insert_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let mut guard = self.candidates.lock().expect("lock");
        if guard.contains_key(&candidate.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    fn put_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let mut guard = self.candidates.lock().expect("lock");
        if !guard.contains_key(&candidate.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError> {
        Ok(self.candidates.lock().expect("lock").get(id).cloned())
    }

    fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self
            .candidates
            .lock()
            .expect("lock")
            .values()
            .cloned()
            .collect())
    }

    fn append_event(&self, event: TimelineEvent) -> Result<(), StoreError> {
        self.events.lock().expect("lock").push(event);
        Ok(())
    }

    fn events_for(&self, candidate_id: &CandidateId) -> Result<Vec<TimelineEvent>, StoreError> {
        Ok(self
            .events
            .lock()
            .expect("lock")
            .iter()
            .filter(|event| event.candidate_id == *candidate_id)
            .cloned()
            .collect())
    }

    fn insert_assessment(&self, assessment: Assessment) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("lock");
        if guard.contains_key(&assessment.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn put_assessment(&self, assessment: Assessment) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("lock");
        if !guard.contains_key(&assessment.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn assessment_for_job(&self, job_id: &JobId) -> Result<Option<Assessment>, StoreError> {
        Ok(self
            .assessments
            .lock()
            .expect("lock")
            .values()
            .find(|assessment| assessment.job_id == *job_id)
            .cloned())
    }

    fn insert_response(&self, response: AssessmentResponse) -> Result<(), StoreError> {
        self.responses.lock().expect("lock").push(response);
        Ok(())
    }
}

pub fn engine() -> (SyncEngine<MemoryStore>, Arc<MemoryStore>) {
    engine_with(Arc::new(NoFaults))
}

pub fn engine_with(policy: Arc<dyn FaultPolicy>) -> (SyncEngine<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    (SyncEngine::new(store.clone(), policy), store)
}

/// A second engine over an existing store, e.g. one with a rejecting
/// policy after seeding through a quiet one.
pub fn engine_over(
    store: Arc<MemoryStore>,
    policy: Arc<dyn FaultPolicy>,
) -> SyncEngine<MemoryStore> {
    SyncEngine::new(store, policy)
}

const TITLES: [&str; 6] = [
    "Senior Frontend Developer",
    "Backend Engineer",
    "Product Manager",
    "QA Engineer",
    "Data Scientist",
    "DevOps Engineer",
];

/// Create `count` jobs through the engine; orders come out 0..count.
pub async fn seed_jobs(engine: &SyncEngine<MemoryStore>, count: usize) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(count);
    for index in 0..count {
        let title = format!("{} {}", TITLES[index % TITLES.len()], index + 1);
        let job = engine
            .create_job(JobDraft {
                title,
                tags: vec!["Fulltime".to_string()],
                ..JobDraft::default()
            })
            .await
            .expect("seed job");
        jobs.push(job);
    }
    jobs
}

/// Insert a candidate directly; candidates have no create intent in the
/// engine's surface.
pub fn seed_candidate(store: &MemoryStore, id: &str, stage: Stage, job_id: &JobId) -> Candidate {
    let candidate = Candidate {
        id: CandidateId(id.to_string()),
        name: "Alice Johnson".to_string(),
        email: "alice.johnson@email.com".to_string(),
        stage,
        job_id: job_id.clone(),
        applied_at: Utc::now() - Duration::days(3),
        notes: Vec::new(),
        resume: None,
        phone: Some("+1-555-010-0001".to_string()),
    };
    store
        .insert_candidate(candidate.clone())
        .expect("seed candidate");
    candidate
}
