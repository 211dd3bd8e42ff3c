use chrono::{Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use talentflow::error::AppError;
use talentflow::pipeline::{
    Assessment, AssessmentId, AssessmentResponse, Candidate, CandidateId, Job, JobDraft, JobId,
    NoFaults, RecordStore, Stage, StoreError, SyncEngine, TimelineEvent,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The record store realized in memory: mutex-guarded maps keyed by
/// primary id, append-only vectors for the audit trail and submissions.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStore {
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
    candidates: Arc<Mutex<HashMap<CandidateId, Candidate>>>,
    events: Arc<Mutex<Vec<TimelineEvent>>>,
    assessments: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
    responses: Arc<Mutex<Vec<AssessmentResponse>>>,
}

impl RecordStore for InMemoryStore {
    fn insert_job(&self, job: Job) -> Result<(), StoreError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        if guard.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(job.id.clone(), job);
        Ok(())
    }

    fn put_job(&self, job: Job) -> Result<(), StoreError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        if !guard.contains_key(&job.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(job.id.clone(), job);
        Ok(())
    }

    fn job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let guard = self.jobs.lock().expect("job mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        let guard = self.jobs.lock().expect("job mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn insert_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let mut guard = self.candidates.lock().expect("candidate mutex poisoned");
        if guard.contains_key(&candidate.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    fn put_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let mut guard = self.candidates.lock().expect("candidate mutex poisoned");
        if !guard.contains_key(&candidate.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError> {
        let guard = self.candidates.lock().expect("candidate mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let guard = self.candidates.lock().expect("candidate mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn append_event(&self, event: TimelineEvent) -> Result<(), StoreError> {
        let mut guard = self.events.lock().expect("event mutex poisoned");
        guard.push(event);
        Ok(())
    }

    fn events_for(&self, candidate_id: &CandidateId) -> Result<Vec<TimelineEvent>, StoreError> {
        let guard = self.events.lock().expect("event mutex poisoned");
        Ok(guard
            .iter()
            .filter(|event| event.candidate_id == *candidate_id)
            .cloned()
            .collect())
    }

    fn insert_assessment(&self, assessment: Assessment) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        if guard.contains_key(&assessment.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn put_assessment(&self, assessment: Assessment) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        if !guard.contains_key(&assessment.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn assessment_for_job(&self, job_id: &JobId) -> Result<Option<Assessment>, StoreError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard
            .values()
            .find(|assessment| assessment.job_id == *job_id)
            .cloned())
    }

    fn insert_response(&self, response: AssessmentResponse) -> Result<(), StoreError> {
        let mut guard = self.responses.lock().expect("response mutex poisoned");
        guard.push(response);
        Ok(())
    }
}

const SAMPLE_JOBS: [(&str, &[&str]); 5] = [
    ("Senior Frontend Developer", &["React", "TypeScript", "Remote"]),
    ("Backend Engineer", &["Rust", "Postgres"]),
    ("Product Manager", &["Leadership", "Fulltime"]),
    ("QA Engineer", &["Testing", "Contract"]),
    ("Data Scientist", &["Python", "Analytics"]),
];

const SAMPLE_CANDIDATES: [(&str, &str, Stage); 6] = [
    ("Alice Johnson", "alice.johnson@email.com", Stage::Applied),
    ("Bob Martinez", "bob.martinez@email.com", Stage::Screen),
    ("Charlie Nguyen", "charlie.nguyen@email.com", Stage::Tech),
    ("Diana Okafor", "diana.okafor@email.com", Stage::Offer),
    ("Emma Larsson", "emma.larsson@email.com", Stage::Hired),
    ("Frank Castillo", "frank.castillo@email.com", Stage::Applied),
];

/// Seed a small deterministic fixture through a quiet engine, so the
/// ids and dense job orders come out of the same code paths production
/// writes use.
pub(crate) async fn seed_sample_data(store: Arc<InMemoryStore>) -> Result<(), AppError> {
    let engine = SyncEngine::new(store.clone(), Arc::new(NoFaults));

    let mut job_ids = Vec::new();
    for (title, tags) in SAMPLE_JOBS {
        let job = engine
            .create_job(JobDraft {
                title: title.to_string(),
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
                description: Some(format!(
                    "We are looking for an experienced {} to join our growing team.",
                    title.to_lowercase()
                )),
                ..JobDraft::default()
            })
            .await?;
        job_ids.push(job.id);
    }

    let now = Utc::now();
    let candidates = SAMPLE_CANDIDATES
        .iter()
        .enumerate()
        .map(|(index, (name, email, stage))| Candidate {
            id: CandidateId(format!("candidate-{:04}", index + 1)),
            name: name.to_string(),
            email: email.to_string(),
            stage: *stage,
            job_id: job_ids[index % job_ids.len()].clone(),
            applied_at: now - Duration::days(index as i64 + 1),
            notes: Vec::new(),
            resume: None,
            phone: Some(format!("+1-555-010-{:04}", index + 1)),
        })
        .collect();
    store
        .insert_candidates(candidates)
        .map_err(talentflow::pipeline::EngineError::from)?;

    Ok(())
}
