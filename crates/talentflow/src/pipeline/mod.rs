//! Hiring-pipeline synchronization: the record model, the fault-injecting
//! transport policy, the engine translating client intents into store
//! operations with derived audit records, and the optimistic client
//! reconciliation layer that rolls back rejected intents.

pub mod assessment;
pub mod domain;
pub mod engine;
pub mod fault;
pub mod query;
pub mod reconcile;
pub mod router;
pub mod store;

pub use assessment::{
    Assessment, AssessmentDraft, AssessmentId, AssessmentQuestion, AssessmentResponse,
    AssessmentSection, ConditionalRule, FixedScorer, QuestionKind, QuestionValidation,
    ResponseId, ResponseScorer, UniformScorer,
};
pub use domain::{
    slugify, Candidate, CandidateId, CandidateNote, CandidatePatch, Job, JobDraft, JobId,
    JobPatch, JobStatus, Stage, TimelineEvent, TimelineEventId,
};
pub use engine::{EngineError, SyncEngine};
pub use fault::{
    FaultPolicy, NoFaults, RandomFaultPolicy, ScriptedFaultPolicy, WriteOp, WriteVerdict,
};
pub use query::{CandidateFilter, JobFilter, JobSort, Page, PageRequest, Pagination};
pub use reconcile::{CandidateBoard, JobBoard, ReconcileError};
pub use router::pipeline_router;
pub use store::{RecordStore, StoreError};
