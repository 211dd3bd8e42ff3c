use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::assessment::AssessmentDraft;
use super::domain::{CandidateId, CandidatePatch, JobDraft, JobId, JobPatch, JobStatus, Stage};
use super::engine::{EngineError, SyncEngine};
use super::query::{CandidateFilter, JobFilter, JobSort, PageRequest};
use super::store::RecordStore;

const DEFAULT_JOB_PAGE_SIZE: usize = 10;
const DEFAULT_CANDIDATE_PAGE_SIZE: usize = 50;

/// Router builder exposing the synchronization engine over HTTP. All
/// error bodies are `{"error": string}`; write endpoints surface the
/// fault policy's rejections as 500s.
pub fn pipeline_router<S>(engine: Arc<SyncEngine<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/jobs", get(list_jobs::<S>).post(create_job::<S>))
        .route("/jobs/:id", patch(update_job::<S>))
        .route("/jobs/:id/reorder", patch(reorder_job::<S>))
        .route("/candidates", get(list_candidates::<S>))
        .route(
            "/candidates/:id",
            get(get_candidate::<S>).patch(update_candidate::<S>),
        )
        .route("/candidates/:id/timeline", get(candidate_timeline::<S>))
        .route(
            "/assessments/:job_id",
            get(get_assessment::<S>).put(upsert_assessment::<S>),
        )
        .route("/assessments/:job_id/submit", post(submit_assessment::<S>))
        .with_state(engine)
}

fn error_response(err: &EngineError) -> Response {
    let status = match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::Transient(_) | EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobListParams {
    search: Option<String>,
    status: Option<JobStatus>,
    page: Option<usize>,
    page_size: Option<usize>,
    sort: Option<JobSort>,
}

async fn list_jobs<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Query(params): Query<JobListParams>,
) -> Response
where
    S: RecordStore + 'static,
{
    let filter = JobFilter {
        search: params.search,
        status: params.status,
        sort: params.sort.unwrap_or_default(),
    };
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_JOB_PAGE_SIZE),
    );

    match engine.list_jobs(filter, page).await {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn create_job<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.create_job(draft).await {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn update_job<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.update_job(&JobId(id), patch).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReorderRequest {
    from_order: usize,
    to_order: usize,
}

async fn reorder_job<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine
        .reorder_job(&JobId(id), request.from_order, request.to_order)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CandidateListParams {
    search: Option<String>,
    stage: Option<Stage>,
    page: Option<usize>,
    page_size: Option<usize>,
}

async fn list_candidates<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Query(params): Query<CandidateListParams>,
) -> Response
where
    S: RecordStore + 'static,
{
    let filter = CandidateFilter {
        search: params.search,
        stage: params.stage,
    };
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_CANDIDATE_PAGE_SIZE),
    );

    match engine.list_candidates(filter, page).await {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn get_candidate<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.candidate(&CandidateId(id)).await {
        Ok(candidate) => (StatusCode::OK, Json(candidate)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn update_candidate<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(id): Path<String>,
    Json(patch): Json<CandidatePatch>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.update_candidate(&CandidateId(id), patch).await {
        Ok(candidate) => (StatusCode::OK, Json(candidate)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn candidate_timeline<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.timeline(&CandidateId(id)).await {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn get_assessment<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.assessment(&JobId(job_id)).await {
        Ok(Some(assessment)) => (StatusCode::OK, Json(assessment)).into_response(),
        Ok(None) => (StatusCode::OK, Json(Value::Null)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn upsert_assessment<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(job_id): Path<String>,
    Json(draft): Json<AssessmentDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.upsert_assessment(&JobId(job_id), draft).await {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitRequest {
    candidate_id: CandidateId,
    responses: BTreeMap<String, Value>,
}

async fn submit_assessment<S>(
    State(engine): State<Arc<SyncEngine<S>>>,
    Path(job_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine
        .submit_response(&JobId(job_id), request.candidate_id, request.responses)
        .await
    {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => error_response(&err),
    }
}
