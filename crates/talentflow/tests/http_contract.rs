//! HTTP contract tests driven through the router with `tower::oneshot`:
//! status codes, body shapes, and the `{error}` envelope, including the
//! elevated-failure reorder path.

mod support;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use crate::support::{engine, engine_over, seed_candidate, seed_jobs, MemoryStore};
use talentflow::pipeline::{
    pipeline_router, FixedScorer, NoFaults, RecordStore, ScriptedFaultPolicy, Stage, SyncEngine,
    WriteVerdict,
};
use tower::ServiceExt;

fn router_over(engine: SyncEngine<MemoryStore>) -> axum::Router {
    pipeline_router(Arc::new(engine))
}

async fn dispatch(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router dispatch");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, payload)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn with_json(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize")))
        .expect("request")
}

#[tokio::test]
async fn listing_jobs_pages_with_camel_case_metadata() {
    let (engine, _) = engine();
    seed_jobs(&engine, 3).await;
    let router = router_over(engine);

    let (status, payload) = dispatch(&router, get("/jobs?page=2&pageSize=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(payload["pagination"]["page"], json!(2));
    assert_eq!(payload["pagination"]["pageSize"], json!(2));
    assert_eq!(payload["pagination"]["total"], json!(3));
    assert_eq!(payload["pagination"]["totalPages"], json!(2));
}

#[tokio::test]
async fn creating_a_job_returns_201_with_a_derived_slug() {
    let (engine, _) = engine();
    let router = router_over(engine);

    let (status, payload) = dispatch(
        &router,
        with_json(
            "POST",
            "/jobs",
            &json!({ "title": "Staff Engineer", "tags": ["Remote"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payload["slug"], json!("staff-engineer"));
    assert_eq!(payload["status"], json!("active"));
    assert_eq!(payload["order"], json!(0));
    assert!(payload["id"]
        .as_str()
        .map(|id| id.starts_with("job-"))
        .unwrap_or(false));
}

#[tokio::test]
async fn blank_titles_are_rejected_before_any_write() {
    let (engine, store) = engine();
    let router = router_over(engine);

    let (status, payload) = dispatch(
        &router,
        with_json("POST", "/jobs", &json!({ "title": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"].is_string());
    assert!(store.jobs().expect("store read").is_empty());
}

#[tokio::test]
async fn patching_a_job_toggles_status() {
    let (engine, _) = engine();
    let jobs = seed_jobs(&engine, 1).await;
    let router = router_over(engine);

    let (status, payload) = dispatch(
        &router,
        with_json(
            "PATCH",
            &format!("/jobs/{}", jobs[0].id.0),
            &json!({ "status": "archived" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], json!("archived"));

    let (status, payload) = dispatch(
        &router,
        with_json("PATCH", "/jobs/job-missing", &json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(payload["error"].is_string());
}

#[tokio::test]
async fn reorder_reports_success_and_transient_failure() {
    let (quiet, store) = engine();
    let jobs = seed_jobs(&quiet, 3).await;
    let router = router_over(quiet);

    let (status, payload) = dispatch(
        &router,
        with_json(
            "PATCH",
            &format!("/jobs/{}/reorder", jobs[0].id.0),
            &json!({ "fromOrder": 0, "toOrder": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "success": true }));

    let flaky = engine_over(
        store.clone(),
        Arc::new(ScriptedFaultPolicy::new([WriteVerdict::Reject])),
    );
    let flaky_router = router_over(flaky);
    let (status, payload) = dispatch(
        &flaky_router,
        with_json(
            "PATCH",
            &format!("/jobs/{}/reorder", jobs[0].id.0),
            &json!({ "fromOrder": 2, "toOrder": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(payload["error"].is_string());

    let moved = store
        .job(&jobs[0].id)
        .expect("store read")
        .expect("job present");
    assert_eq!(moved.order, 2, "failed reorder must not shift anything");
}

#[tokio::test]
async fn candidate_endpoints_cover_fetch_update_and_timeline() {
    let (engine, store) = engine();
    let jobs = seed_jobs(&engine, 1).await;
    let candidate = seed_candidate(&store, "candidate-0001", Stage::Applied, &jobs[0].id);
    let router = router_over(engine);

    let (status, payload) = dispatch(&router, get("/candidates/candidate-missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(payload["error"].is_string());

    let (status, payload) = dispatch(
        &router,
        with_json(
            "PATCH",
            &format!("/candidates/{}", candidate.id.0),
            &json!({ "stage": "screen" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["stage"], json!("screen"));
    assert_eq!(payload["appliedAt"], json!(candidate.applied_at));

    let (status, payload) = dispatch(
        &router,
        get(&format!("/candidates/{}/timeline", candidate.id.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let events = payload.as_array().expect("timeline array");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["fromStage"], json!("applied"));
    assert_eq!(events[0]["toStage"], json!("screen"));

    let (status, payload) = dispatch(&router, get("/candidates?stage=screen")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["pagination"]["total"], json!(1));
}

#[tokio::test]
async fn assessment_endpoints_cover_upsert_validation_and_submission() {
    let (quiet, store) = engine();
    let jobs = seed_jobs(&quiet, 1).await;
    let candidate = seed_candidate(&store, "candidate-0001", Stage::Applied, &jobs[0].id);

    let scoring = SyncEngine::with_scorer(store.clone(), Arc::new(NoFaults), Arc::new(FixedScorer(87)));
    let router = router_over(scoring);
    let base = format!("/assessments/{}", jobs[0].id.0);

    let (status, payload) = dispatch(&router, get(&base)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(payload.is_null());

    let draft = json!({
        "title": "Screening questionnaire",
        "description": "Baseline screen",
        "sections": [{
            "id": "s-1",
            "title": "Basics",
            "order": 0,
            "questions": [{
                "id": "q1",
                "type": "short-text",
                "question": "Why this role?",
                "required": true,
                "order": 0
            }]
        }]
    });
    let (status, payload) = dispatch(&router, with_json("PUT", &base, &draft)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["jobId"].as_str(), Some(jobs[0].id.0.as_str()));
    assert_eq!(payload["sections"][0]["questions"][0]["type"], json!("short-text"));

    let broken = json!({
        "title": "Broken",
        "sections": [{
            "id": "s-1",
            "title": "Basics",
            "order": 0,
            "questions": [{
                "id": "q1",
                "type": "short-text",
                "question": "Why?",
                "required": false,
                "order": 0,
                "conditionalLogic": { "dependsOn": "q-missing", "showWhen": "yes" }
            }]
        }]
    });
    let (status, payload) = dispatch(&router, with_json("PUT", &base, &broken)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"].is_string());

    let (status, payload) = dispatch(
        &router,
        with_json(
            "POST",
            &format!("{base}/submit"),
            &json!({ "candidateId": candidate.id.0.clone(), "responses": { "q1": "Growth" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payload["score"], json!(87));
    assert_eq!(payload["candidateId"].as_str(), Some(candidate.id.0.as_str()));

    let (status, payload) = dispatch(
        &router,
        with_json(
            "POST",
            "/assessments/job-without-assessment/submit",
            &json!({ "candidateId": candidate.id.0.clone(), "responses": {} }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(payload["error"].is_string());
}
