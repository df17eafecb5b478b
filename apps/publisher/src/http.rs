//! The HTTP trigger endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::info;

use crate::service::JobSender;

/// Router exposing `POST /publish-tasks`.
pub fn router(jobs: JobSender) -> Router {
    Router::new()
        .route("/publish-tasks", post(publish_tasks))
        .with_state(jobs)
}

async fn publish_tasks(State(jobs): State<JobSender>) -> (StatusCode, Json<Value>) {
    info!("publish task requested over http");
    match jobs.send("http call") {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "an error occurred while publishing" })),
        ),
    }
}
