//! Task intake endpoints

use actix_web::{HttpRequest, HttpResponse, error, web};
use serde::Serialize;
use wp_orchestrator_app::AppState;
use wp_orchestrator_core::error::CoreError;
use wp_orchestrator_core::types::WorkflowInvocation;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 256 * 1024;

#[derive(Serialize)]
struct Accepted {
    task_id: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    tasks_in_flight: usize,
    pending_status_updates: usize,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_BODY_BYTES)
            .error_handler(json_error),
    )
    .route("/tasks", web::post().to(submit_task))
    .route("/health", web::get().to(health));
}

/// Malformed bodies answer 400 in the same shape as a rejected invocation.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = CoreError::ValidationError(err.to_string());
    let response = HttpResponse::BadRequest().json(&body);
    error::InternalError::from_response(err, response).into()
}

/// `POST /tasks`: journal and queue the invocation, answer `202 {task_id}`.
async fn submit_task(
    state: web::Data<AppState>,
    invocation: web::Json<WorkflowInvocation>,
) -> HttpResponse {
    match state.dispatcher.dispatch(invocation.into_inner()).await {
        Ok(task_id) => HttpResponse::Accepted().json(Accepted {
            task_id: task_id.to_string(),
        }),
        Err(e @ CoreError::ValidationError(_)) => {
            tracing::warn!("Rejected task: {e}");
            HttpResponse::BadRequest().json(&e)
        }
        Err(e) => {
            tracing::error!("Failed to accept task: {e}");
            HttpResponse::InternalServerError().json(&e)
        }
    }
}

/// `GET /health`
async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(Health {
        status: "ok",
        tasks_in_flight: state.dispatcher.in_flight(),
        pending_status_updates: state.pending_status_updates(),
    })
}
