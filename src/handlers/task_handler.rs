//! handlers/task_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::task_service::TaskRegistry;

/// GET /api/tasks/{task_id}
pub async fn task_status_endpoint(
    registry: web::Data<TaskRegistry>,
    path: web::Path<String>,
) -> HttpResponse {
    let task_id = path.into_inner();

    match registry.get(&task_id) {
        Some(task) => HttpResponse::Ok().json(task),
        None => HttpResponse::NotFound().json(json!({
            "error": "Task ID not found."
        })),
    }
}
