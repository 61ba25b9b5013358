use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Public.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
