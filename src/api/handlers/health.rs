use crate::db::DbClient;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

/// Health check endpoint reporting PostgreSQL and Redis reachability
///
/// Answers 503 when the database cannot be reached. Redis only backs the variant cache,
/// so a Redis failure is reported without failing the check
pub async fn health_check(State(db): State<DbClient>) -> (StatusCode, Json<Value>) {
    let (status_code, database_status) = match db.ping_database().await {
        Ok(()) => (StatusCode::OK, json!("connected")),
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "status": "error",
                    "message": e.to_string()
                }),
            )
        }
    };

    let redis_status = match db.get_async_redis_conn().await {
        Err(e) => json!({
            "status": "error",
            "message": e.to_string()
        }),
        Ok(_) => json!("connected"),
    };

    let health_status = json!({
        "status": if status_code == StatusCode::OK { "ok" } else { "degraded" },
        "database": database_status,
        "redis": redis_status,
        "timestamp": chrono::Utc::now()
    });

    (status_code, Json(health_status))
}
