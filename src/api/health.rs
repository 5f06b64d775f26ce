use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::MongoDB;
use crate::utils::iso_now;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub status: String,
    /// ISO-8601 server time
    pub time: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongodb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    )
)]
pub async fn status() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        status: "ok".to_string(),
        time: iso_now(),
    })
}

#[utoipa::path(
    get,
    path = "/api/test-db",
    tag = "Health",
    responses(
        (status = 200, description = "MongoDB reachable", body = DatabaseStatusResponse),
        (status = 500, description = "MongoDB unreachable", body = DatabaseStatusResponse)
    )
)]
pub async fn test_db(db: web::Data<MongoDB>) -> HttpResponse {
    match db.connect().await {
        Ok(()) => HttpResponse::Ok().json(DatabaseStatusResponse {
            status: "ok".to_string(),
            mongodb: Some("Connected successfully".to_string()),
            message: None,
        }),
        Err(e) => {
            log::error!("❌ MongoDB connectivity check failed: {}", e);
            HttpResponse::InternalServerError().json(DatabaseStatusResponse {
                status: "error".to_string(),
                mongodb: None,
                message: Some(e.to_string()),
            })
        }
    }
}
