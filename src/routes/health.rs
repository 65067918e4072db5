use chrono::{DateTime, Utc};
use rocket::routes;
use rocket::serde::json::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<Utc>,
}

#[rocket::get("/")]
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: Utc::now(),
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![healthcheck]
}
