use crate::middleware::RequestId;
use crate::models::response::ErrorResponse;
use rocket::serde::json::Json;
use rocket::{Request, catch};

fn envelope(req: &Request, message: &str, code: u16) -> Json<ErrorResponse> {
    let mut body = ErrorResponse::new(message, code);
    if let Some(request_id) = req.local_cache(|| None::<RequestId>).as_ref() {
        body = body.with_request_id(request_id.0.clone());
    }
    Json(body)
}

#[catch(400)]
pub fn bad_request(req: &Request) -> Json<ErrorResponse> {
    envelope(req, "Bad request", 400)
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> Json<ErrorResponse> {
    envelope(req, "Unauthorized", 401)
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<ErrorResponse> {
    envelope(req, "Not found", 404)
}

#[catch(409)]
pub fn conflict(req: &Request) -> Json<ErrorResponse> {
    envelope(req, "Conflict", 409)
}

// Rocket reports unparseable JSON bodies as 422.
#[catch(422)]
pub fn unprocessable_entity(req: &Request) -> Json<ErrorResponse> {
    envelope(req, "Malformed request body", 422)
}

#[catch(500)]
pub fn internal_error(req: &Request) -> Json<ErrorResponse> {
    envelope(req, "Internal server error", 500)
}
