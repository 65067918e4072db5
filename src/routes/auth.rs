use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::RequestId;
use crate::models::response::ApiResponse;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::service::auth::AuthService;
use rocket::serde::json::Json;
use rocket::{State, http::Status, routes};
use sqlx::PgPool;
use validator::Validate;

#[rocket::post("/register", data = "<payload>")]
pub async fn register(
    pool: &State<PgPool>,
    config: &State<Config>,
    request_id: RequestId,
    payload: Json<RegisterRequest>,
) -> Result<(Status, Json<ApiResponse<UserResponse>>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let service = AuthService::new(&repo, &config.jwt);
    let user = service.register(&payload.fullname, &payload.email, &payload.password).await?;

    let body = ApiResponse::success("User registered successfully", UserResponse::from(&user)).with_request_id(request_id.0);
    Ok((Status::Created, Json(body)))
}

#[rocket::post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    config: &State<Config>,
    request_id: RequestId,
    payload: Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let service = AuthService::new(&repo, &config.jwt);
    let (user, token) = service.login(&payload.email, &payload.password).await?;

    let body = ApiResponse::success(
        "Login successful",
        AuthResponse {
            token,
            user: UserResponse::from(&user),
        },
    )
    .with_request_id(request_id.0);
    Ok(Json(body))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![register, login]
}
