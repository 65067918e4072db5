use crate::auth::CurrentUser;
use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::RequestId;
use crate::models::response::ApiResponse;
use crate::models::user::UserResponse;
use crate::service::auth::AuthService;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::PgPool;

#[rocket::get("/me")]
pub async fn me(
    pool: &State<PgPool>,
    config: &State<Config>,
    current_user: CurrentUser,
    request_id: RequestId,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let service = AuthService::new(&repo, &config.jwt);
    let user = service.get_user(&current_user.id).await?;

    Ok(Json(ApiResponse::success("User retrieved successfully", UserResponse::from(&user)).with_request_id(request_id.0)))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![me]
}
