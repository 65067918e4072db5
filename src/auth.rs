use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

pub const TOKEN_ISSUER: &str = "todo-api";

/// Payload of a signed bearer token. `sub` carries the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub fullname: String,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)
    }
}

pub fn issue_token(secret: &str, user: &User, expiration: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        fullname: user.fullname.clone(),
        iss: TOKEN_ISSUER.to_string(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
        exp: (now + expiration).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes())).map_err(|_| AppError::InvalidToken)
}

/// Accepts only tokens signed with the expected HMAC algorithm; a token
/// carrying any other `alg` header fails outright.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.validate_nbf = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

fn bearer_token<'r>(request: &'r Request<'_>) -> Option<&'r str> {
    request
        .headers()
        .get_one("Authorization")?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Request guard resolving the bearer token to the authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(token) = bearer_token(req) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let Some(config) = req.rocket().state::<Config>() else {
            return Outcome::Error((Status::InternalServerError, AppError::Unauthorized));
        };

        let claims = match verify_token(&config.jwt.secret, token) {
            Ok(claims) => claims,
            Err(err) => return Outcome::Error((Status::Unauthorized, err)),
        };

        let user_id = match claims.user_id() {
            Ok(id) => id,
            Err(err) => return Outcome::Error((Status::Unauthorized, err)),
        };

        let Some(pool) = req.rocket().state::<PgPool>() else {
            return Outcome::Error((Status::InternalServerError, AppError::Unauthorized));
        };

        let repo = PostgresRepository::new(pool.clone());
        match repo.get_user_by_id(&user_id).await {
            Ok(Some(user)) => {
                let current_user = CurrentUser {
                    id: user.id,
                    fullname: user.fullname,
                    email: user.email,
                };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Ok(None) => Outcome::Error((Status::Unauthorized, AppError::InvalidToken)),
            Err(err) => Outcome::Error((Status::InternalServerError, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new("Alice".to_string(), "alice@example.com".to_string(), "hash".to_string())
    }

    #[test]
    fn token_round_trip_recovers_user_id() {
        let user = sample_user();
        let token = issue_token("s3cret", &user, Duration::hours(1)).expect("token issued");
        let claims = verify_token("s3cret", &token).expect("token verifies");

        assert_eq!(claims.user_id().expect("valid uuid"), user.id);
        assert_eq!(claims.fullname, "Alice");
        assert_eq!(claims.iss, TOKEN_ISSUER);
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = sample_user();
        let token = issue_token("s3cret", &user, Duration::hours(-2)).expect("token issued");
        assert!(matches!(verify_token("s3cret", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let user = sample_user();
        let token = issue_token("s3cret", &user, Duration::hours(1)).expect("token issued");
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn foreign_signing_algorithm_is_rejected() {
        // A token signed with a different HMAC variant must not pass,
        // even with the correct secret.
        let user = sample_user();
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            fullname: user.fullname.clone(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS384), &claims, &EncodingKey::from_secret(b"s3cret")).expect("encodable");

        assert!(verify_token("s3cret", &token).is_err());
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let user = sample_user();
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            fullname: user.fullname.clone(),
            iss: "someone-else".to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(b"s3cret")).expect("encodable");

        assert!(verify_token("s3cret", &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("s3cret", "not.a.token").is_err());
        assert!(verify_token("s3cret", "").is_err());
    }
}
