use crate::auth::{issue_token, verify_token};
use crate::config::JwtConfig;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use argon2::Argon2;
use chrono::Duration;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};
use std::sync::LazyLock;
use uuid::Uuid;

/// A real Argon2 hash generated once at startup, used as a timing decoy so
/// that login requests for non-existent users take the same time as requests
/// for existing users.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", Salt::from(&salt))
        .expect("failed to generate dummy hash")
        .to_string()
});

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt_string = SaltString::generate(&mut OsRng);
    let salt = Salt::from(&salt_string);
    let hash = PasswordHash::generate(Argon2::default(), password.as_bytes(), salt)?;

    Ok(hash.to_string())
}

pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Perform a throwaway Argon2 verification to equalize response timing
/// regardless of whether the target account exists.
fn dummy_verify(password: &str) {
    if let Ok(hash) = PasswordHash::new(&DUMMY_HASH) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }
}

pub struct AuthService<'a, R: UserRepository> {
    repo: &'a R,
    jwt: &'a JwtConfig,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repo: &'a R, jwt: &'a JwtConfig) -> Self {
        AuthService { repo, jwt }
    }

    /// Registers a new user. The existence pre-check and the insert are two
    /// separate statements; a duplicate slipping between them still surfaces
    /// as a conflict via the repository's unique-violation translation.
    pub async fn register(&self, fullname: &str, email: &str, password: &str) -> Result<User, AppError> {
        if self.repo.exists_by_email(email).await? {
            return Err(AppError::UserAlreadyExists(email.to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = User::new(fullname.to_string(), email.to_string(), password_hash);
        self.repo.create_user(&user).await?;

        Ok(user)
    }

    /// Fails with the same error whether the email is unknown or the
    /// password does not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            dummy_verify(password);
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&user.password_hash, password)? {
            return Err(AppError::InvalidCredentials);
        }

        let token = issue_token(&self.jwt.secret, &user, Duration::seconds(self.jwt.expiration as i64))?;
        Ok((user, token))
    }

    pub async fn user_from_token(&self, token: &str) -> Result<User, AppError> {
        let claims = verify_token(&self.jwt.secret, token)?;
        let user_id = claims.user_id()?;
        self.get_user(&user_id).await
    }

    pub async fn get_user(&self, id: &Uuid) -> Result<User, AppError> {
        self.repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
