use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo::CreateUser,
        repo_types::User,
    },
    error::AppError,
};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(db, password))]
pub async fn register(
    db: &SqlitePool,
    email: &str,
    display_name: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = normalize_email(email);
    let display_name = display_name.trim();

    if email.is_empty() || display_name.is_empty() || password.is_empty() {
        return Err(AppError::validation("All fields required."));
    }

    if User::find_by_email(db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::conflict("Email exists."));
    }

    let hash = hash_password(password)?;
    match User::create(db, &email, display_name, &hash).await? {
        CreateUser::Created(user) => {
            info!(user_id = user.id, email = %user.email, "user registered");
            Ok(user)
        }
        CreateUser::EmailTaken => {
            warn!(email = %email, "email registered concurrently");
            Err(AppError::conflict("Email exists."))
        }
    }
}

/// Check credentials. Unknown email and wrong password are indistinguishable
/// to the caller.
#[instrument(skip(db, password))]
pub async fn login(db: &SqlitePool, email: &str, password: &str) -> Result<User, AppError> {
    let email = normalize_email(email);

    let Some(user) = User::find_by_email(db, &email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::auth("Wrong details."));
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(AppError::auth("Wrong details."));
    }

    info!(user_id = user.id, "user logged in");
    Ok(user)
}
