use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::repo_types::User;

pub const SESSION_COOKIE: &str = "sid";

/// Sessions older than this no longer resolve to a user.
pub const SESSION_TTL: Duration = Duration::days(30);

fn expiry_cutoff() -> OffsetDateTime {
    OffsetDateTime::now_utc() - SESSION_TTL
}

/// Create a session row for `user_id` and return its opaque token.
pub async fn create(db: &SqlitePool, user_id: i64) -> anyhow::Result<String> {
    purge_expired(db).await?;
    let token = Uuid::new_v4().simple().to_string();
    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)")
        .bind(&token)
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
    debug!(user_id, "session created");
    Ok(token)
}

pub async fn find_user(db: &SqlitePool, token: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.email, u.password_hash, u.display_name, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ?1 AND s.created_at > ?2
        "#,
    )
    .bind(token)
    .bind(expiry_cutoff())
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn destroy(db: &SqlitePool, token: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?1")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn purge_expired(db: &SqlitePool) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM sessions WHERE created_at <= ?1")
        .bind(expiry_cutoff())
        .execute(db)
        .await?;
    let n = res.rows_affected();
    if n > 0 {
        info!(purged = n, "expired sessions removed");
    }
    Ok(n)
}

/// Cookie carrying the session token; signed with the app key.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn session_token(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Resolves the signed-in user for a request.
#[async_trait]
pub trait CurrentUserProvider: Send + Sync {
    async fn current_user(&self, headers: &HeaderMap) -> anyhow::Result<Option<User>>;

    /// Revoke the session the request carries, if any.
    async fn end_session(&self, headers: &HeaderMap) -> anyhow::Result<()>;
}

/// Session token read from the signed `sid` cookie.
pub struct CookieSessions {
    db: SqlitePool,
    key: Key,
}

impl CookieSessions {
    pub fn new(db: SqlitePool, key: Key) -> Self {
        Self { db, key }
    }

    fn token(&self, headers: &HeaderMap) -> Option<String> {
        session_token(&SignedCookieJar::from_headers(headers, self.key.clone()))
    }
}

#[async_trait]
impl CurrentUserProvider for CookieSessions {
    async fn current_user(&self, headers: &HeaderMap) -> anyhow::Result<Option<User>> {
        match self.token(headers) {
            Some(token) => find_user(&self.db, &token).await,
            None => Ok(None),
        }
    }

    async fn end_session(&self, headers: &HeaderMap) -> anyhow::Result<()> {
        if let Some(token) = self.token(headers) {
            destroy(&self.db, &token).await?;
        }
        Ok(())
    }
}

/// Session token read from `Authorization: Bearer <token>`.
pub struct BearerSessions {
    db: SqlitePool,
}

impl BearerSessions {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
}

#[async_trait]
impl CurrentUserProvider for BearerSessions {
    async fn current_user(&self, headers: &HeaderMap) -> anyhow::Result<Option<User>> {
        match bearer_token(headers) {
            Some(token) => find_user(&self.db, token).await,
            None => Ok(None),
        }
    }

    async fn end_session(&self, headers: &HeaderMap) -> anyhow::Result<()> {
        if let Some(token) = bearer_token(headers) {
            destroy(&self.db, token).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::services, db::test_pool};

    #[tokio::test]
    async fn token_resolves_until_destroyed() {
        let db = test_pool().await;
        let user = services::register(&db, "a@x.com", "Alice", "pw123").await.unwrap();
        let token = create(&db, user.id).await.unwrap();

        let found = find_user(&db, &token).await.unwrap().expect("session user");
        assert_eq!(found.id, user.id);

        destroy(&db, &token).await.unwrap();
        assert!(find_user(&db, &token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bearer_provider_reads_authorization_header() {
        let db = test_pool().await;
        let user = services::register(&db, "b@x.com", "Bob", "pw").await.unwrap();
        let token = create(&db, user.id).await.unwrap();
        let provider = BearerSessions::new(db.clone());

        let mut headers = HeaderMap::new();
        assert!(provider.current_user(&headers).await.unwrap().is_none());

        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        let found = provider.current_user(&headers).await.unwrap().unwrap();
        assert_eq!(found.email, "b@x.com");

        headers.insert(AUTHORIZATION, "Bearer nope".parse().unwrap());
        assert!(provider.current_user(&headers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bearer_provider_ends_its_own_session() {
        let db = test_pool().await;
        let user = services::register(&db, "d@x.com", "Dan", "pw").await.unwrap();
        let token = create(&db, user.id).await.unwrap();
        let provider = BearerSessions::new(db.clone());

        let mut headers = HeaderMap::new();
        provider.end_session(&headers).await.unwrap();

        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        provider.end_session(&headers).await.unwrap();
        assert!(provider.current_user(&headers).await.unwrap().is_none());
        assert!(find_user(&db, &token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn old_sessions_expire_and_are_purged() {
        let db = test_pool().await;
        let user = services::register(&db, "e@x.com", "Eve", "pw").await.unwrap();
        let stale = create(&db, user.id).await.unwrap();

        sqlx::query("UPDATE sessions SET created_at = ?1 WHERE token = ?2")
            .bind(OffsetDateTime::now_utc() - SESSION_TTL - Duration::hours(1))
            .bind(&stale)
            .execute(&db)
            .await
            .unwrap();
        assert!(find_user(&db, &stale).await.unwrap().is_none());

        let fresh = create(&db, user.id).await.unwrap();
        assert!(find_user(&db, &fresh).await.unwrap().is_some());
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn cookie_provider_rejects_unsigned_tokens() {
        let db = test_pool().await;
        let user = services::register(&db, "c@x.com", "Cat", "pw").await.unwrap();
        let token = create(&db, user.id).await.unwrap();
        let provider = CookieSessions::new(db.clone(), Key::generate());

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            format!("{}={}", SESSION_COOKIE, token).parse().unwrap(),
        );
        assert!(provider.current_user(&headers).await.unwrap().is_none());
    }
}
