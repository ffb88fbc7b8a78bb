use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::SqlitePool;

use crate::{
    actions,
    auth::session::{CookieSessions, CurrentUserProvider},
    config::AppConfig,
    db,
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub key: Key,
    pub current_user: Arc<dyn CurrentUserProvider>,
}

impl AppState {
    /// Connect, migrate and seed, then build the state around the pool.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;
        actions::repo::seed_defaults(&db).await?;
        Self::from_parts(db, Arc::new(config))
    }

    /// Cookie sessions are the default provider.
    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let key = Key::try_from(config.session.secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("derive cookie key from SESSION_SECRET: {:?}", e))?;
        let current_user = Arc::new(CookieSessions::new(db.clone(), key.clone()))
            as Arc<dyn CurrentUserProvider>;
        Ok(Self {
            db,
            config,
            key,
            current_user,
        })
    }

    pub fn with_user_provider(mut self, provider: Arc<dyn CurrentUserProvider>) -> Self {
        self.current_user = provider;
        self
    }

    /// Fresh in-memory database, fully migrated and seeded.
    pub async fn ephemeral() -> anyhow::Result<Self> {
        Self::init(AppConfig::ephemeral()).await
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
