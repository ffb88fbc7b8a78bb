use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::warn;

use crate::{
    auth::repo_types::User,
    error::AppError,
    flash::{self, Flash},
    state::AppState,
};

/// The signed-in user, if any, as resolved by the configured provider.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = state.current_user.current_user(&parts.headers).await?;
        Ok(MaybeUser(user))
    }
}

/// The signed-in user placed on the request by [`require_auth`].
#[derive(Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| Redirect::to("/login").into_response())
    }
}

/// Route layer for pages that need a session.
pub async fn require_auth(
    jar: SignedCookieJar,
    MaybeUser(user): MaybeUser,
    mut req: Request,
    next: Next,
) -> Response {
    match user {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        None => {
            warn!(uri = %req.uri(), "no session");
            flash::redirect(jar, "/login", Flash::warning("Please log in.")).into_response()
        }
    }
}
