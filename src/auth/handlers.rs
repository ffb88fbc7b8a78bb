use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        extractors::MaybeUser,
        services,
        session::{self, session_cookie, SESSION_COOKIE},
    },
    error::AppError,
    flash::{self, Flash},
    state::AppState,
    views::{self, IndexPage, LoginPage, RegisterPage},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

#[instrument(skip_all)]
pub async fn index(
    jar: SignedCookieJar,
    MaybeUser(user): MaybeUser,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let (jar, flash) = Flash::take(jar);
    let page = views::render(&IndexPage {
        flash,
        signed_in: false,
    })?;
    Ok((jar, page).into_response())
}

pub async fn register_page(
    jar: SignedCookieJar,
    MaybeUser(user): MaybeUser,
) -> Result<Response, AppError> {
    let (jar, flash) = Flash::take(jar);
    let page = views::render(&RegisterPage {
        flash,
        signed_in: user.is_some(),
    })?;
    Ok((jar, page).into_response())
}

#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let res = services::register(&state.db, &form.email, &form.display_name, &form.password).await;
    let (to, flash) = match res {
        Ok(_) => ("/login", Flash::success("Registered.")),
        // an existing account should just sign in
        Err(e @ AppError::Conflict(_)) => ("/login", Flash::from(&e)),
        Err(e) if e.is_internal() => return Err(e),
        Err(e) => ("/register", Flash::from(&e)),
    };
    Ok(flash::redirect(jar, to, flash).into_response())
}

pub async fn login_page(
    jar: SignedCookieJar,
    MaybeUser(user): MaybeUser,
) -> Result<Response, AppError> {
    let (jar, flash) = Flash::take(jar);
    let page = views::render(&LoginPage {
        flash,
        signed_in: user.is_some(),
    })?;
    Ok((jar, page).into_response())
}

#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match services::login(&state.db, &form.email, &form.password).await {
        Ok(user) => user,
        Err(e) if e.is_internal() => return Err(e),
        Err(e) => return Ok(flash::redirect(jar, "/login", Flash::from(&e)).into_response()),
    };

    let token = session::create(&state.db, user.id).await?;
    let jar = jar.add(session_cookie(token, state.config.session.cookie_secure));
    Ok(flash::redirect(jar, "/dashboard", Flash::success("Logged in.")).into_response())
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: SignedCookieJar,
) -> Result<Response, AppError> {
    state.current_user.end_session(&headers).await?;
    info!("session ended");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok(flash::redirect(jar, "/", Flash::info("Logged out.")).into_response())
}
