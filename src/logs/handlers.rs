use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::instrument;

use crate::{
    actions,
    auth::extractors::CurrentUser,
    error::AppError,
    flash::{self, Flash},
    state::AppState,
    views::{self, DashboardPage, LogsPage, NewLogPage},
};

use super::{dto::NewLogForm, services};

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/log/new", get(new_log_page).post(create_log))
        .route("/logs", get(all_logs))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let summary = services::dashboard_summary(&state.db, user.id, services::today_utc()).await?;
    let (jar, flash) = Flash::take(jar);
    let page = views::render(&DashboardPage {
        flash,
        signed_in: true,
        display_name: user.display_name,
        logs: summary.logs,
        total_today: summary.total_today,
        total_week: summary.total_week,
    })?;
    Ok((jar, page).into_response())
}

pub async fn new_log_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    CurrentUser(_user): CurrentUser,
) -> Result<Response, AppError> {
    let action_types = actions::repo::list(&state.db).await?;
    let (jar, flash) = Flash::take(jar);
    let page = views::render(&NewLogPage {
        flash,
        signed_in: true,
        action_types,
        today: services::format_date(services::today_utc()),
    })?;
    Ok((jar, page).into_response())
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_log(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NewLogForm>,
) -> Result<Response, AppError> {
    let res = services::create_log(
        &state.db,
        user.id,
        form.action_type.as_deref(),
        form.date.as_deref(),
        services::today_utc(),
    )
    .await;
    let (to, flash) = match res {
        Ok(_) => ("/dashboard", Flash::success("Saved.")),
        Err(e) if e.is_internal() => return Err(e),
        Err(e) => ("/log/new", Flash::from(&e)),
    };
    Ok(flash::redirect(jar, to, flash).into_response())
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn all_logs(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let logs = services::list_logs(&state.db, user.id).await?;
    let (jar, flash) = Flash::take(jar);
    let page = views::render(&LogsPage {
        flash,
        signed_in: true,
        logs,
    })?;
    Ok((jar, page).into_response())
}
