use sqlx::SqlitePool;
use time::{macros::format_description, Date, Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use super::{
    dto::DashboardSummary,
    repo,
    repo_types::{Log, LogEntry},
};
use crate::{actions, error::AppError};

/// Days covered by the dashboard, today included.
pub const WEEK_DAYS: i64 = 7;

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Blank or missing means `today`; otherwise ISO `YYYY-MM-DD`.
pub fn parse_log_date(raw: Option<&str>, today: Date) -> Result<Date, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]")).map_err(|e| {
            warn!(input = %s, error = %e, "malformed log date");
            AppError::validation("Invalid date.")
        }),
    }
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Record that `user_id` performed an action. The action type's current
/// saving is copied onto the log.
#[instrument(skip(db))]
pub async fn create_log(
    db: &SqlitePool,
    user_id: i64,
    action_type_id: Option<&str>,
    date: Option<&str>,
    today: Date,
) -> Result<Log, AppError> {
    let action_type_id = action_type_id
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::validation("Pick an action."))?;
    let date = parse_log_date(date, today)?;

    let mut tx = db.begin().await?;
    let Some(action) = actions::repo::find_tx(&mut tx, action_type_id).await? else {
        warn!(action_type_id, "unknown action type");
        return Err(AppError::validation("Pick an action."));
    };
    let log = repo::insert_tx(&mut tx, user_id, action.id, date, action.default_co2_saving).await?;
    tx.commit().await?;

    info!(log_id = log.id, user_id, action = %action.name, %date, "log saved");
    Ok(log)
}

pub async fn list_logs(db: &SqlitePool, user_id: i64) -> Result<Vec<LogEntry>, AppError> {
    Ok(repo::list_by_user(db, user_id).await?)
}

#[instrument(skip(db))]
pub async fn dashboard_summary(
    db: &SqlitePool,
    user_id: i64,
    today: Date,
) -> Result<DashboardSummary, AppError> {
    let from = today
        .checked_sub(Duration::days(WEEK_DAYS - 1))
        .unwrap_or(Date::MIN);
    let logs = repo::list_by_user_between(db, user_id, from, today).await?;
    Ok(DashboardSummary::from_logs(logs, today))
}

impl DashboardSummary {
    /// `logs` must already be limited to the week window.
    pub fn from_logs(logs: Vec<LogEntry>, today: Date) -> Self {
        // an empty Sum<f64> is -0.0
        let total_week = logs.iter().fold(0.0, |acc, l| acc + l.co2_saving);
        let total_today = logs
            .iter()
            .filter(|l| l.date == today)
            .fold(0.0, |acc, l| acc + l.co2_saving);
        Self {
            logs,
            total_today,
            total_week,
        }
    }
}
