use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};
use time::{Date, OffsetDateTime};

use super::repo_types::{Log, LogEntry};

/// Insert a log within a transaction.
pub async fn insert_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    action_type_id: i64,
    date: Date,
    co2_saving: f64,
) -> anyhow::Result<Log> {
    let log = sqlx::query_as::<_, Log>(
        r#"
        INSERT INTO logs (user_id, action_type_id, date, co2_saving, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, user_id, action_type_id, date, co2_saving, created_at
        "#,
    )
    .bind(user_id)
    .bind(action_type_id)
    .bind(date)
    .bind(co2_saving)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(&mut **tx)
    .await
    .context("insert log")?;
    Ok(log)
}

// ---- Queries ----

/// Every log of a user, newest date first.
pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<LogEntry>> {
    let rows = sqlx::query_as::<_, LogEntry>(
        r#"
        SELECT l.id, l.action_type_id, a.name AS action_name, l.date, l.co2_saving, l.created_at
          FROM logs l
          JOIN action_types a ON a.id = l.action_type_id
         WHERE l.user_id = ?1
         ORDER BY l.date DESC, l.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list logs by user")?;
    Ok(rows)
}

/// Logs of a user with `from <= date <= to`, newest date first.
pub async fn list_by_user_between(
    db: &SqlitePool,
    user_id: i64,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<LogEntry>> {
    let rows = sqlx::query_as::<_, LogEntry>(
        r#"
        SELECT l.id, l.action_type_id, a.name AS action_name, l.date, l.co2_saving, l.created_at
          FROM logs l
          JOIN action_types a ON a.id = l.action_type_id
         WHERE l.user_id = ?1 AND l.date >= ?2 AND l.date <= ?3
         ORDER BY l.date DESC, l.id DESC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await
    .context("list logs by user and date range")?;
    Ok(rows)
}
