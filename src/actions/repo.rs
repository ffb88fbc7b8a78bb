use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use super::repo_types::ActionType;

/// Seeded when the catalog is empty.
pub const DEFAULT_ACTION_TYPES: &[(&str, f64)] = &[
    ("Walked instead of driving", 1.5),
    ("Cycled instead of driving", 2.0),
    ("Used public transport", 1.0),
    ("Ate a vegetarian meal", 0.8),
    ("Reduced home energy use", 0.5),
];

/// Insert the default catalog if no action types exist yet. Safe to run on
/// every startup.
pub async fn seed_defaults(db: &SqlitePool) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM action_types")
        .fetch_one(&mut *tx)
        .await
        .context("count action types")?;
    if existing > 0 {
        return Ok(());
    }

    for (name, co2) in DEFAULT_ACTION_TYPES {
        sqlx::query(
            "INSERT OR IGNORE INTO action_types (name, default_co2_saving) VALUES (?1, ?2)",
        )
        .bind(name)
        .bind(co2)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("seed action type {}", name))?;
    }
    tx.commit().await.context("commit tx")?;

    info!(count = DEFAULT_ACTION_TYPES.len(), "seeded action types");
    Ok(())
}

/// All action types, ordered by name.
pub async fn list(db: &SqlitePool) -> anyhow::Result<Vec<ActionType>> {
    let rows = sqlx::query_as::<_, ActionType>(
        r#"
        SELECT id, name, default_co2_saving
        FROM action_types
        ORDER BY name ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Look up an action type inside an open transaction.
pub async fn find_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> anyhow::Result<Option<ActionType>> {
    let row = sqlx::query_as::<_, ActionType>(
        "SELECT id, name, default_co2_saving FROM action_types WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row)
}

pub async fn find_by_name(db: &SqlitePool, name: &str) -> anyhow::Result<Option<ActionType>> {
    let row = sqlx::query_as::<_, ActionType>(
        "SELECT id, name, default_co2_saving FROM action_types WHERE name = ?1",
    )
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
