use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Log record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Log {
    pub id: i64,
    pub user_id: i64,
    pub action_type_id: i64,
    pub date: Date,
    pub co2_saving: f64, // copied from the action type when logged
    pub created_at: OffsetDateTime,
}

/// Log joined with its action type name, for listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub action_type_id: i64,
    pub action_name: String,
    pub date: Date,
    pub co2_saving: f64,
    pub created_at: OffsetDateTime,
}
