use serde::Serialize;
use sqlx::FromRow;

/// Catalog entry; read-only once seeded.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActionType {
    pub id: i64,
    pub name: String,
    pub default_co2_saving: f64, // kg CO2
}
