use serde::Deserialize;

use super::repo_types::LogEntry;

/// New log form. `action_type` stays a string so a bad value becomes a
/// validation flash rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewLogForm {
    pub action_type: Option<String>,
    pub date: Option<String>,
}

/// Logs in the trailing seven days with their totals.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub logs: Vec<LogEntry>,
    pub total_today: f64,
    pub total_week: f64,
}
