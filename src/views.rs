//! Server-rendered pages.

use askama::Template;
use axum::response::Html;

use crate::{
    actions::ActionType,
    error::AppError,
    flash::Flash,
    logs::repo_types::LogEntry,
};

pub fn render<T: Template>(page: &T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub flash: Option<Flash>,
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub flash: Option<Flash>,
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub flash: Option<Flash>,
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub flash: Option<Flash>,
    pub signed_in: bool,
    pub display_name: String,
    pub logs: Vec<LogEntry>,
    pub total_today: f64,
    pub total_week: f64,
}

#[derive(Template)]
#[template(path = "new_log.html")]
pub struct NewLogPage {
    pub flash: Option<Flash>,
    pub signed_in: bool,
    pub action_types: Vec<ActionType>,
    pub today: String,
}

#[derive(Template)]
#[template(path = "logs.html")]
pub struct LogsPage {
    pub flash: Option<Flash>,
    pub signed_in: bool,
    pub logs: Vec<LogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};

    #[test]
    fn dashboard_shows_totals_and_escapes_names() {
        let page = DashboardPage {
            flash: Some(Flash::success("Saved.")),
            signed_in: true,
            display_name: "<Alice>".into(),
            logs: vec![LogEntry {
                id: 1,
                action_type_id: 1,
                action_name: "Walked instead of driving".into(),
                date: date!(2026 - 10 - 18),
                co2_saving: 1.5,
                created_at: OffsetDateTime::UNIX_EPOCH,
            }],
            total_today: 1.5,
            total_week: 1.5,
        };
        let html = page.render().unwrap();
        assert!(html.contains(r#"id="total-today">1.5<"#));
        assert!(html.contains(r#"id="total-week">1.5<"#));
        assert!(html.contains("2026-10-18"));
        assert!(html.contains("Saved."));
        assert!(html.contains("&lt;Alice&gt;"));
        assert!(!html.contains("<Alice>"));
    }

    #[test]
    fn new_log_form_lists_actions_and_prefills_today() {
        let page = NewLogPage {
            flash: None,
            signed_in: true,
            action_types: vec![
                ActionType {
                    id: 4,
                    name: "Ate a vegetarian meal".into(),
                    default_co2_saving: 0.8,
                },
                ActionType {
                    id: 2,
                    name: "Cycled instead of driving".into(),
                    default_co2_saving: 2.0,
                },
            ],
            today: "2026-10-18".into(),
        };
        let html = page.render().unwrap();
        assert!(html.contains(r#"<option value="4">"#));
        assert!(html.contains("(0.8 kg)"));
        assert!(html.contains("(2.0 kg)"));
        assert!(html.contains(r#"value="2026-10-18""#));
    }

    #[test]
    fn empty_history_says_so() {
        let html = LogsPage {
            flash: None,
            signed_in: true,
            logs: vec![],
        }
        .render()
        .unwrap();
        assert!(html.contains("No actions logged yet."));
    }
}
