use std::collections::HashMap;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use ecosustain::{app::build_app, state::AppState};
use tower::ServiceExt;

/// Drives the router in-process and keeps cookies between requests like a
/// browser would.
pub struct TestClient {
    pub state: AppState,
    app: Router,
    cookies: HashMap<String, String>,
}

pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestClient {
    pub async fn new() -> Self {
        let state = AppState::ephemeral().await.expect("ephemeral state");
        Self::with_state(state)
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            app: build_app(state.clone()),
            state,
            cookies: HashMap::new(),
        }
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub async fn get(&mut self, uri: &str) -> Page {
        let req = Request::get(uri);
        self.send(req, Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &[(&str, &str)]) -> Page {
        let body = form
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.replace('@', "%40").replace(' ', "+")))
            .collect::<Vec<_>>()
            .join("&");
        let req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(req, Body::from(body)).await
    }

    pub async fn send(&mut self, mut req: axum::http::request::Builder, body: Body) -> Page {
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            req = req.header(header::COOKIE, cookie);
        }
        let res = self
            .app
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        self.read(res).await
    }

    async fn read(&mut self, res: Response<Body>) -> Page {
        for set in res.headers().get_all(header::SET_COOKIE) {
            let set = set.to_str().unwrap();
            let pair = set.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if set.contains("Max-Age=0") || value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        Page {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// Register and log in, leaving the session cookie in the jar.
    pub async fn sign_up_and_in(&mut self, email: &str, name: &str, password: &str) {
        let page = self
            .post_form(
                "/register",
                &[("email", email), ("display_name", name), ("password", password)],
            )
            .await;
        assert_eq!(page.location.as_deref(), Some("/login"));
        let page = self
            .post_form("/login", &[("email", email), ("password", password)])
            .await;
        assert_eq!(page.location.as_deref(), Some("/dashboard"));
    }
}

pub async fn action_id(state: &AppState, name: &str) -> String {
    ecosustain::actions::repo::find_by_name(&state.db, name)
        .await
        .unwrap()
        .expect("seeded action")
        .id
        .to_string()
}
