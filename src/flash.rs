//! One-shot messages carried across a redirect in a signed cookie.

use std::fmt;

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Danger, message)
    }

    // JSON would put quotes and commas in the cookie value.
    fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        Base64UrlUnpadded::encode_string(&json)
    }

    fn decode(raw: &str) -> Option<Self> {
        let bytes = Base64UrlUnpadded::decode_vec(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Store the flash for the next page render.
    pub fn set(self, jar: SignedCookieJar) -> SignedCookieJar {
        jar.add(
            Cookie::build((FLASH_COOKIE, self.encode()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        )
    }

    /// Read and clear the pending flash, if any.
    pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<Flash>) {
        let flash = jar
            .get(FLASH_COOKIE)
            .and_then(|c| Flash::decode(c.value()));
        let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
        (jar, flash)
    }
}

impl From<&AppError> for Flash {
    fn from(e: &AppError) -> Self {
        Flash::new(e.flash_level(), e.to_string())
    }
}

/// Redirect to `to`, leaving `flash` behind for the target page.
pub fn redirect(jar: SignedCookieJar, to: &str, flash: Flash) -> (SignedCookieJar, Redirect) {
    (flash.set(jar), Redirect::to(to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum_extra::extract::cookie::Key;

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(Key::generate())
    }

    #[test]
    fn encoded_value_is_cookie_safe() {
        let raw = Flash::danger("All fields required, \"really\"; now.").encode();
        assert!(raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(
            Flash::decode(&raw),
            Some(Flash::danger("All fields required, \"really\"; now."))
        );
    }

    #[test]
    fn take_returns_pending_flash_once() {
        let jar = Flash::warning("Please log in.").set(jar());
        let (jar, flash) = Flash::take(jar);
        assert_eq!(flash, Some(Flash::warning("Please log in.")));
        let (_, again) = Flash::take(jar);
        assert_eq!(again, None);
    }

    #[test]
    fn tampered_cookie_is_ignored() {
        let key = Key::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            format!("{}=forged{}", FLASH_COOKIE, Flash::info("hi").encode())
                .parse()
                .unwrap(),
        );
        let jar = SignedCookieJar::from_headers(&headers, key);
        let (_, flash) = Flash::take(jar);
        assert_eq!(flash, None);
    }

    #[test]
    fn level_renders_as_css_class() {
        assert_eq!(FlashLevel::Danger.to_string(), "danger");
        assert_eq!(FlashLevel::Success.to_string(), "success");
    }
}
