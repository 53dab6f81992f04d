//! One-shot messages carried across a redirect in a cookie.

use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "alert-success",
            FlashLevel::Info => "alert-info",
            FlashLevel::Error => "alert-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

fn read(jar: &CookieJar) -> Vec<FlashMessage> {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return Vec::new();
    };

    let decoded = match urlencoding::decode(cookie.value()) {
        Ok(decoded) => decoded,
        Err(_) => return Vec::new(),
    };

    serde_json::from_str(&decoded).unwrap_or_else(|e| {
        tracing::debug!("Discarding unreadable flash cookie: {}", e);
        Vec::new()
    })
}

fn cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .build()
}

/// Queues a message for the next rendered page.
pub fn push(jar: CookieJar, level: FlashLevel, text: impl Into<String>) -> CookieJar {
    let mut messages = read(&jar);
    messages.push(FlashMessage { level, text: text.into() });

    match serde_json::to_string(&messages) {
        Ok(json) => jar.add(cookie(urlencoding::encode(&json).into_owned())),
        Err(e) => {
            tracing::warn!("Failed to encode flash messages: {}", e);
            jar
        }
    }
}

/// Drains pending messages, clearing the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    let messages = read(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }

    (jar.remove(cookie(String::new())), messages)
}

/// Redirects (303) to `to` after queueing a message.
pub fn redirect_with(
    jar: CookieJar,
    level: FlashLevel,
    text: impl Into<String>,
    to: &str,
) -> (CookieJar, Redirect) {
    (push(jar, level, text), Redirect::to(to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_take() {
        let jar = push(CookieJar::new(), FlashLevel::Success, "Resume created!");
        let jar = push(jar, FlashLevel::Info, "Changes saved!");

        let (jar, messages) = take(jar);
        assert_eq!(
            messages,
            vec![
                FlashMessage { level: FlashLevel::Success, text: "Resume created!".into() },
                FlashMessage { level: FlashLevel::Info, text: "Changes saved!".into() },
            ]
        );

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "%7Bnot-json"));
        let (_, messages) = take(jar);
        assert!(messages.is_empty());
    }
}
