//! `Set-Cookie` values for the session and for one-shot toast notifications.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SESSION_COOKIE_NAME: &str = "auth";
pub const TOAST_COOKIE_NAME: &str = "toast";

const SECONDS_PER_DAY: i64 = 86_400;
const TOAST_MAX_AGE_SECONDS: i64 = 60;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Error,
}

#[derive(Debug, Clone, Serialize)]
struct Toast<'a> {
    #[serde(rename = "type")]
    kind: ToastKind,
    message: &'a str,
}

/// Builds the `HttpOnly` session cookie holding `api_key` for `valid_for_days`.
pub fn session_cookie(api_key: &str, valid_for_days: u32, secure: bool, now: DateTime<Utc>) -> String {
    let max_age = i64::from(valid_for_days) * SECONDS_PER_DAY;
    let value: String = url::form_urlencoded::byte_serialize(api_key.as_bytes()).collect();

    let mut cookie =
        format!("{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");

    // Validity windows past chrono's range keep Max-Age only.
    let expires = chrono::Duration::try_seconds(max_age).and_then(|ttl| now.checked_add_signed(ttl));
    match expires {
        Some(expires) => {
            cookie.push_str("; Expires=");
            cookie.push_str(&http_date(expires));
        }
        None => tracing::warn!(valid_for_days, "session expiry out of range, omitting Expires"),
    }

    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds a short-lived cookie the frontend reads once to show a notification.
pub fn toast_cookie(kind: ToastKind, message: &str, secure: bool) -> String {
    // Serializing a struct of a str and a unit enum cannot fail.
    let payload = serde_json::to_vec(&Toast { kind, message }).unwrap_or_default();
    let value = Base64UrlUnpadded::encode_string(&payload);

    let mut cookie =
        format!("{TOAST_COOKIE_NAME}={value}; Path=/; SameSite=Lax; Max-Age={TOAST_MAX_AGE_SECONDS}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
