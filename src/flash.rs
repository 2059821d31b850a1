//! Flash messages
//!
//! One-shot user-facing notices carried across a redirect in a signed
//! cookie: set on the redirect response, displayed and cleared by the next
//! `GET /`. The signature is a keyed SHA-256 digest over the URL-encoded
//! payload, so a tampered cookie is silently discarded rather than shown.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use sha2::{Digest, Sha256};

/// Cookie name used for pending flash messages.
pub const FLASH_COOKIE: &str = "flash";

fn sign(secret: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Seal a message into a `<signature>.<urlencoded payload>` cookie value.
pub fn seal(secret: &str, message: &str) -> String {
    let payload = urlencoding::encode(message).into_owned();
    format!("{}.{}", sign(secret, &payload), payload)
}

/// Verify and decode a sealed cookie value. Returns `None` when the
/// signature does not match or the payload is malformed.
pub fn open(secret: &str, value: &str) -> Option<String> {
    let (signature, payload) = value.split_once('.')?;
    if signature != sign(secret, payload) {
        return None;
    }
    urlencoding::decode(payload).ok().map(|m| m.into_owned())
}

/// `Set-Cookie` value that stores a pending flash message.
pub fn set_cookie(secret: &str, message: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", FLASH_COOKIE, seal(secret, message))
}

/// `Set-Cookie` value that clears any pending flash message.
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0", FLASH_COOKIE)
}

/// Extract the pending flash message from request headers, if any.
pub fn from_headers(secret: &str, headers: &HeaderMap) -> Option<String> {
    for cookies in headers.get_all(header::COOKIE) {
        let Ok(cookies) = cookies.to_str() else {
            continue;
        };
        for cookie in cookies.split(';') {
            if let Some(value) = cookie.trim().strip_prefix("flash=") {
                if let Some(message) = open(secret, value) {
                    return Some(message);
                }
            }
        }
    }
    None
}

/// Redirect to the upload form carrying a flash message.
pub fn redirect_to_index(secret: &str, message: &str) -> Response {
    let mut response = Redirect::to("/").into_response();
    // The sealed value is hex + percent-encoding, always a valid header.
    if let Ok(value) = HeaderValue::from_str(&set_cookie(secret, message)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn seal_then_open_round_trips() {
        let sealed = seal(SECRET, "File type not allowed. Only png, jpg, jpeg.");
        assert_eq!(
            open(SECRET, &sealed).as_deref(),
            Some("File type not allowed. Only png, jpg, jpeg.")
        );
    }

    #[test]
    fn tampered_value_is_rejected() {
        let sealed = seal(SECRET, "original");
        let (signature, _) = sealed.split_once('.').unwrap();
        let forged = format!("{}.{}", signature, urlencoding::encode("forged"));
        assert_eq!(open(SECRET, &forged), None);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let sealed = seal(SECRET, "message");
        assert_eq!(open("other-secret", &sealed), None);
    }

    #[test]
    fn garbage_value_is_rejected() {
        assert_eq!(open(SECRET, "no-dot-here"), None);
        assert_eq!(open(SECRET, ""), None);
    }

    #[test]
    fn from_headers_reads_the_flash_cookie() {
        let mut headers = HeaderMap::new();
        let value = format!("session=abc; {}={}", FLASH_COOKIE, seal(SECRET, "hello"));
        headers.insert(header::COOKIE, value.parse().unwrap());
        assert_eq!(from_headers(SECRET, &headers).as_deref(), Some("hello"));
    }

    #[test]
    fn from_headers_without_cookie_is_none() {
        assert_eq!(from_headers(SECRET, &HeaderMap::new()), None);
    }
}
