use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use tracing::warn;

use warbler_types::models::Flash;

const FLASH_KEY: &str = "flash";

/// Queues a message for the next rendered page.
pub fn push(jar: CookieJar, category: &str, message: impl Into<String>) -> CookieJar {
    let mut pending = read(&jar);
    pending.push(Flash::new(category, message));

    match serde_json::to_vec(&pending) {
        Ok(bytes) => jar.add(Cookie::build((FLASH_KEY, B64.encode(bytes))).path("/").http_only(true)),
        Err(e) => {
            warn!("Dropping flash message: {}", e);
            jar
        }
    }
}

/// Drains every pending message and clears the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    if jar.get(FLASH_KEY).is_none() {
        return (jar, Vec::new());
    }
    let pending = read(&jar);
    (jar.remove(Cookie::build(FLASH_KEY).path("/")), pending)
}

fn read(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_KEY)
        .and_then(|c| B64.decode(c.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}
