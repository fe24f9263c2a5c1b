// Resettable cookie jar. reqwest takes its cookie provider once, at build
// time, so a session reset swaps the jar behind this handle instead of
// rebuilding the HTTP client.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::Url;

/// Cookie store shared with the HTTP client for the lifetime of a session.
#[derive(Default)]
pub struct SessionJar {
    inner: RwLock<Arc<Jar>>,
}

impl SessionJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cookie by replacing the jar with an empty one.
    pub fn reset(&self) {
        *self.inner.write() = Arc::new(Jar::default());
    }

    fn current(&self) -> Arc<Jar> {
        self.inner.read().clone()
    }
}

impl CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.current().set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.current().cookies(url)
    }
}
