// Client configuration: where the provider lives and how the HTTP client
// should be built. Kept separate from `api` so tests can point the client at
// a local fake provider.

/// Public ordering site used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.dominos.co.uk";

const DEFAULT_USER_AGENT: &str = concat!("dominos-session/", env!("CARGO_PKG_VERSION"));

/// Settings used to build a [`crate::api::DominosClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Provider root, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// When false, `HTTP_PROXY`/`HTTPS_PROXY` are ignored.
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            use_system_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Config for an explicit provider root.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    /// Read the config from `DOMINOS_BASE_URL` (falling back to
    /// [`DEFAULT_BASE_URL`]) and `DOMINOS_NO_PROXY`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("DOMINOS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let mut config = Self::with_base_url(base_url);
        config.use_system_proxy = std::env::var_os("DOMINOS_NO_PROXY").is_none();
        config
    }

    /// Join an endpoint path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
