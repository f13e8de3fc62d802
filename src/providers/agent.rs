use parking_lot::Mutex;
use reqwest::Url;

/// The navigation surface an OAuth flow needs from its host.
pub trait UserAgent: Send + Sync {
    /// URL the host is currently showing; auth callbacks arrive here.
    fn current_url(&self) -> Url;

    /// Sends the user to `url` (e.g. a provider's authorization page).
    fn navigate(&self, url: &Url);

    /// Rewrites the current URL without navigating, used to drop consumed
    /// callback parameters.
    fn replace_url(&self, url: &Url);

    /// Restarts the host after logout.
    fn reload(&self);
}

/// `UserAgent` whose location is a plain value: navigation records the target
/// and logs it for the user to open.
pub struct StaticAgent {
    current: Mutex<Url>,
    navigations: Mutex<Vec<Url>>,
}

impl StaticAgent {
    pub fn new(current: Url) -> Self {
        Self {
            current: Mutex::new(current),
            navigations: Mutex::new(Vec::new()),
        }
    }

    /// Simulates the browser landing on `url`, e.g. an auth redirect.
    pub fn set_current(&self, url: Url) {
        *self.current.lock() = url;
    }

    pub fn last_navigation(&self) -> Option<Url> {
        self.navigations.lock().last().cloned()
    }
}

impl UserAgent for StaticAgent {
    fn current_url(&self) -> Url {
        self.current.lock().clone()
    }

    fn navigate(&self, url: &Url) {
        log::info!("Open this URL to continue: {}", url);
        self.navigations.lock().push(url.clone());
    }

    fn replace_url(&self, url: &Url) {
        *self.current.lock() = url.clone();
    }

    fn reload(&self) {
        log::debug!("Reload requested");
    }
}

/// Decodes `a=1&b=2` style data, as found in a URL fragment.
pub fn parse_fragment(fragment: &str) -> Vec<(String, String)> {
    fragment
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                urlencoding::decode(&s.replace('+', " "))
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            };
            (decode(key), decode(value))
        })
        .collect()
}
