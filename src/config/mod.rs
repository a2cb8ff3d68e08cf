//! Configuration handling for the crawler.
//!
//! Runtime settings (`Config`) come from environment variables with
//! development defaults and can be overridden by CLI flags. The extraction
//! thresholds (`HeuristicConfig`) and lifecycle timings (`DriverConfig`) are
//! immutable tables injected into the engine and the driver.

mod driver;
mod heuristics;

pub use driver::DriverConfig;
pub use heuristics::{HeuristicConfig, Keywords, LengthThresholds, Limits, Ratios, Selectors};

use std::env;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// Environment variable names.
pub const ENV_BACKEND: &str = "DOCSIFT_BACKEND";
pub const ENV_SEARCH_URL: &str = "DOCSIFT_SEARCH_URL";
pub const ENV_RESULT_SELECTOR: &str = "DOCSIFT_RESULT_SELECTOR";
pub const ENV_CONCURRENCY: &str = "DOCSIFT_CONCURRENCY";
pub const ENV_USER_AGENT: &str = "DOCSIFT_USER_AGENT";

const DEFAULT_SEARCH_URL: &str = "https://docs.example.com/search?q={query}";
const DEFAULT_RESULT_SELECTOR: &str = "a.search-result-title, .search-results a[href]";
const DEFAULT_CONCURRENCY: usize = 3;
const DEFAULT_USER_AGENT: &str = "docsift/0.1 (+https://github.com/docsift/docsift)";

/// Which browser-control backend drives page sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Plain HTTP fetch, no script execution.
    Http,
    /// Headless Chromium over CDP (requires the `chrome` feature).
    Chrome,
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Http => f.write_str("http"),
            Backend::Chrome => f.write_str("chrome"),
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Backend::Http),
            "chrome" | "chromium" => Ok(Backend::Chrome),
            other => Err(ConfigError::InvalidValue {
                field: ENV_BACKEND,
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    backend: Backend,
    search_url: String,
    result_selector: String,
    concurrency: usize,
    user_agent: String,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var(ENV_BACKEND) {
            Ok(value) => value.parse()?,
            Err(_) => Backend::Http,
        };
        let search_url =
            env::var(ENV_SEARCH_URL).unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string());
        if !search_url.contains("{query}") {
            return Err(ConfigError::InvalidValue {
                field: ENV_SEARCH_URL,
                reason: "template must contain a {query} placeholder".to_string(),
            });
        }
        let result_selector = env::var(ENV_RESULT_SELECTOR)
            .unwrap_or_else(|_| DEFAULT_RESULT_SELECTOR.to_string());
        let concurrency = match env::var(ENV_CONCURRENCY) {
            Ok(value) => parse_concurrency(&value)?,
            Err(_) => DEFAULT_CONCURRENCY,
        };
        let user_agent =
            env::var(ENV_USER_AGENT).unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            backend,
            search_url,
            result_selector,
            concurrency,
            user_agent,
        })
    }

    /// Apply CLI overrides on top of the environment.
    pub fn with_overrides(mut self, backend: Option<Backend>, concurrency: Option<usize>) -> Self {
        if let Some(backend) = backend {
            self.backend = backend;
        }
        if let Some(concurrency) = concurrency {
            self.concurrency = concurrency.max(1);
        }
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
    /// Search URL template; `{query}` is replaced by the encoded search item.
    pub fn search_url(&self) -> &str {
        &self.search_url
    }
    /// Selector matching result anchors on the search page.
    pub fn result_selector(&self) -> &str {
        &self.result_selector
    }
    /// Maximum number of pages crawled at once.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Http,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            result_selector: DEFAULT_RESULT_SELECTOR.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn parse_concurrency(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
            field: ENV_CONCURRENCY,
            reason: format!("expected a positive integer, got '{}'", value),
        }),
        Ok(n) => Ok(n),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
