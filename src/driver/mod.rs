//! Drives one documentation page from navigation to extracted text through a
//! [`PageSession`] backend.

pub mod consent;
pub mod errors;
pub mod http_session;
pub mod lifecycle;
pub mod readiness;
pub mod session;
pub mod stages;
pub mod state;

#[cfg(feature = "chrome")]
pub mod chrome;

pub use consent::ConsentOutcome;
pub use errors::{CrawlError, InsufficientContentError};
pub use http_session::{HttpSession, HttpSessionFactory};
pub use lifecycle::{CrawlOutcome, Driver};
pub use session::{ElementInfo, PageSession, SessionError, SessionFactory};
pub use stages::{ExtractionStages, PipelineStages};
pub use state::{AttemptState, Stage};

#[cfg(feature = "chrome")]
pub use chrome::{ChromeSession, ChromeSessionFactory};

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

/// Race an in-page call against `limit`. Timeouts and backend errors both
/// read as "no data".
pub(crate) async fn bounded<T, E, F>(limit: Duration, call: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match timeout(limit, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "in-page call failed");
            None
        }
        Err(_) => {
            tracing::debug!(?limit, "in-page call timed out");
            None
        }
    }
}
