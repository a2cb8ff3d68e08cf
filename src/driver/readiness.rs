//! Waiting for a page to finish rendering its content.

use std::sync::Arc;

use serde_json::json;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::DriverConfig;

use super::session::{PageSession, SessionError};
use super::stages::ExtractionStages;
use super::bounded;

/// Scrolls one viewport further per pass so lazy sections load.
const SCROLL_STEP: &str = r#"(args) => {
    const height = Math.max(document.body ? document.body.scrollHeight : 0, window.innerHeight);
    window.scrollTo(0, Math.min(height, window.innerHeight * (args.pass + 1)));
    return window.scrollY;
}"#;

const SCROLL_TOP: &str = "() => { window.scrollTo(0, 0); return true; }";

/// The first content marker present on the page, trying each in order.
pub async fn wait_for_marker<S>(session: &S, config: &DriverConfig) -> Option<&'static str>
where
    S: PageSession + ?Sized,
{
    for &marker in config.content_markers {
        let found = bounded(
            config.marker_timeout,
            session.wait_for_selector(marker, config.marker_timeout),
        )
        .await;
        if found == Some(true) {
            debug!(marker, "content marker present");
            return Some(marker);
        }
    }
    debug!("no content marker appeared");
    None
}

/// Poll snapshots until the stages report the page ready, for at most the
/// configured content wait.
pub async fn wait_for_content<S>(
    session: &S,
    stages: &Arc<dyn ExtractionStages>,
    config: &DriverConfig,
) -> bool
where
    S: PageSession + ?Sized,
{
    let poll = async {
        loop {
            if let Some(html) = bounded(config.content_wait, session.snapshot()).await {
                let stages = Arc::clone(stages);
                if let Ok(true) = tokio::task::spawn_blocking(move || stages.ready(&html)).await {
                    return;
                }
            }
            sleep(config.content_poll_interval).await;
        }
    };

    match timeout(config.content_wait, poll).await {
        Ok(()) => true,
        Err(_) => {
            warn!(waited = ?config.content_wait, "content did not reach the ready length");
            false
        }
    }
}

/// Scroll down in passes, then back to the top. Backends without script
/// execution skip straight out.
pub async fn scroll<S>(session: &S, config: &DriverConfig)
where
    S: PageSession + ?Sized,
{
    for pass in 0..config.scroll_passes {
        match timeout(config.marker_timeout, session.evaluate(SCROLL_STEP, json!({ "pass": pass }))).await {
            Ok(Err(SessionError::Unsupported(_))) => return,
            Ok(Err(err)) => debug!(pass, error = %err, "scroll pass failed"),
            Err(_) => debug!(pass, "scroll pass timed out"),
            Ok(Ok(_)) => {}
        }
        sleep(config.scroll_settle).await;
    }
    let _ = bounded(config.marker_timeout, session.evaluate(SCROLL_TOP, json!({}))).await;
    sleep(config.render_settle).await;
}
