//! Best-effort cookie banner dismissal. Nothing here can fail an attempt.

use serde::Serialize;
use tokio::time::sleep;
use tracing::debug;

use crate::config::DriverConfig;

use super::bounded;
use super::session::PageSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "via", content = "detail")]
pub enum ConsentOutcome {
    /// A known accept button was clicked.
    AcceptSelector(&'static str),
    /// A visible button whose label mentions accepting was clicked.
    AcceptText(String),
    /// The banner was closed through a close/dismiss icon.
    Closed(&'static str),
    NotFound,
}

pub async fn dismiss<S>(session: &S, config: &DriverConfig) -> ConsentOutcome
where
    S: PageSession + ?Sized,
{
    let outcome = try_dismiss(session, config).await;
    if outcome != ConsentOutcome::NotFound {
        sleep(config.consent_settle).await;
    }
    debug!(?outcome, "consent dismissal");
    outcome
}

async fn try_dismiss<S>(session: &S, config: &DriverConfig) -> ConsentOutcome
where
    S: PageSession + ?Sized,
{
    for &selector in config.accept_selectors {
        if click_first_visible(session, selector, config).await {
            return ConsentOutcome::AcceptSelector(selector);
        }
    }

    if let Some(buttons) = bounded(config.consent_step_timeout, session.query_all("button")).await {
        let candidates = buttons
            .into_iter()
            .filter(|button| button.visible)
            .take(config.consent_button_scan);
        for button in candidates {
            if !button.text.to_lowercase().contains(config.accept_text) {
                continue;
            }
            if bounded(config.consent_step_timeout, session.click("button", button.index))
                .await
                .is_some()
            {
                return ConsentOutcome::AcceptText(button.text);
            }
        }
    }

    for &selector in config.close_selectors {
        if click_first_visible(session, selector, config).await {
            return ConsentOutcome::Closed(selector);
        }
    }
    ConsentOutcome::NotFound
}

async fn click_first_visible<S>(session: &S, selector: &str, config: &DriverConfig) -> bool
where
    S: PageSession + ?Sized,
{
    let Some(matches) = bounded(config.consent_step_timeout, session.query_all(selector)).await else {
        return false;
    };
    let Some(target) = matches.into_iter().find(|element| element.visible) else {
        return false;
    };
    bounded(config.consent_step_timeout, session.click(selector, target.index))
        .await
        .is_some()
}
