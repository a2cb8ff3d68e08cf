use std::time::Duration;

/// Timings and selector lists for one page lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub navigation_timeout: Duration,
    /// Pause after DOM readiness before touching the page.
    pub initial_settle: Duration,
    /// Cap on each consent sub-step (query or click).
    pub consent_step_timeout: Duration,
    pub consent_settle: Duration,
    /// Cap on waiting for each content marker.
    pub marker_timeout: Duration,
    /// Cap on polling for enough rendered text once a marker is present.
    pub content_wait: Duration,
    pub content_poll_interval: Duration,
    pub scroll_passes: usize,
    pub scroll_settle: Duration,
    /// Pause after scrolling back to the top.
    pub render_settle: Duration,
    pub primary_timeout: Duration,
    pub fallback_timeout: Duration,
    /// Extra wait before the text-node retry.
    pub retry_delay: Duration,
    pub retry_timeout: Duration,
    /// Cap on releasing a session once its attempt is over.
    pub close_timeout: Duration,
    pub content_markers: &'static [&'static str],
    pub accept_selectors: &'static [&'static str],
    pub close_selectors: &'static [&'static str],
    /// Visible buttons scanned for accept text.
    pub consent_button_scan: usize,
    pub accept_text: &'static str,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            initial_settle: Duration::from_secs(2),
            consent_step_timeout: Duration::from_secs(2),
            consent_settle: Duration::from_secs(1),
            marker_timeout: Duration::from_secs(5),
            content_wait: Duration::from_secs(10),
            content_poll_interval: Duration::from_millis(500),
            scroll_passes: 5,
            scroll_settle: Duration::from_secs(1),
            render_settle: Duration::from_secs(2),
            primary_timeout: Duration::from_secs(30),
            fallback_timeout: Duration::from_secs(10),
            retry_delay: Duration::from_secs(3),
            retry_timeout: Duration::from_secs(10),
            close_timeout: Duration::from_secs(5),
            content_markers: &[
                "doc-xml-content",
                "[data-name=\"content\"]",
                ".conbody",
                "main",
                "[role=\"main\"]",
                "article",
                "#content",
            ],
            accept_selectors: &[
                "#onetrust-accept-btn-handler",
                "#truste-consent-button",
                "#accept-recommended-btn-handler",
                "button[data-testid=\"cookie-accept\"]",
                "button[aria-label=\"Accept all\"]",
                ".cookie-accept",
                ".accept-cookies",
                "#acceptAllButton",
            ],
            close_selectors: &[
                "[aria-label=\"Close\"]",
                "[aria-label=\"close\"]",
                "button.close",
                ".close-button",
                ".modal-close",
                "[class*=\"dismiss\"]",
            ],
            consent_button_scan: 10,
            accept_text: "accept",
        }
    }
}

impl DriverConfig {
    /// Same selectors with every wait collapsed to zero. Useful for backends
    /// without script execution and for tests.
    pub fn without_delays() -> Self {
        Self {
            initial_settle: Duration::ZERO,
            consent_settle: Duration::ZERO,
            content_poll_interval: Duration::from_millis(10),
            scroll_settle: Duration::ZERO,
            render_settle: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
