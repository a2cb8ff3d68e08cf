//! The narrow browser capability the driver is written against.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::fetcher::FetchError;

/// What a backend reports about one element matched by [`PageSession::query_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Position among all matches of the selector, used to click it later.
    pub index: usize,
    pub text: String,
    pub visible: bool,
    pub href: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),

    #[error("no page loaded")]
    NoPage,

    #[error("session closed")]
    Closed,

    #[error("no element matches '{selector}' at index {index}")]
    NoSuchElement { selector: String, index: usize },

    #[error("browser error: {0}")]
    Browser(String),
}

/// One page in one browser-like backend.
///
/// Every call may hang; the driver races each against its own timeout and
/// treats failures of in-page calls as "no data".
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Load `url`, returning once the DOM is ready (not on network idle).
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Whether `selector` matched within `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool, SessionError>;

    /// Run `script`, a JavaScript function expression, with `args` as its
    /// single argument and return its JSON result.
    async fn evaluate(&self, script: &str, args: Value) -> Result<Value, SessionError>;

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, SessionError>;

    /// Click the `index`-th match of `selector`.
    async fn click(&self, selector: &str, index: usize) -> Result<(), SessionError>;

    /// Serialised DOM of the current page, shadow roots included as
    /// declarative `<template shadowrootmode>` children of their hosts.
    async fn snapshot(&self) -> Result<String, SessionError>;

    /// Release the page. Later calls fail with [`SessionError::Closed`];
    /// closing twice is a no-op.
    async fn close(&self) -> Result<(), SessionError>;

    fn is_closed(&self) -> bool;
}

/// Opens a fresh session per crawl attempt.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: PageSession + 'static;

    async fn open(&self) -> Result<Self::Session, SessionError>;
}
