use thiserror::Error;

/// Why a page could not be retrieved over HTTP.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("timed out connecting")]
    ConnectTimeout,

    #[error("timed out waiting for the page")]
    RequestTimeout,

    #[error("redirect limit exceeded")]
    RedirectLoop,

    #[error("server answered {status}")]
    Http { status: reqwest::StatusCode },

    #[error("page is {0} bytes, over the size limit")]
    BodyTooLarge(u64),

    #[error("not an html page ({0})")]
    UnsupportedContentType(String),

    #[error("reading the body failed: {0}")]
    Io(String),

    #[error("http client setup failed: {0}")]
    Client(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout | Self::RequestTimeout)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            _ if err.is_timeout() && err.is_connect() => Self::ConnectTimeout,
            _ if err.is_timeout() => Self::RequestTimeout,
            _ if err.is_redirect() => Self::RedirectLoop,
            Some(status) => Self::Http { status },
            None if err.is_connect() || err.is_request() => Self::Connect(err.to_string()),
            None => Self::Io(err.to_string()),
        }
    }
}
