//! Static HTTP retrieval of documentation pages.

mod charset;
mod client;
mod errors;
mod types;

pub use charset::decode_html;
pub use client::{Fetcher, MAX_BODY_SIZE};
pub use errors::FetchError;
pub use types::FetchedPage;
