//! Extracts the readable prose of documentation pages, including pages
//! that render their content inside shadow roots.

pub mod config;
pub mod crawl;
pub mod dom;
pub mod driver;
pub mod extractor;
pub mod fetcher;
pub mod search;
