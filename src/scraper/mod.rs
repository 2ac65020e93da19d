//! Retrieval: the archive client, its page operations and search filters.
//!
//! Every operation fetches exactly one page. A non-success status is returned as
//! [`ScraperError::HttpStatus`] and the body is never parsed.

mod archive;
mod client;
mod error;
pub mod search;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{ArchiveClient, ArchiveClientBuilder, DEFAULT_BASE_URL};
pub use error::ScraperError;
pub use search::{Category, Rating, SearchOptions, SortColumn, SortDirection, Warning};
