//! Prismic content API access
//!
//! A thin async client over the repository's REST API v2: repository info
//! (for the master ref), document search, get-by-uid and following the
//! opaque `next_page` URLs of paginated results.

mod client;
mod document;
mod error;
mod query;

#[cfg(test)]
pub(crate) mod fake;

pub use client::Client;
pub use document::{Document, Ref, Repository, SearchResponse};
pub use error::CmsError;
pub use query::{Predicate, Query};
