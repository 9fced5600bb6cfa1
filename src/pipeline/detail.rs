//! Post pages: pre-rendered paths, single fetch and the fallback state

use crate::config::PrismicConfig;
use crate::content::schema::{PostData, POST_TYPE};
use crate::content::{transform_post, PostDetail};
use crate::prismic::{Client, CmsError, Document, Query};

/// Query for the posts pre-rendered at build time
pub fn paths_query(config: &PrismicConfig) -> Query {
    Query::of_type(POST_TYPE)
        .page_size(config.prebuild_count)
        .fetch(["posts.title"])
        .order_by("document.last_publication_date")
}

/// Uids of the posts rendered ahead of time; others render on first request
pub async fn static_paths(client: &Client, config: &PrismicConfig) -> Result<Vec<String>, CmsError> {
    if config.prebuild_count == 0 {
        return Ok(Vec::new());
    }

    let response = client.query(&paths_query(config)).await?;
    let uids: Vec<String> = response
        .results
        .iter()
        .filter_map(|doc| doc.get("uid").and_then(|v| v.as_str()))
        .filter(|uid| {
            let valid = is_valid_uid(uid);
            if !valid {
                tracing::warn!("Not pre-rendering post with uid {:?}", uid);
            }
            valid
        })
        .map(str::to_string)
        .take(config.prebuild_count)
        .collect();

    tracing::debug!("Pre-rendering {} posts", uids.len());
    Ok(uids)
}

/// Whether `uid` can name a post page
///
/// Uids become URL and file path segments, so only slug characters pass.
pub fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid.len() <= 128
        && uid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Fetch one post and build its view model
pub async fn fetch_post(
    client: &Client,
    uid: &str,
    preview_ref: Option<&str>,
    words_per_minute: usize,
) -> Result<PostDetail, CmsError> {
    let doc: Document<PostData> = client.get_by_uid(POST_TYPE, uid, preview_ref).await?;
    Ok(transform_post(&doc, words_per_minute))
}

/// Where a post rendered on first request stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    /// The fetch is still running
    Loading,
    Ready(Box<PostDetail>),
    NotFound,
    /// The fetch failed; carries the error message
    Failed(String),
}

impl DetailState {
    /// The state a finished fetch leads to
    pub fn from_result(result: Result<PostDetail, CmsError>) -> Self {
        match result {
            Ok(post) => DetailState::Ready(Box::new(post)),
            Err(e) if e.is_not_found() => DetailState::NotFound,
            Err(e) => DetailState::Failed(e.to_string()),
        }
    }

    /// Whether the state can still change
    pub fn is_pending(&self) -> bool {
        matches!(self, DetailState::Loading)
    }
}
