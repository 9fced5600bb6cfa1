//! Post view models

use serde::{Deserialize, Serialize};

/// A listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    /// Raw CMS timestamp; formatted when rendered
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A rendered content section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    /// Anchor id derived from the heading
    pub anchor: String,
    pub html_body: String,
}

/// Everything a post page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub sections: Vec<Section>,
    pub reading_time_minutes: usize,
}

/// One or more listing pages merged together
///
/// `next_page` is `None` once the last page has been merged in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostPagination {
    /// Append a later page: its results go after ours and its `next_page` wins
    #[must_use]
    pub fn append(mut self, next: PostPagination) -> PostPagination {
        self.results.extend(next.results);
        self.next_page = next.next_page;
        self
    }

    /// Whether another page can be loaded
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}
