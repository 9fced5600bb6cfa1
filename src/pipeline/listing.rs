//! Home page listing: first page at build time, further pages on demand

use crate::config::PrismicConfig;
use crate::content::schema::{PostSummaryData, POST_TYPE, SUMMARY_FIELDS};
use crate::content::{summarize, PostPagination};
use crate::prismic::{Client, CmsError, Query, SearchResponse};

/// Query for the first listing page, optionally against a preview ref
pub fn listing_query(config: &PrismicConfig, preview_ref: Option<&str>) -> Query {
    Query::of_type(POST_TYPE)
        .page_size(config.page_size)
        .fetch(SUMMARY_FIELDS)
        .with_ref(preview_ref)
}

/// Fetch the first listing page
pub async fn fetch_initial(
    client: &Client,
    config: &PrismicConfig,
    preview_ref: Option<&str>,
) -> Result<PostPagination, CmsError> {
    let response = client.query(&listing_query(config, preview_ref)).await?;
    let page = to_pagination(&response);
    tracing::info!(
        "Fetched {} posts (more: {})",
        page.results.len(),
        page.has_more()
    );
    Ok(page)
}

/// Fetch the page behind a `next_page` URL
pub async fn fetch_next(client: &Client, url: &str) -> Result<PostPagination, CmsError> {
    let response = client.fetch_page(url).await?;
    Ok(to_pagination(&response))
}

/// Fetch the next page and return `current` with it appended
///
/// Without a `next_page` nothing is requested and `current` comes back
/// unchanged. On failure `current` is untouched.
pub async fn load_more(
    client: &Client,
    current: &PostPagination,
) -> Result<PostPagination, CmsError> {
    let Some(url) = current.next_page.as_deref() else {
        return Ok(current.clone());
    };
    let next = fetch_next(client, url).await?;
    Ok(current.clone().append(next))
}

/// Walk every listing page
pub async fn fetch_all(
    client: &Client,
    config: &PrismicConfig,
) -> Result<PostPagination, CmsError> {
    let mut listing = fetch_initial(client, config, None).await?;
    while listing.has_more() {
        listing = load_more(client, &listing).await?;
    }
    Ok(listing)
}

fn to_pagination(response: &SearchResponse) -> PostPagination {
    PostPagination {
        next_page: response.next_page.clone(),
        results: response
            .decode_results::<PostSummaryData>()
            .into_iter()
            .filter_map(summarize)
            .collect(),
    }
}
