//! Blog server: static pages, on-demand post rendering, load more and
//! preview routes

mod fallback;
mod preview;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::Generator;
use crate::pipeline;
use crate::prismic::{Client, CmsError};
use crate::Site;

pub use preview::PREVIEW_COOKIE;

/// Server state
pub struct ServerState {
    site: Site,
    client: Client,
    generator: Generator,
    /// Posts being rendered on demand, by uid
    fallback: RwLock<HashMap<String, fallback::Tracked>>,
    settled_ttl: Duration,
}

impl ServerState {
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            client: Client::new(&site.config.prismic)?,
            generator: Generator::new(site)?,
            fallback: RwLock::new(HashMap::new()),
            settled_ttl: fallback::SETTLED_TTL,
        })
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(load_more_handler))
        .route("/api/preview", get(preview::enter))
        .route("/api/exit-preview", get(preview::exit))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::new(site)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `GET /`: the generated listing, rendered live in preview or before the
/// first generation
async fn home_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let preview_ref = preview::preview_ref(&headers);

    if preview_ref.is_none() {
        let path = state.site.public_dir.join("index.html");
        if let Ok(html) = tokio::fs::read_to_string(&path).await {
            return Html(html).into_response();
        }
    }

    let listing =
        match pipeline::fetch_initial(&state.client, &state.site.config.prismic, preview_ref.as_deref())
            .await
        {
            Ok(listing) => listing,
            Err(e) => return cms_error_page(&state, &e, "/"),
        };

    match state
        .generator
        .render_listing(&listing, preview_ref.is_some())
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&state, &e.to_string(), "/"),
    }
}

/// `GET /post/{slug}`
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !pipeline::is_valid_uid(&slug) {
        return not_found_page(&state);
    }

    if let Some(reference) = preview::preview_ref(&headers) {
        let words_per_minute = state.site.config.reading.words_per_minute;
        let post =
            match pipeline::fetch_post(&state.client, &slug, Some(&reference), words_per_minute)
                .await
            {
                Ok(post) => post,
                Err(e) => return cms_error_page(&state, &e, &format!("/post/{}", slug)),
            };
        return match state.generator.render_post(&post, true) {
            Ok(html) => Html(html).into_response(),
            Err(e) => error_page(&state, &e.to_string(), &format!("/post/{}", slug)),
        };
    }

    let path = state.generator.post_output_path(&slug);
    if let Ok(html) = tokio::fs::read_to_string(&path).await {
        return Html(html).into_response();
    }

    fallback::serve(state, slug).await
}

#[derive(Debug, Deserialize)]
struct LoadMoreParams {
    next_page: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoadMoreResponse {
    next_page: Option<String>,
    html: String,
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// `GET /api/posts?next_page=<url>`: the next listing page as list items
async fn load_more_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<LoadMoreParams>,
) -> Response {
    let Some(url) = params.next_page.filter(|u| !u.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "missing next_page");
    };
    if !state.client.owns_url(&url) {
        tracing::warn!("Refusing to follow foreign next_page URL");
        return json_error(StatusCode::BAD_REQUEST, "next_page is not a repository URL");
    }

    let page = match pipeline::fetch_next(&state.client, &url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Loading more posts failed: {}", e);
            return json_error(StatusCode::BAD_GATEWAY, "could not load more posts");
        }
    };

    match state.generator.render_post_items(&page.results) {
        Ok(html) => Json(LoadMoreResponse {
            next_page: page.next_page,
            html,
        })
        .into_response(),
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// Serve files from the public directory, else the not-found page
async fn static_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.site.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found_page(&state),
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

fn not_found_page(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render not-found page: {}", e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// 502 page; the cause is logged, visitors only get a retry link
fn error_page(state: &ServerState, message: &str, retry_path: &str) -> Response {
    tracing::warn!("Serving error page for {}: {}", retry_path, message);
    match state.generator.render_error(retry_path) {
        Ok(html) => (StatusCode::BAD_GATEWAY, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

fn cms_error_page(state: &ServerState, error: &CmsError, retry_path: &str) -> Response {
    if error.is_not_found() {
        return not_found_page(state);
    }
    error_page(state, &error.to_string(), retry_path)
}
