//! On-demand rendering of posts that were not pre-rendered
//!
//! The first request for an unknown uid starts one background fetch and
//! gets the loading page. A rendered post is written to disk and leaves the
//! registry, so later requests are served statically. A missing post
//! answers 404 and a failed fetch answers 502; those outcomes are kept for
//! `settled_ttl` at most and dropped once served, so a later request tries
//! again.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{error_page, not_found_page, ServerState};
use crate::pipeline::{self, DetailState};

/// Seconds between reloads of the loading page
pub const REFRESH_SECS: u64 = 1;

/// How long a 404 or 502 outcome waits to be picked up
pub const SETTLED_TTL: Duration = Duration::from_secs(60);

/// A registry entry and when it last changed
#[derive(Debug)]
pub struct Tracked {
    pub state: DetailState,
    since: Instant,
}

impl Tracked {
    fn new(state: DetailState) -> Self {
        Self {
            state,
            since: Instant::now(),
        }
    }
}

/// Drop settled outcomes older than `ttl`; running fetches stay
fn sweep(registry: &mut HashMap<String, Tracked>, ttl: Duration) {
    registry.retain(|_, entry| entry.state.is_pending() || entry.since.elapsed() < ttl);
}

/// Answer a request for a post that has no page on disk
pub async fn serve(state: Arc<ServerState>, uid: String) -> Response {
    let mut registry = state.fallback.write().await;
    sweep(&mut registry, state.settled_ttl);

    let pending = registry.get(&uid).map(|entry| entry.state.is_pending());
    match pending {
        None => {
            registry.insert(uid.clone(), Tracked::new(DetailState::Loading));
            drop(registry);
            tokio::spawn(render(state.clone(), uid));
            return loading_page(&state);
        }
        Some(true) => return loading_page(&state),
        Some(false) => {}
    }

    let settled = registry.remove(&uid).map(|entry| entry.state);
    drop(registry);

    match settled {
        Some(DetailState::NotFound) => not_found_page(&state),
        Some(DetailState::Failed(message)) => {
            error_page(&state, &message, &format!("/post/{}", uid))
        }
        _ => loading_page(&state),
    }
}

/// Fetch, render and write one post, then record the outcome
async fn render(state: Arc<ServerState>, uid: String) {
    let words_per_minute = state.site.config.reading.words_per_minute;
    let result = pipeline::fetch_post(&state.client, &uid, None, words_per_minute).await;

    let outcome = match DetailState::from_result(result) {
        DetailState::Ready(post) => match state.generator.write_post(&post) {
            Ok(path) => {
                tracing::info!("Rendered {} on demand: {:?}", uid, path);
                // Served from disk from now on
                state.fallback.write().await.remove(&uid);
                return;
            }
            Err(e) => DetailState::Failed(e.to_string()),
        },
        other => other,
    };

    match &outcome {
        DetailState::NotFound => tracing::info!("No post with uid {}", uid),
        DetailState::Failed(message) => tracing::warn!("Rendering {} failed: {}", uid, message),
        _ => {}
    }

    state
        .fallback
        .write()
        .await
        .insert(uid, Tracked::new(outcome));
}

fn loading_page(state: &ServerState) -> Response {
    match state.generator.render_loading(REFRESH_SECS) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render loading page: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
