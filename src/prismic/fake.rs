//! In-process stand-in for a Prismic repository, used by tests

use axum::{
    extract::{Query as QueryParams, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::Client;
use crate::config::PrismicConfig;

pub const MASTER_REF: &str = "Ymaster";

/// A post document whose single section has `words` words in its body
pub fn post(uid: &str, title: &str, words: usize) -> Value {
    let body = vec!["palavra"; words].join(" ");
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2021-03-25T19:25:28+0000",
        "last_publication_date": "2021-03-26T10:00:00+0000",
        "data": {
            "title": title,
            "subtitle": format!("Subtitle of {}", title),
            "author": "Ada",
            "banner": {"url": format!("https://images.prismic.io/{}.png", uid)},
            "content": [
                {
                    "heading": "Intro",
                    "body": [{"type": "paragraph", "text": body, "spans": []}]
                }
            ]
        }
    })
}

/// A post as sent with its optional fields left empty
pub fn sparse_post(uid: &str, title: &str) -> Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": null,
        "last_publication_date": null,
        "data": {
            "title": title,
            "subtitle": null,
            "author": null,
            "banner": {},
            "content": [{"heading": null, "body": []}]
        }
    })
}

/// `n` posts with uids `post-1..=post-n`
pub fn posts(n: usize) -> Vec<Value> {
    (1..=n)
        .map(|i| post(&format!("post-{}", i), &format!("Post {}", i), 10))
        .collect()
}

#[derive(Default)]
struct FakeState {
    base_url: String,
    documents: Vec<Value>,
    hits: Mutex<HashMap<String, usize>>,
    last_ref: Mutex<Option<String>>,
    failing: AtomicBool,
}

/// A running fake repository bound to an ephemeral local port
pub struct FakeCms {
    state: Arc<FakeState>,
}

impl FakeCms {
    pub async fn start(documents: Vec<Value>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(FakeState {
            base_url,
            documents,
            ..FakeState::default()
        });

        let app = Router::new()
            .route("/api/v2", get(api_root))
            .route("/api/v2/documents/search", get(search))
            .fallback(broken)
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    pub fn base_url(&self) -> &str {
        &self.state.base_url
    }

    pub fn config(&self) -> PrismicConfig {
        PrismicConfig {
            api_endpoint: format!("{}/api/v2", self.base_url()),
            timeout_secs: 5,
            ..PrismicConfig::default()
        }
    }

    pub fn client(&self) -> Client {
        Client::new(&self.config()).unwrap()
    }

    /// Number of requests received on `path`
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// The `ref` of the most recent search
    pub fn last_ref(&self) -> Option<String> {
        self.state.last_ref.lock().unwrap().clone()
    }

    /// Make searches answer 500
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }
}

fn record(state: &FakeState, uri: &Uri) {
    *state
        .hits
        .lock()
        .unwrap()
        .entry(uri.path().to_string())
        .or_insert(0) += 1;
}

async fn api_root(State(state): State<Arc<FakeState>>, uri: Uri) -> Json<Value> {
    record(&state, &uri);
    Json(json!({
        "refs": [{"id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true}]
    }))
}

async fn search(
    State(state): State<Arc<FakeState>>,
    uri: Uri,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> Response {
    record(&state, &uri);
    *state.last_ref.lock().unwrap() = params.get("ref").cloned();

    if state.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let q = params.get("q").cloned().unwrap_or_default();
    let matching: Vec<&Value> = match uid_filter(&q) {
        Some(uid) => state
            .documents
            .iter()
            .filter(|d| d["uid"].as_str() == Some(uid.as_str()))
            .collect(),
        None => state.documents.iter().collect(),
    };

    let page_size: usize = params
        .get("pageSize")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);
    let page: usize = params
        .get("page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let total_pages = matching.len().div_ceil(page_size).max(1);

    let results: Vec<&Value> = matching
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    let next_page = (page < total_pages).then(|| {
        let mut url =
            Url::parse(&format!("{}/api/v2/documents/search", state.base_url)).unwrap();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                if key != "page" {
                    pairs.append_pair(key, value);
                }
            }
            pairs.append_pair("page", &(page + 1).to_string());
        }
        url.to_string()
    });

    Json(json!({
        "page": page,
        "results_per_page": page_size,
        "total_pages": total_pages,
        "next_page": next_page,
        "prev_page": null,
        "results": results,
    }))
    .into_response()
}

async fn broken(State(state): State<Arc<FakeState>>, uri: Uri) -> StatusCode {
    record(&state, &uri);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Extract the uid of a `[at(my.posts.uid,"...")]` predicate
fn uid_filter(q: &str) -> Option<String> {
    let start = q.find("my.posts.uid,\"")? + "my.posts.uid,\"".len();
    let end = q[start..].find('"')? + start;
    Some(q[start..end].to_string())
}
