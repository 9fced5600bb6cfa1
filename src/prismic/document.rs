//! Response shapes of the content API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Repository information returned by the API root
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub refs: Vec<Ref>,
}

impl Repository {
    pub fn master_ref(&self) -> Option<&Ref> {
        self.refs.iter().find(|r| r.is_master_ref)
    }
}

/// A content release; the master ref is the published content
#[derive(Debug, Clone, Deserialize)]
pub struct Ref {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of search results
///
/// Results are kept as raw JSON so that each document can be decoded on
/// its own with [`SearchResponse::decode_results`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<serde_json::Value>,
}

impl SearchResponse {
    /// Decode every result as a `Document<D>`, skipping the ones that do not fit
    pub fn decode_results<D: DeserializeOwned>(&self) -> Vec<Document<D>> {
        self.results
            .iter()
            .filter_map(|value| match Document::<D>::deserialize(value) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    let id = value.get("id").and_then(|v| v.as_str()).unwrap_or("?");
                    tracing::warn!("Skipping document {}: {}", id, e);
                    None
                }
            })
            .collect()
    }
}

/// A CMS document with custom-type data `D`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<D> {
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    pub data: D,
}
