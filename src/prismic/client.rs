//! Async content API client

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{CmsError, Document, Query, Repository, SearchResponse};
use crate::config::PrismicConfig;

/// Client for a Prismic repository's REST API v2
pub struct Client {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: OnceCell<String>,
}

impl Client {
    /// Create a client for the configured repository
    pub fn new(config: &PrismicConfig) -> Result<Self, CmsError> {
        let endpoint = Url::parse(config.api_endpoint.trim_end_matches('/'))
            .map_err(|_| CmsError::Endpoint(config.api_endpoint.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| CmsError::Request {
                url: endpoint.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
            master_ref: OnceCell::new(),
        })
    }

    /// The ref of published content, fetched once per client
    pub async fn master_ref(&self) -> Result<String, CmsError> {
        self.master_ref
            .get_or_try_init(|| async {
                let mut url = self.endpoint.clone();
                self.append_token(&mut url);
                let repo: Repository = self.fetch_json(url).await?;
                let master = repo.master_ref().ok_or(CmsError::NoMasterRef)?;
                tracing::debug!("Using master ref {}", master.reference);
                Ok::<_, CmsError>(master.reference.clone())
            })
            .await
            .cloned()
    }

    /// Run a search query
    pub async fn query(&self, query: &Query) -> Result<SearchResponse, CmsError> {
        let reference = match &query.reference {
            Some(r) => r.clone(),
            None => self.master_ref().await?,
        };

        let mut url = self.search_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", &reference);
            for (key, value) in query.params() {
                pairs.append_pair(key, &value);
            }
        }
        self.append_token(&mut url);

        tracing::debug!("Querying {}", query.q());
        self.fetch_json(url).await
    }

    /// Fetch one document of `doc_type` by its uid
    pub async fn get_by_uid<D: DeserializeOwned>(
        &self,
        doc_type: &str,
        uid: &str,
        reference: Option<&str>,
    ) -> Result<Document<D>, CmsError> {
        let query = Query::of_type(doc_type)
            .at(&format!("my.{}.uid", doc_type), uid)
            .page_size(1)
            .with_ref(reference);
        let response = self.query(&query).await?;

        let not_found = || CmsError::NotFound {
            doc_type: doc_type.to_string(),
            uid: uid.to_string(),
        };
        let value = response.results.into_iter().next().ok_or_else(not_found)?;

        Document::<D>::deserialize(&value).map_err(|source| CmsError::Decode {
            url: format!("{}#{}", doc_type, uid),
            source,
        })
    }

    /// Follow an opaque `next_page` URL returned by a previous search
    pub async fn fetch_page(&self, url: &str) -> Result<SearchResponse, CmsError> {
        let parsed = Url::parse(url).map_err(|_| CmsError::Endpoint(url.to_string()))?;
        self.fetch_json(parsed).await
    }

    /// Whether `url` points at this client's repository
    pub fn owns_url(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|u| u.origin() == self.endpoint.origin())
            .unwrap_or(false)
    }

    fn search_url(&self) -> Result<Url, CmsError> {
        let raw = format!("{}/documents/search", self.endpoint.as_str().trim_end_matches('/'));
        Url::parse(&raw).map_err(|_| CmsError::Endpoint(raw))
    }

    fn append_token(&self, url: &mut Url) {
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        // Keep tokens out of errors and logs
        let display = url.as_str().split('?').next().unwrap_or_default().to_string();

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| CmsError::Request {
                url: display.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                url: display,
                status,
            });
        }

        let body = response.text().await.map_err(|source| CmsError::Request {
            url: display.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| CmsError::Decode {
            url: display,
            source,
        })
    }
}
