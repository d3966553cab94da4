//! HTTP client for the remote question store.
//!
//! Endpoints (relative to the configured base URL):
//! - `GET    companies/{company}/{bucket}/questions` with page/sort/filter query parameters
//! - `PATCH  questions/{id}` with a record patch body
//! - `PATCH  questions` with `{ ids, ...patch }`
//! - `GET    stats`

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::types::{Fragment, ProgressStats, QuestionId, RecordPatch};

use super::{PageRequest, PageResult, RemoteStore};

#[derive(Debug, Serialize)]
struct BatchBody<'a> {
    ids: &'a [QuestionId],
    #[serde(flatten)]
    patch: &'a RecordPatch,
}

pub struct HttpStore {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpStore {
    pub fn new(base_url: Url, token: Option<SecretString>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url,
            token,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(TrackerError::Config(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }
        Ok(Self::new(base_url, config.token(), config.remote_timeout()))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TrackerError::Config("base_url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL for a page read, with filters and the delegated sort as query parameters
    pub fn page_url(&self, request: &PageRequest) -> Result<Url> {
        let mut url = self.endpoint(&[
            "companies",
            &request.view_key.company,
            &request.view_key.bucket,
            "questions",
        ])?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &request.page.to_string())
                .append_pair("pageSize", &request.page_size.to_string());
            if let Some((field, order)) = request.sort {
                pairs
                    .append_pair("sort", field.wire_name())
                    .append_pair("order", &order.to_string());
            }
            if let Some(text) = &request.search_text {
                pairs.append_pair("search", text);
            }
            if let Some(tag) = &request.tag_filter {
                pairs.append_pair("tag", tag);
            }
            if request.unsolved_only {
                pairs.append_pair("unsolved", "true");
            }
        }

        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn with_timeout<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(TrackerError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.authorize(builder).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    };
    Err(TrackerError::Api(message))
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn read_page(&self, request: &PageRequest) -> Result<PageResult> {
        let url = self.page_url(request)?;
        tracing::debug!(%url, "reading question page");
        self.with_timeout(self.send_json(self.client.get(url)))
            .await
    }

    async fn write_record(&self, id: QuestionId, patch: &RecordPatch) -> Result<Vec<Fragment>> {
        let url = self.endpoint(&["questions", &id.to_string()])?;
        self.with_timeout(self.send_json(self.client.patch(url).json(patch)))
            .await
    }

    async fn write_batch(
        &self,
        ids: &[QuestionId],
        patch: &RecordPatch,
    ) -> Result<Vec<Fragment>> {
        let url = self.endpoint(&["questions"])?;
        let body = BatchBody { ids, patch };
        self.with_timeout(self.send_json(self.client.patch(url).json(&body)))
            .await
    }

    async fn read_stats(&self) -> Result<ProgressStats> {
        let url = self.endpoint(&["stats"])?;
        self.with_timeout(self.send_json(self.client.get(url))).await
    }
}
