use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use distributori_common::{
    ApiError, ApiMessage, CreateAck, DistributorRecord, NewDistributor, PriceUpdate, SearchReply,
};

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};

/// The distributor REST API as the client consumes it.
#[async_trait]
pub trait DistributorApi: Send + Sync {
    /// `GET /api/distributori`
    async fn list_all(&self) -> Result<Vec<DistributorRecord>>;

    /// `GET /api/distributori/{id}`, `Ok(None)` on 404
    async fn get_by_id(&self, id: &str) -> Result<Option<DistributorRecord>>;

    /// `GET /api/search?q={text}`. An `{error}` body becomes
    /// [`ClientError::Remote`] whatever the status code.
    async fn search_city(&self, text: &str) -> Result<Vec<DistributorRecord>>;

    /// `POST /api/distributori`, successful only on `201 Created`
    async fn create(&self, distributor: &NewDistributor) -> Result<CreateAck>;

    /// `PUT /api/provincia/prezzi`
    async fn update_province_prices(&self, update: &PriceUpdate) -> Result<ApiMessage>;
}

/// reqwest-backed [`DistributorApi`].
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL {} cannot carry a path", config.base_url);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        tracing::info!("Using distributor API at {}", base_url);

        Ok(Self { client, base_url })
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::usage(format!("Invalid API base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read(response: reqwest::Response) -> Result<(StatusCode, String)> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Response {} ({} bytes)", status, body.len());
        Ok((status, body))
    }
}

/// Turn a failed response into the server's own message when it sent one.
fn remote_error(status: StatusCode, body: String) -> ClientError {
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => ClientError::Remote(api_error.error),
        Err(_) => ClientError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl DistributorApi for HttpApi {
    async fn list_all(&self) -> Result<Vec<DistributorRecord>> {
        let url = self.endpoint(&["api", "distributori"])?;
        let (status, body) = Self::read(self.client.get(url).send().await?).await?;

        if !status.is_success() {
            return Err(remote_error(status, body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<DistributorRecord>> {
        let url = self.endpoint(&["api", "distributori", id])?;
        let (status, body) = Self::read(self.client.get(url).send().await?).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(remote_error(status, body));
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn search_city(&self, text: &str) -> Result<Vec<DistributorRecord>> {
        let mut url = self.endpoint(&["api", "search"])?;
        url.query_pairs_mut().append_pair("q", text);
        let (status, body) = Self::read(self.client.get(url).send().await?).await?;

        match serde_json::from_str::<SearchReply>(&body) {
            Ok(SearchReply::Error(api_error)) => Err(ClientError::Remote(api_error.error)),
            Ok(SearchReply::Matches(records)) if status.is_success() => Ok(records),
            Ok(SearchReply::Matches(_)) => Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            }),
            Err(e) if status.is_success() => Err(ClientError::Decode(e)),
            Err(_) => Err(remote_error(status, body)),
        }
    }

    async fn create(&self, distributor: &NewDistributor) -> Result<CreateAck> {
        let url = self.endpoint(&["api", "distributori"])?;
        let response = self.client.post(url).json(distributor).send().await?;
        let (status, body) = Self::read(response).await?;

        if status != StatusCode::CREATED {
            return Err(remote_error(status, body));
        }
        // The record exists once the server says 201; the body is informational.
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unrecognized create acknowledgement: {}", e);
            CreateAck::default()
        }))
    }

    async fn update_province_prices(&self, update: &PriceUpdate) -> Result<ApiMessage> {
        let url = self.endpoint(&["api", "provincia", "prezzi"])?;
        let response = self.client.put(url).json(update).send().await?;
        let (status, body) = Self::read(response).await?;

        if !status.is_success() {
            return Err(remote_error(status, body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}
