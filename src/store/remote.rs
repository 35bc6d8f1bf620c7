use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, info};

use super::BoardStore;
use super::dto;
use crate::error::StoreError;
use crate::models::BoardState;

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub document: String,
    pub api_token: Option<String>,
}

/// Board kept as a single document in a hosted document database.
pub struct RemoteStore {
    client: Client,
    config: RemoteConfig,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Http(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn document_url(&self) -> String {
        format!(
            "{}/documents/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.document
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Http(format!("{} failed {}: {}", action, status, body)))
    }
}

#[async_trait]
impl BoardStore for RemoteStore {
    async fn load(&self) -> Result<Option<BoardState>, StoreError> {
        let url = self.document_url();
        let response = self.authorize(self.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("remote document {} does not exist yet", self.config.document);
            return Ok(None);
        }

        let body = Self::check(response, "load").await?.text().await?;
        let envelope: dto::DocumentEnvelope = serde_json::from_str(&body)?;
        Ok(Some(envelope.document))
    }

    async fn save(&self, state: &BoardState) -> Result<(), StoreError> {
        let url = self.document_url();
        let request_body = dto::PutDocumentRequest {
            document: state,
            updated_at: Utc::now(),
        };

        let response = self
            .authorize(self.client.put(&url))
            .json(&request_body)
            .send()
            .await?;
        Self::check(response, "save").await?;
        info!("saved board to remote document {}", self.config.document);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let url = self.document_url();
        let response = self.authorize(self.client.delete(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response, "clear").await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "remote"
    }
}
