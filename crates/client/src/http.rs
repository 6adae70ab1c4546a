//! reqwest-backed [`CartApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::ACCEPT};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    api::CartApi,
    errors::CartApiError,
    models::{AddItemRequest, Cart, UpdateQuantityRequest},
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`HttpCartApi`].
#[derive(Debug, Clone)]
pub struct HttpCartApiConfig {
    /// Server origin, e.g. `https://api.sportspro.test`.
    pub base_url: String,

    /// API token sent as `Authorization: Bearer <token>`.
    pub bearer_token: String,

    /// Transport-level timeout for each request.
    pub timeout: Duration,
}

impl HttpCartApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpCartApi {
    client: Client,
    base_url: String,
    bearer_token: String,
}

impl HttpCartApi {
    /// Build a client for the given server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: HttpCartApiConfig) -> Result<Self, CartApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            bearer_token: config.bearer_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.bearer_token)
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Cart, CartApiError> {
        let response = self.authorized(request).send().await?;

        read_cart(response).await
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn fetch_cart(&self) -> Result<Cart, CartApiError> {
        self.send(self.client.get(self.url("/cart"))).await
    }

    async fn add_item(&self, equipment_id: Uuid, quantity: u32) -> Result<Cart, CartApiError> {
        let body = AddItemRequest {
            equipment_id,
            quantity,
        };

        self.send(self.client.post(self.url("/cart/add")).json(&body))
            .await
    }

    async fn update_quantity(&self, item_id: Uuid, quantity: u32) -> Result<Cart, CartApiError> {
        let body = UpdateQuantityRequest { quantity };

        self.send(
            self.client
                .put(self.url(&format!("/cart/update/{item_id}")))
                .json(&body),
        )
        .await
    }

    async fn remove_item(&self, item_id: Uuid) -> Result<Cart, CartApiError> {
        self.send(
            self.client
                .delete(self.url(&format!("/cart/remove/{item_id}"))),
        )
        .await
    }

    async fn clear(&self) -> Result<Cart, CartApiError> {
        self.send(self.client.delete(self.url("/cart/clear"))).await
    }
}

async fn read_cart(response: Response) -> Result<Cart, CartApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();

    debug!(status = status.as_u16(), "cart request rejected");

    Err(status_error(status, &body))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    brief: String,
}

/// Map a non-success status to the error taxonomy, keeping the server's brief.
fn status_error(status: StatusCode, body: &str) -> CartApiError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.brief)
        .unwrap_or_else(|_not_json| body.trim().to_owned());

    match status {
        StatusCode::UNAUTHORIZED => CartApiError::Unauthenticated,
        StatusCode::NOT_FOUND => CartApiError::NotFound(message),
        StatusCode::BAD_REQUEST => CartApiError::InvalidArgument(message),
        StatusCode::CONFLICT => CartApiError::Unavailable(message),
        _ => CartApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
