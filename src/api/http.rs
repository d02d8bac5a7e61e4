use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{AddItemRequest, CartEnvelope, CheckoutEnvelope, RemoveItemRequest, StoreApi};
use crate::config::StoreConfig;
use crate::errors::StoreError;

/// reqwest-backed transport.
///
/// The cookie store plays the browser's part: the server keys the cart on
/// an opaque session cookie it sets on first contact, so all requests from
/// one `HttpApi` share one server-side cart.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(config.cookie_store);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        debug!(path, "GET");
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        debug!(path, "POST");
        let response = self.client.post(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "PUT");
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, StoreError> {
        debug!(path, "DELETE");
        let response = self.client.delete(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(StoreError::AuthRequired);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Network(format!("undecodable response: {e}")))
    }
}

#[async_trait]
impl StoreApi for HttpApi {
    async fn fetch_cart(&self) -> Result<CartEnvelope, StoreError> {
        self.get_json("/api/cart").await
    }

    async fn add_item(&self, product_id: i64, quantity: i64) -> Result<CartEnvelope, StoreError> {
        self.post_json(
            "/api/cart/add",
            &AddItemRequest {
                product_id,
                quantity,
            },
        )
        .await
    }

    async fn remove_item(&self, product_id: i64) -> Result<CartEnvelope, StoreError> {
        self.post_json("/api/cart/remove", &RemoveItemRequest { product_id })
            .await
    }

    async fn checkout(&self) -> Result<CheckoutEnvelope, StoreError> {
        self.post_empty("/api/checkout").await
    }
}
