//! Wire contract for the storefront API.
//!
//! Every cart endpoint answers with a [`CartEnvelope`]: a `success` flag,
//! the full authoritative cart, and an optional message explaining a
//! refusal. The client never patches a cart locally; it either adopts the
//! envelope's cart wholesale or keeps what it had.

pub mod http;

pub use http::HttpApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::LineItem;

/// Response body of `GET /api/cart`, `POST /api/cart/add` and
/// `POST /api/cart/remove`.
#[derive(Debug, Clone, Deserialize)]
pub struct CartEnvelope {
    pub success: bool,
    #[serde(default)]
    pub cart: Vec<LineItem>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body of `POST /api/checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Response body of the admin mutation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    /// Delta, not an absolute value. Negative deltas decrement; the server
    /// performs the merge and clamps against available stock.
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveItemRequest {
    pub product_id: i64,
}

/// The HTTP surface the cart session depends on.
///
/// Split out as a trait so the session's state machine can be exercised
/// against a scripted double without a server.
#[async_trait]
pub trait StoreApi: Send + Sync {
    async fn fetch_cart(&self) -> Result<CartEnvelope, StoreError>;

    /// Sends a quantity delta for one product. The server owns the merge:
    /// increment an existing line or insert a new one, clamped to stock.
    async fn add_item(&self, product_id: i64, quantity: i64) -> Result<CartEnvelope, StoreError>;

    async fn remove_item(&self, product_id: i64) -> Result<CartEnvelope, StoreError>;

    /// Single atomic call: validate stock, create the order, clear the
    /// server-side cart.
    async fn checkout(&self) -> Result<CheckoutEnvelope, StoreError>;
}
