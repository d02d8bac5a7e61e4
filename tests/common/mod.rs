//! In-process mock storefront server for the integration tests.
//!
//! Plays the server collaborator's part of the HTTP contract: a single
//! session cart, product storage with stock clamping on add, and toggles
//! for the failure paths the client must handle.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use storefront_client::{LineItem, Product};

#[derive(Default)]
pub struct StoreState {
    pub cart: Mutex<Vec<LineItem>>,
    pub products: Mutex<Vec<Product>>,
    pub checkout_hits: AtomicUsize,
    pub checkout_delay_ms: AtomicUsize,
    pub fail_checkout: AtomicBool,
    pub admin_authorized: AtomicBool,
}

pub struct MockStorefront {
    pub addr: SocketAddr,
    pub state: Arc<StoreState>,
    handle: JoinHandle<()>,
    shutdown: Arc<tokio::sync::Notify>,
}

/// Opt-in test logging: `RUST_LOG=debug cargo test -- --nocapture`.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

impl MockStorefront {
    pub async fn spawn() -> Self {
        init_tracing();
        let state = Arc::new(StoreState {
            admin_authorized: AtomicBool::new(true),
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/cart", get(get_cart))
            .route("/api/cart/add", post(add_to_cart))
            .route("/api/cart/remove", post(remove_from_cart))
            .route("/api/checkout", post(checkout))
            .route("/admin/api/products", get(list_products))
            .route("/admin/api/products/add", post(add_product))
            .route("/admin/api/products/update/:id", put(update_product))
            .route("/admin/api/products/delete/:id", delete(delete_product))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let shutdown = Arc::new(tokio::sync::Notify::new());
        let signal = shutdown.clone();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await
                .expect("serve test app");
        });

        Self {
            addr,
            state,
            handle,
            shutdown,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Kills the server so the next request fails at the transport layer.
    /// Graceful shutdown (rather than aborting the accept loop) also closes
    /// idle keep-alive connections the client may have pooled.
    pub fn shut_down(&self) {
        self.shutdown.notify_one();
    }

    pub async fn seed_product(&self, id: i64, name: &str, price: Decimal, stock: u32) {
        self.state.products.lock().await.push(Product {
            id,
            name: name.to_string(),
            price,
            stock,
            category: "Audio".to_string(),
            image: "\u{1F3A7}".to_string(),
            description: String::new(),
        });
    }

    pub async fn cart_snapshot(&self) -> Vec<LineItem> {
        self.state.cart.lock().await.clone()
    }

    pub fn checkout_hits(&self) -> usize {
        self.state.checkout_hits.load(Ordering::SeqCst)
    }

    pub fn set_checkout_delay(&self, ms: usize) {
        self.state.checkout_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn set_fail_checkout(&self, fail: bool) {
        self.state.fail_checkout.store(fail, Ordering::SeqCst);
    }

    pub fn set_admin_authorized(&self, authorized: bool) {
        self.state
            .admin_authorized
            .store(authorized, Ordering::SeqCst);
    }
}

impl Drop for MockStorefront {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_cart(State(state): State<Arc<StoreState>>) -> Json<Value> {
    let cart = state.cart.lock().await.clone();
    Json(json!({ "success": true, "cart": cart }))
}

async fn add_to_cart(
    State(state): State<Arc<StoreState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let product_id = body["product_id"].as_i64().unwrap_or(0);
    let quantity = body["quantity"].as_i64().unwrap_or(1);

    let product = state
        .products
        .lock()
        .await
        .iter()
        .find(|p| p.id == product_id)
        .cloned();

    let mut cart = state.cart.lock().await;
    let Some(product) = product else {
        return Json(json!({
            "success": false,
            "cart": cart.clone(),
            "message": "Product not found"
        }));
    };

    let current = cart
        .iter()
        .find(|line| line.id == product_id)
        .map(|line| i64::from(line.quantity))
        .unwrap_or(0);
    let merged = current + quantity;

    if merged > i64::from(product.stock) {
        return Json(json!({
            "success": false,
            "cart": cart.clone(),
            "message": format!("Only {} left in stock", product.stock)
        }));
    }

    if merged <= 0 {
        cart.retain(|line| line.id != product_id);
    } else if current == 0 {
        cart.push(LineItem {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: merged as u32,
            image: product.image.clone(),
        });
    } else if let Some(line) = cart.iter_mut().find(|line| line.id == product_id) {
        line.quantity = merged as u32;
    }

    Json(json!({ "success": true, "cart": cart.clone() }))
}

async fn remove_from_cart(
    State(state): State<Arc<StoreState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let product_id = body["product_id"].as_i64().unwrap_or(0);
    let mut cart = state.cart.lock().await;
    cart.retain(|line| line.id != product_id);
    Json(json!({ "success": true, "cart": cart.clone() }))
}

async fn checkout(State(state): State<Arc<StoreState>>) -> Json<Value> {
    let hit = state.checkout_hits.fetch_add(1, Ordering::SeqCst) + 1;

    let delay = state.checkout_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;
    }

    if state.fail_checkout.load(Ordering::SeqCst) {
        return Json(json!({
            "success": false,
            "message": "Stock changed while you were shopping"
        }));
    }

    let mut cart = state.cart.lock().await;
    if cart.is_empty() {
        return Json(json!({ "success": false, "message": "Your cart is empty" }));
    }
    cart.clear();

    Json(json!({
        "success": true,
        "message": "Order placed",
        "order_id": format!("ORD-{hit:06}")
    }))
}

async fn list_products(State(state): State<Arc<StoreState>>) -> Response {
    if !state.admin_authorized.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.products.lock().await.clone()).into_response()
}

async fn add_product(State(state): State<Arc<StoreState>>, Json(body): Json<Value>) -> Response {
    if !state.admin_authorized.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut products = state.products.lock().await;
    let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
    match parse_product(id, &body) {
        Some(product) => {
            products.push(product);
            Json(json!({ "success": true, "message": "Product added" })).into_response()
        }
        None => Json(json!({ "success": false, "message": "Invalid product data" })).into_response(),
    }
}

async fn update_product(
    State(state): State<Arc<StoreState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !state.admin_authorized.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut products = state.products.lock().await;
    let Some(slot) = products.iter_mut().find(|p| p.id == id) else {
        return Json(json!({ "success": false, "message": "Product not found" })).into_response();
    };
    match parse_product(id, &body) {
        Some(product) => {
            *slot = product;
            Json(json!({ "success": true, "message": "Product updated" })).into_response()
        }
        None => Json(json!({ "success": false, "message": "Invalid product data" })).into_response(),
    }
}

async fn delete_product(State(state): State<Arc<StoreState>>, Path(id): Path<i64>) -> Response {
    if !state.admin_authorized.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut products = state.products.lock().await;
    let before = products.len();
    products.retain(|p| p.id != id);
    if products.len() == before {
        return Json(json!({ "success": false, "message": "Product not found" })).into_response();
    }
    Json(json!({ "success": true, "message": "Product deleted" })).into_response()
}

fn parse_product(id: i64, body: &Value) -> Option<Product> {
    Some(Product {
        id,
        name: body["name"].as_str()?.to_string(),
        price: Decimal::try_from(body["price"].as_f64()?).ok()?,
        stock: u32::try_from(body["stock"].as_u64()?).ok()?,
        category: body["category"].as_str()?.to_string(),
        image: body["image"].as_str().unwrap_or("\u{1F4E6}").to_string(),
        description: body["description"].as_str().unwrap_or("").to_string(),
    })
}
