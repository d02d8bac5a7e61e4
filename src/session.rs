use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, instrument, warn};

use crate::api::StoreApi;
use crate::errors::StoreError;
use crate::events::{CartEvent, EventSender};
use crate::models::{Cart, LineItem};

/// Client-side cart session.
///
/// Owns the local mirror of the server-authoritative cart and keeps it
/// consistent across user actions. Every mutation is a synchronous
/// exchange: the session never assumes optimistic local state, it replaces
/// its cart with whatever the server returns. Conflict policy is
/// last-response-wins — the most recently resolved response overwrites the
/// whole mirror, and the next call corrects any drift.
///
/// Per pending operation the session moves `Idle -> Pending -> Idle`; on
/// the failure edge the mirror is preserved and the error surfaced. Two
/// local guards narrow the interleavings:
///
/// - checkout is exclusive with everything, itself included: while a
///   checkout call is outstanding no other operation may start, and a
///   duplicate submission is refused without reaching the server;
/// - mutations for the *same* product id are refused while one is in
///   flight, so a line's merge order is never ambiguous. Mutations for
///   different products may overlap freely.
///
/// Construction takes the API handle explicitly; there is no global
/// instance. Renderers call [`CartSession::subscribe`] and redraw from
/// [`CartSession::snapshot`] on each event.
///
/// # Examples
///
/// ```ignore
/// use storefront_client::{CartSession, HttpApi, StoreConfig};
///
/// let api = HttpApi::new(&StoreConfig::load()?)?;
/// let session = CartSession::new(Arc::new(api));
///
/// session.load().await?;
/// session.add_one(7).await?;
/// let order_id = session.checkout().await?;
/// ```
pub struct CartSession {
    api: Arc<dyn StoreApi>,
    cart: RwLock<Cart>,
    checkout_pending: AtomicBool,
    pending_products: DashMap<i64, ()>,
    events: EventSender,
}

impl CartSession {
    pub fn new(api: Arc<dyn StoreApi>) -> Self {
        Self::with_events(api, EventSender::default())
    }

    pub fn with_events(api: Arc<dyn StoreApi>, events: EventSender) -> Self {
        Self {
            api,
            cart: RwLock::new(Cart::default()),
            checkout_pending: AtomicBool::new(false),
            pending_products: DashMap::new(),
            events,
        }
    }

    /// Subscribes a renderer to state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Cloned copy of the mirror for rendering.
    pub async fn snapshot(&self) -> Cart {
        self.cart.read().await.clone()
    }

    /// Rehydrates the mirror from the server session.
    ///
    /// On success the mirror is replaced wholesale. On any failure the
    /// existing mirror is left untouched — stale but valid — and the error
    /// is returned for the caller to surface as a warning. Never retries.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Cart, StoreError> {
        self.ensure_no_checkout()?;
        match self.api.fetch_cart().await {
            Ok(envelope) if envelope.success => Ok(self.adopt(envelope.cart).await),
            Ok(envelope) => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| "cart load refused".to_string());
                warn!(%message, "server refused cart load, keeping stale mirror");
                Err(StoreError::Rejected(message))
            }
            Err(err) => {
                warn!(error = %err, "cart load failed, keeping stale mirror");
                Err(err)
            }
        }
    }

    /// Adds one unit of a product, the storefront's add-to-cart button.
    pub async fn add_one(&self, product_id: i64) -> Result<Cart, StoreError> {
        self.add(product_id, 1).await
    }

    /// Adds `quantity` units of a product.
    ///
    /// The server performs the merge (increment an existing line or insert
    /// a new one, clamped to available stock). A refusal is authoritative:
    /// the mirror is not locally adjusted to compensate.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: i64, quantity: u32) -> Result<Cart, StoreError> {
        self.send_delta(product_id, i64::from(quantity)).await
    }

    /// Applies a quantity delta to one line. `delta` is relative, never an
    /// absolute value.
    ///
    /// When the mirrored quantity plus `delta` is zero or less (including
    /// when the line is absent), this removes the line instead of sending
    /// a non-positive delta. The mirror is only mutated once the server
    /// responds; nothing is optimistically decremented.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: i64, delta: i64) -> Result<Cart, StoreError> {
        let current = self
            .cart
            .read()
            .await
            .line(product_id)
            .map(|line| i64::from(line.quantity))
            .unwrap_or(0);

        if current + delta <= 0 {
            return self.remove(product_id).await;
        }
        self.send_delta(product_id, delta).await
    }

    /// Removes a line unconditionally. The mirror is replaced from the
    /// server's response, never locally filtered, to avoid drift.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: i64) -> Result<Cart, StoreError> {
        self.ensure_no_checkout()?;
        let _guard = self.claim_product(product_id)?;

        let envelope = self.api.remove_item(product_id).await?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "item removal refused".to_string());
            return Err(StoreError::Rejected(message));
        }
        Ok(self.adopt(envelope.cart).await)
    }

    /// Places the order: one atomic server call that validates stock,
    /// creates the order and clears the server-side cart.
    ///
    /// A session-level flag suppresses duplicate submissions while one
    /// checkout is outstanding; the flag clears on every exit path,
    /// transport errors included. On success the mirror is emptied and the
    /// order id returned. On failure the mirror is untouched and the
    /// server's reason is carried verbatim.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<String, StoreError> {
        let _guard = CheckoutGuard::claim(&self.checkout_pending)?;

        let envelope = self.api.checkout().await?;
        if !envelope.success {
            return Err(StoreError::Rejected(envelope.message));
        }
        let order_id = envelope
            .order_id
            .ok_or_else(|| StoreError::Network("checkout response missing order id".to_string()))?;

        self.cart.write().await.clear();
        self.events.send_or_log(CartEvent::CheckedOut {
            order_id: order_id.clone(),
        });
        info!(%order_id, "checkout complete");
        Ok(order_id)
    }

    async fn send_delta(&self, product_id: i64, delta: i64) -> Result<Cart, StoreError> {
        self.ensure_no_checkout()?;
        let _guard = self.claim_product(product_id)?;

        let envelope = self.api.add_item(product_id, delta).await?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "item update refused".to_string());
            return Err(StoreError::Rejected(message));
        }
        Ok(self.adopt(envelope.cart).await)
    }

    /// Replaces the mirror with a server response and notifies renderers.
    async fn adopt(&self, items: Vec<LineItem>) -> Cart {
        let snapshot = {
            let mut cart = self.cart.write().await;
            cart.replace(items);
            cart.clone()
        };
        self.events.send_or_log(CartEvent::Updated);
        snapshot
    }

    fn ensure_no_checkout(&self) -> Result<(), StoreError> {
        if self.checkout_pending.load(Ordering::Acquire) {
            return Err(StoreError::CheckoutInProgress);
        }
        Ok(())
    }

    fn claim_product(&self, product_id: i64) -> Result<ProductGuard<'_>, StoreError> {
        ProductGuard::claim(&self.pending_products, product_id)
    }
}

/// Marks one product id as having a mutation in flight; cleared on drop.
struct ProductGuard<'a> {
    pending: &'a DashMap<i64, ()>,
    product_id: i64,
}

impl<'a> ProductGuard<'a> {
    fn claim(pending: &'a DashMap<i64, ()>, product_id: i64) -> Result<Self, StoreError> {
        use dashmap::mapref::entry::Entry;
        match pending.entry(product_id) {
            Entry::Occupied(_) => Err(StoreError::MutationInFlight(product_id)),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(Self {
                    pending,
                    product_id,
                })
            }
        }
    }
}

impl Drop for ProductGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.product_id);
    }
}

/// Clears the double-submit flag on every exit path.
struct CheckoutGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CheckoutGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Result<Self, StoreError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StoreError::CheckoutInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
