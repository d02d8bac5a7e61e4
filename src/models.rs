use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// One product's quantity entry within a cart, exactly as the server
/// returns it. `price` is a display-only snapshot of the product price at
/// insertion time; the authoritative price is computed server-side at
/// checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product id, unique across the cart's lines.
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Always >= 1; a line that would reach zero is removed server-side.
    pub quantity: u32,
    /// Emoji glyph standing in for product imagery.
    pub image: String,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Local mirror of the server-authoritative cart.
///
/// Line order is the server's insertion order and product ids are unique
/// across lines (quantity changes happen in place, never as duplicate
/// rows). Totals are derived on demand, never stored. The mirror persists
/// nothing itself: the server session is the durable copy and the mirror
/// is rehydrated from it on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn line(&self, product_id: i64) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total unit count across all lines.
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of quantity x unit price across all lines.
    pub fn total_value(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub(crate) fn replace(&mut self, items: Vec<LineItem>) {
        self.items = items;
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

/// Catalog product, read-only from the storefront side. Mutations go
/// through the admin CRUD operations as full replacements of server state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    pub category: String,
    pub image: String,
    pub description: String,
}

/// Create/update payload for the admin product endpoints. The server
/// treats updates as full replacements, so every field is sent every time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    pub category: String,
    pub image: String,
    pub description: String,
}

impl ProductInput {
    /// Client-side checks matching what the admin form enforces before
    /// submitting. The server revalidates regardless.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Invalid("product name is required".into()));
        }
        if self.price <= Decimal::ZERO {
            return Err(StoreError::Invalid("price must be positive".into()));
        }
        if self.category.trim().is_empty() {
            return Err(StoreError::Invalid("category is required".into()));
        }
        Ok(())
    }
}

/// Dashboard counters derived from the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_products: usize,
    /// Units on hand across all products.
    pub total_stock: u32,
    /// Inventory value: sum of price x stock.
    pub total_value: Decimal,
    /// Products with 0 < stock <= LOW_STOCK_THRESHOLD.
    pub low_stock: usize,
}

impl CatalogStats {
    pub const LOW_STOCK_THRESHOLD: u32 = 5;

    pub fn from_products(products: &[Product]) -> Self {
        Self {
            total_products: products.len(),
            total_stock: products.iter().map(|p| p.stock).sum(),
            total_value: products
                .iter()
                .map(|p| p.price * Decimal::from(p.stock))
                .sum(),
            low_stock: products
                .iter()
                .filter(|p| p.stock > 0 && p.stock <= Self::LOW_STOCK_THRESHOLD)
                .count(),
        }
    }
}
