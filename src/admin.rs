use tracing::{info, instrument};

use crate::api::{AdminEnvelope, HttpApi};
use crate::errors::StoreError;
use crate::models::{CatalogStats, Product, ProductInput};

/// Admin console client: product CRUD plus the dashboard counters.
///
/// All operations are full replacements of server state; after a
/// successful mutation the caller re-lists rather than patching a local
/// copy. A 401 surfaces as [`StoreError::AuthRequired`] — the redirect to
/// the login entry point is the embedding UI's side effect.
#[derive(Debug, Clone)]
pub struct AdminClient {
    api: HttpApi,
}

impl AdminClient {
    pub fn new(api: HttpApi) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.api.get_json("/admin/api/products").await
    }

    /// Probe used before showing the panel at all.
    pub async fn check_auth(&self) -> bool {
        self.list_products().await.is_ok()
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<(), StoreError> {
        input.validate()?;
        let envelope: AdminEnvelope = self.api.post_json("/admin/api/products/add", input).await?;
        Self::confirm(envelope, "product create refused")?;
        info!(name = %input.name, "product created");
        Ok(())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update_product(&self, id: i64, input: &ProductInput) -> Result<(), StoreError> {
        input.validate()?;
        let envelope: AdminEnvelope = self
            .api
            .put_json(&format!("/admin/api/products/update/{id}"), input)
            .await?;
        Self::confirm(envelope, "product update refused")?;
        info!(id, "product updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> Result<(), StoreError> {
        let envelope: AdminEnvelope = self
            .api
            .delete_json(&format!("/admin/api/products/delete/{id}"))
            .await?;
        Self::confirm(envelope, "product delete refused")?;
        info!(id, "product deleted");
        Ok(())
    }

    /// Dashboard counters for a product list, as shown above the table.
    pub fn stats(products: &[Product]) -> CatalogStats {
        CatalogStats::from_products(products)
    }

    fn confirm(envelope: AdminEnvelope, fallback: &str) -> Result<(), StoreError> {
        if envelope.success {
            Ok(())
        } else {
            Err(StoreError::Rejected(
                envelope.message.unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }
}
