use log::*;

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    spe_api::errors::ProductApiError,
    traits::ProductManagement,
};

/// Catalog management. The public storefront reads through here as well as the admin surface; the only
/// difference is which rows are visible (`available_products` filters out products with no stock).
pub struct ProductApi<B> {
    db: B,
}

impl<B> ProductApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ProductApi<B>
where B: ProductManagement
{
    /// Products visible to buyers (in stock), ordered by display priority (ascending) then name.
    pub async fn available_products(&self) -> Result<Vec<Product>, ProductApiError> {
        self.db.fetch_products(true).await
    }

    /// The full catalog, including out-of-stock products. Admin view.
    pub async fn all_products(&self) -> Result<Vec<Product>, ProductApiError> {
        self.db.fetch_products(false).await
    }

    pub async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError> {
        self.db.fetch_product_by_id(product_id).await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, ProductApiError> {
        validate_new_product(&product)?;
        let product = self.db.insert_product(product).await?;
        info!("🛍️ Product #{} \"{}\" created", product.id, product.name);
        Ok(product)
    }

    /// Partial update. Absent fields keep their current value. An update with no fields at all is rejected
    /// rather than silently returning the unchanged row.
    pub async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, ProductApiError> {
        if update.is_empty() {
            return Err(ProductApiError::NoFieldsToUpdate);
        }
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(ProductApiError::InvalidProduct("name must not be empty".to_string()));
            }
        }
        if let Some(price) = update.price {
            if price.is_negative() {
                return Err(ProductApiError::InvalidProduct("price must not be negative".to_string()));
            }
        }
        if let Some(quantity) = update.quantity {
            if quantity < 0 {
                return Err(ProductApiError::InvalidProduct("quantity must not be negative".to_string()));
            }
        }
        let product = self
            .db
            .update_product(product_id, update)
            .await?
            .ok_or(ProductApiError::ProductNotFound(product_id))?;
        info!("🛍️ Product #{} \"{}\" updated", product.id, product.name);
        Ok(product)
    }

    /// Hard delete. Existing orders keep the product name and price they were placed with, so deleting a
    /// product never corrupts order history.
    pub async fn delete_product(&self, product_id: i64) -> Result<(), ProductApiError> {
        let deleted = self.db.delete_product(product_id).await?;
        if !deleted {
            return Err(ProductApiError::ProductNotFound(product_id));
        }
        info!("🛍️ Product #{product_id} deleted");
        Ok(())
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn validate_new_product(product: &NewProduct) -> Result<(), ProductApiError> {
    if product.name.trim().is_empty() {
        return Err(ProductApiError::InvalidProduct("name must not be empty".to_string()));
    }
    if product.price.is_negative() {
        return Err(ProductApiError::InvalidProduct("price must not be negative".to_string()));
    }
    if product.quantity < 0 {
        return Err(ProductApiError::InvalidProduct("quantity must not be negative".to_string()));
    }
    Ok(())
}
