use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    spe_api::errors::ProductApiError,
};

/// The storage contract for the product catalog.
#[allow(async_fn_in_trait)]
pub trait ProductManagement: Clone {
    /// Fetch products ordered by display priority (ascending) then name. When `in_stock_only` is set, products
    /// with zero stock are excluded.
    async fn fetch_products(&self, in_stock_only: bool) -> Result<Vec<Product>, ProductApiError>;

    async fn fetch_product_by_id(&self, product_id: i64) -> Result<Option<Product>, ProductApiError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError>;

    /// Apply a partial update. Returns `None` if no such product exists.
    async fn update_product(&self, product_id: i64, update: ProductUpdate)
    -> Result<Option<Product>, ProductApiError>;

    /// Returns false if no such product existed.
    async fn delete_product(&self, product_id: i64) -> Result<bool, ProductApiError>;
}
