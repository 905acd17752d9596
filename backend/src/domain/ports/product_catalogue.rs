//! Port for the external product catalogue.
//!
//! The inquiry core only needs two facts about a product: which supplier
//! owns it, and its minimum order quantity (used as the default quantity
//! when a buyer omits one).

use async_trait::async_trait;

use crate::domain::{PrincipalId, ProductId, Quantity};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product catalogue adapters.
    pub enum ProductCatalogueError {
        /// The catalogue could not be reached.
        Unavailable { message: String } =>
            "product catalogue unavailable: {message}",
        /// The catalogue answered with something unusable.
        InvalidResponse { message: String } =>
            "product catalogue returned an invalid response: {message}",
    }
}

/// The catalogue facts an inquiry needs about a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    pub supplier_id: PrincipalId,
    pub min_order_quantity: Quantity,
}

/// Port for product lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalogue: Send + Sync {
    /// Look up a product; `None` when the catalogue does not know it.
    async fn lookup(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductSummary>, ProductCatalogueError>;
}

/// Fixture catalogue that knows no products.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProductCatalogue;

#[async_trait]
impl ProductCatalogue for FixtureProductCatalogue {
    async fn lookup(
        &self,
        _product_id: &ProductId,
    ) -> Result<Option<ProductSummary>, ProductCatalogueError> {
        Ok(None)
    }
}
