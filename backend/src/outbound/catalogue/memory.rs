//! Fixed product table implementing `ProductCatalogue`.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ports::{ProductCatalogue, ProductCatalogueError, ProductSummary};
use crate::domain::ProductId;

/// Catalogue backed by an in-process map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductCatalogue {
    products: HashMap<ProductId, ProductSummary>,
}

impl InMemoryProductCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `product_id` with its owning supplier and minimum order.
    #[must_use]
    pub fn with_product(mut self, product_id: ProductId, summary: ProductSummary) -> Self {
        self.products.insert(product_id, summary);
        self
    }
}

#[async_trait]
impl ProductCatalogue for InMemoryProductCatalogue {
    async fn lookup(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductSummary>, ProductCatalogueError> {
        Ok(self.products.get(product_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quantity;
    use crate::test_support::principal_id;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn registered_products_are_found() {
        let summary = ProductSummary {
            supplier_id: principal_id("11"),
            min_order_quantity: Quantity::new(50).expect("quantity"),
        };
        let product = ProductId::new("P-1").expect("product id");
        let catalogue = InMemoryProductCatalogue::new().with_product(product.clone(), summary.clone());

        assert_eq!(catalogue.lookup(&product).await, Ok(Some(summary)));
        let unknown = ProductId::new("P-2").expect("product id");
        assert_eq!(catalogue.lookup(&unknown).await, Ok(None));
    }
}
