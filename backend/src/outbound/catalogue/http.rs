//! Reqwest-backed product catalogue adapter.
//!
//! Owns transport details only: URL building, the request timeout, status
//! mapping, and JSON decoding into [`ProductSummary`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::ports::{ProductCatalogue, ProductCatalogueError, ProductSummary};
use crate::domain::{PrincipalId, ProductId, Quantity};

/// Wire shape of `GET {base}/products/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDto {
    supplier_id: String,
    min_order_quantity: i64,
}

impl ProductDto {
    fn into_summary(self) -> Result<ProductSummary, ProductCatalogueError> {
        let supplier_id = PrincipalId::new(self.supplier_id).map_err(|err| {
            ProductCatalogueError::invalid_response(format!("supplierId: {err}"))
        })?;
        let min_order_quantity = Quantity::new(self.min_order_quantity).map_err(|err| {
            ProductCatalogueError::invalid_response(format!("minOrderQuantity: {err}"))
        })?;
        Ok(ProductSummary {
            supplier_id,
            min_order_quantity,
        })
    }
}

/// Catalogue adapter performing one GET per lookup against `base`.
pub struct HttpProductCatalogue {
    client: Client,
    base: Url,
}

impl HttpProductCatalogue {
    /// Build an adapter whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn product_url(&self, product_id: &ProductId) -> Result<Url, ProductCatalogueError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ProductCatalogueError::unavailable(format!(
                    "catalogue base url {} cannot carry a path",
                    self.base
                ))
            })?
            .pop_if_empty()
            .extend(["products", product_id.as_ref()]);
        Ok(url)
    }
}

#[async_trait]
impl ProductCatalogue for HttpProductCatalogue {
    async fn lookup(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductSummary>, ProductCatalogueError> {
        let response = self
            .client
            .get(self.product_url(product_id)?)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        parse_product(body.as_ref()).map(Some)
    }
}

fn parse_product(body: &[u8]) -> Result<ProductSummary, ProductCatalogueError> {
    let decoded: ProductDto = serde_json::from_slice(body).map_err(|error| {
        ProductCatalogueError::invalid_response(format!("invalid product payload: {error}"))
    })?;
    decoded.into_summary()
}

fn map_transport_error(error: reqwest::Error) -> ProductCatalogueError {
    if error.is_timeout() {
        ProductCatalogueError::unavailable(format!("request timed out: {error}"))
    } else {
        ProductCatalogueError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> ProductCatalogueError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ProductCatalogueError::unavailable(format!("status {}", status.as_u16()))
    } else {
        ProductCatalogueError::invalid_response(format!("status {}", status.as_u16()))
    }
}
