//! Product catalogue adapters.
//!
//! `HttpProductCatalogue` asks the marketplace catalogue service over HTTP;
//! `InMemoryProductCatalogue` serves a fixed product table for local runs and
//! tests.

mod http;
mod memory;

pub use http::HttpProductCatalogue;
pub use memory::InMemoryProductCatalogue;
