//! Inquiry lifecycle backend.
//!
//! Buyers send inquiries to suppliers about catalogue products; suppliers
//! reply, soft-delete and recover them; administrators moderate. The crate
//! is laid out hexagonally: [`domain`] holds the aggregate, access guard and
//! service, [`inbound`] the actix-web adapter, and [`outbound`] the
//! repository, catalogue and notification adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
