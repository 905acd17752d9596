//! HTTP inbound adapter exposing the inquiry REST endpoints.

pub mod error;
pub mod health;
pub mod inquiries;
pub mod inquiries_dto;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;
