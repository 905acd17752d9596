//! Inquiry persistence adapters.
//!
//! `DieselInquiryRepository` stores inquiries in PostgreSQL through
//! `diesel-async` and a `bb8` pool. `InMemoryInquiryRepository` keeps them in
//! process for local runs and tests.
//!
//! Diesel row structs (`models.rs`) and the schema (`schema.rs`) stay private
//! to this module; the domain only ever sees [`crate::domain::Inquiry`].
//!
//! # Example
//!
//! ```ignore
//! use inquiry_backend::outbound::persistence::{DbPool, DieselInquiryRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/inquiries")).await?;
//! let repo = DieselInquiryRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_inquiry_repository;
mod memory_inquiry_repository;
mod models;
mod pool;
mod schema;

pub use diesel_inquiry_repository::DieselInquiryRepository;
pub use memory_inquiry_repository::InMemoryInquiryRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
