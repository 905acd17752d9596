//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL and in-memory inquiry repositories
//! - **catalogue**: product lookups over HTTP or from a fixed table
//! - **notifications**: log-line and webhook notification delivery
//!
//! Adapters translate between domain types and transport representations.
//! They contain no business logic.

pub mod catalogue;
pub mod notifications;
pub mod persistence;
