//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` so they depend only
//! on the driving ports and the identity resolver, and stay testable without
//! I/O.

use std::sync::Arc;

use crate::domain::IdentityResolver;
use crate::domain::ports::{
    FixtureInquiryCommand, FixtureInquiryQuery, InquiryCommand, InquiryQuery,
};

/// Dependency bundle for inquiry handlers.
#[derive(Clone)]
pub struct HttpState {
    pub inquiries: Arc<dyn InquiryCommand>,
    pub inquiries_query: Arc<dyn InquiryQuery>,
    pub identity: IdentityResolver,
}

impl HttpState {
    /// Construct state from the command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use inquiry_backend::domain::IdentityResolver;
    /// use inquiry_backend::domain::ports::{FixtureInquiryCommand, FixtureInquiryQuery};
    /// use inquiry_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureInquiryCommand),
    ///     Arc::new(FixtureInquiryQuery),
    ///     IdentityResolver::default(),
    /// );
    /// assert!(state.identity.super_admin_id().is_none());
    /// ```
    pub fn new(
        inquiries: Arc<dyn InquiryCommand>,
        inquiries_query: Arc<dyn InquiryQuery>,
        identity: IdentityResolver,
    ) -> Self {
        Self {
            inquiries,
            inquiries_query,
            identity,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureInquiryCommand),
            Arc::new(FixtureInquiryQuery),
            IdentityResolver::default(),
        )
    }
}
