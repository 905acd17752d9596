//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`InquiryCommand`], [`InquiryQuery`]) are consumed by
//! inbound adapters. Driven ports ([`InquiryRepository`],
//! [`ProductCatalogue`], [`NotificationDispatcher`]) are implemented by
//! outbound adapters. Each driven port exposes a typed error enum so adapters
//! map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod inquiry_command;
mod inquiry_query;
mod inquiry_repository;
mod notification_dispatcher;
mod product_catalogue;

#[cfg(test)]
pub use inquiry_command::MockInquiryCommand;
pub use inquiry_command::{
    FixtureInquiryCommand, InquiryActionRequest, InquiryCommand, ReplyRequest,
    SubmitInquiryRequest,
};
#[cfg(test)]
pub use inquiry_query::MockInquiryQuery;
pub use inquiry_query::{
    FixtureInquiryQuery, GetInquiryRequest, InquiryQuery, InquirySummary, ListInquiriesRequest,
};
#[cfg(test)]
pub use inquiry_repository::MockInquiryRepository;
pub use inquiry_repository::{
    FixtureInquiryRepository, InquiryRepository, InquiryRepositoryError, InquiryScope,
};
#[cfg(test)]
pub use notification_dispatcher::MockNotificationDispatcher;
pub use notification_dispatcher::{
    FixtureNotificationDispatcher, Notification, NotificationDispatcher,
    NotificationDispatcherError, NotificationKind, NotificationPayload,
};
#[cfg(test)]
pub use product_catalogue::MockProductCatalogue;
pub use product_catalogue::{
    FixtureProductCatalogue, ProductCatalogue, ProductCatalogueError, ProductSummary,
};
