//! Builders selecting outbound adapters and assembling the HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use inquiry_backend::domain::ports::{InquiryRepository, NotificationDispatcher, ProductCatalogue};
use inquiry_backend::domain::{IdentityResolver, InquiryService, NotifyHook, PostCommitHooks};
use inquiry_backend::inbound::http::state::HttpState;
use inquiry_backend::outbound::catalogue::{HttpProductCatalogue, InMemoryProductCatalogue};
use inquiry_backend::outbound::notifications::{
    TracingNotificationDispatcher, WebhookNotificationDispatcher,
};
use inquiry_backend::outbound::persistence::{
    DbPool, DieselInquiryRepository, InMemoryInquiryRepository,
};
use inquiry_backend::settings::InquirySettings;

fn startup_error(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(error.to_string())
}

fn build_repository(pool: Option<&DbPool>) -> Arc<dyn InquiryRepository> {
    match pool {
        Some(pool) => Arc::new(DieselInquiryRepository::new(pool.clone())),
        None => {
            warn!("no database configured; inquiries are kept in memory and lost on restart");
            Arc::new(InMemoryInquiryRepository::new())
        }
    }
}

fn build_catalogue(settings: &InquirySettings) -> std::io::Result<Arc<dyn ProductCatalogue>> {
    match settings.catalogue_url().map_err(startup_error)? {
        Some(base) => {
            info!(%base, "using HTTP product catalogue");
            let catalogue = HttpProductCatalogue::new(base, settings.catalogue_timeout())
                .map_err(startup_error)?;
            Ok(Arc::new(catalogue))
        }
        None => {
            warn!("no product catalogue configured; product references will not resolve");
            Ok(Arc::new(InMemoryProductCatalogue::new()))
        }
    }
}

fn build_dispatcher(settings: &InquirySettings) -> std::io::Result<Arc<dyn NotificationDispatcher>> {
    match settings.notify_webhook_url().map_err(startup_error)? {
        Some(endpoint) => {
            info!(%endpoint, "delivering notifications by webhook");
            let dispatcher = WebhookNotificationDispatcher::new(endpoint, settings.notify_timeout())
                .map_err(startup_error)?;
            Ok(Arc::new(dispatcher))
        }
        None => Ok(Arc::new(TracingNotificationDispatcher)),
    }
}

/// Wire the inquiry service and identity resolver into [`HttpState`].
///
/// # Errors
/// Returns [`std::io::Error`] when a configured URL or id is malformed or an
/// HTTP client cannot be built.
pub(crate) fn build_http_state(
    settings: &InquirySettings,
    pool: Option<&DbPool>,
) -> std::io::Result<HttpState> {
    let hooks = PostCommitHooks::new(settings.hook_mode())
        .with_hook(Arc::new(NotifyHook::new(build_dispatcher(settings)?)));
    let service = Arc::new(
        InquiryService::new(
            build_repository(pool),
            build_catalogue(settings)?,
            Arc::new(DefaultClock),
        )
        .with_hooks(hooks)
        .with_max_conflict_retries(settings.max_conflict_retries()),
    );
    let identity = IdentityResolver::new(settings.super_admin_id().map_err(startup_error)?);
    if identity.super_admin_id().is_none() {
        warn!("INQUIRY_SUPER_ADMIN_ID not set; no administrator bypasses ownership checks");
    }

    Ok(HttpState::new(service.clone(), service, identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquiry_backend::domain::Role;
    use inquiry_backend::domain::ports::ListInquiriesRequest;
    use inquiry_backend::domain::{InquiryListFilter, Principal};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn defaults_produce_a_working_in_memory_state() {
        let state = build_http_state(&InquirySettings::default(), None).expect("state");

        let listed = state
            .inquiries_query
            .list_all(ListInquiriesRequest {
                principal: Some(Principal::fixture("1", Role::Admin)),
                filter: InquiryListFilter::default(),
            })
            .await
            .expect("empty listing");
        assert!(listed.is_empty());
    }

    #[rstest]
    fn malformed_catalogue_url_stops_startup() {
        let settings = InquirySettings {
            catalogue_url: Some("not a url".to_owned()),
            ..InquirySettings::default()
        };
        assert!(build_http_state(&settings, None).is_err());
    }

    #[rstest]
    fn configured_super_admin_reaches_the_resolver() {
        let settings = InquirySettings {
            super_admin_id: Some("1".to_owned()),
            ..InquirySettings::default()
        };
        let state = build_http_state(&settings, None).expect("state");
        assert_eq!(
            state.identity.super_admin_id().map(AsRef::as_ref),
            Some("1")
        );
    }
}
