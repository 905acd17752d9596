//! Session access for inquiry handlers.
//!
//! The external login collaborator stores up to two identity records in the
//! cookie session: the ordinary account under `identity` and an
//! administrative override under `admin_identity`. Handlers never look at
//! those slots directly; they ask [`SessionContext::principal`] for the merged
//! [`Principal`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, IdentityResolver, Principal, StoredIdentity};

/// Session key holding the ordinary identity record.
pub const IDENTITY_KEY: &str = "identity";
/// Session key holding the administrative identity record.
pub const ADMIN_IDENTITY_KEY: &str = "admin_identity";

/// The two identity slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySlot {
    Ordinary,
    Admin,
}

impl IdentitySlot {
    const fn key(self) -> &'static str {
        match self {
            Self::Ordinary => IDENTITY_KEY,
            Self::Admin => ADMIN_IDENTITY_KEY,
        }
    }
}

/// Newtype wrapper that exposes identity-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Read one slot. A blob that no longer decodes is treated as absent.
    pub fn stored_identity(&self, slot: IdentitySlot) -> Option<StoredIdentity> {
        match self.0.get::<StoredIdentity>(slot.key()) {
            Ok(record) => record,
            Err(error) => {
                warn!(slot = slot.key(), %error, "undecodable identity in session cookie");
                None
            }
        }
    }

    /// Resolve the acting principal, or `None` for anonymous requests.
    pub fn principal(&self, resolver: &IdentityResolver) -> Option<Principal> {
        let ordinary = self.stored_identity(IdentitySlot::Ordinary);
        let admin = self.stored_identity(IdentitySlot::Admin);
        resolver.resolve(ordinary.as_ref(), admin.as_ref())
    }

    /// Write an identity record into `slot`.
    ///
    /// Production sessions are written by the login service; this exists for
    /// local tooling and tests that need to stand in for it.
    pub fn persist_identity(&self, slot: IdentitySlot, record: &StoredIdentity) -> Result<(), Error> {
        self.0
            .insert(slot.key(), record)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PrincipalId, Role};
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn record(id: &str, role: Role) -> StoredIdentity {
        StoredIdentity::new(PrincipalId::new(id).expect("fixture id"), role).verified_and_approved()
    }

    async fn whoami(session: SessionContext) -> HttpResponse {
        let resolver = IdentityResolver::new(Some(PrincipalId::new("999").expect("fixture id")));
        match session.principal(&resolver) {
            Some(principal) => HttpResponse::Ok().json(principal),
            None => HttpResponse::NoContent().finish(),
        }
    }

    #[actix_web::test]
    async fn admin_slot_wins_over_ordinary_slot() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::post().to(|session: SessionContext| async move {
                        session.persist_identity(IdentitySlot::Ordinary, &record("7", Role::Buyer))?;
                        session.persist_identity(IdentitySlot::Admin, &record("999", Role::Admin))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let login = test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
        let cookie = session_cookie(&login);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["id"], "999");
        assert_eq!(body["role"], "admin");
        assert_eq!(body["isSuperAdmin"], true);
    }

    #[actix_web::test]
    async fn undecodable_identity_is_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/tamper",
                    web::post().to(|session: Session| async move {
                        session
                            .insert(IDENTITY_KEY, "not-an-identity")
                            .expect("insert raw string");
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let tamper =
            test::call_service(&app, test::TestRequest::post().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&tamper);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn empty_session_is_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
