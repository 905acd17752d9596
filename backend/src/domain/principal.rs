//! Identity resolution: merge the ordinary and administrative session slots
//! into one effective [`Principal`].
//!
//! A client may hold two session slots at once: a regular browsing identity
//! and a separately elevated administrative identity. The resolver is a pure
//! function over both optional records; when both are present the
//! administrative identity wins.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned when constructing a [`PrincipalId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalIdValidationError {
    /// The identifier was empty.
    #[error("principal id must not be empty")]
    Empty,
    /// The identifier carried leading or trailing whitespace.
    #[error("principal id must not contain surrounding whitespace")]
    SurroundingWhitespace,
}

/// Opaque identifier of a buyer, supplier or administrator.
///
/// Identifiers are issued by the external account system; integers and
/// UUIDs are both accepted as long as they are non-empty and trimmed.
///
/// # Examples
/// ```
/// use inquiry_backend::domain::PrincipalId;
///
/// let id = PrincipalId::new("42").expect("valid id");
/// assert_eq!(id.as_ref(), "42");
/// assert!(PrincipalId::new(" 42").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Validate and construct an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, PrincipalIdValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(PrincipalIdValidationError::Empty);
        }
        if id.trim() != id {
            return Err(PrincipalIdValidationError::SurroundingWhitespace);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for PrincipalId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PrincipalId> for String {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PrincipalId {
    type Error = PrincipalIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Marketplace role attached to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sends inquiries and may rebut a supplier reply once.
    Buyer,
    /// Receives inquiries, replies, deletes and recovers them.
    Supplier,
    /// Moderator with read access to every inquiry.
    Admin,
}

impl Role {
    /// Wire representation of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Supplier => "supplier",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record as persisted in one session slot by the external login
/// collaborator.
///
/// `super_admin` is the designated flag for the distinguished
/// administrator; it only takes effect for records whose role is
/// [`Role::Admin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdentity {
    #[schema(value_type = String, example = "42")]
    pub id: PrincipalId,
    pub role: Role,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub super_admin: bool,
}

impl StoredIdentity {
    /// Build a record for `id` with the given role and no capabilities.
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self {
            id,
            role,
            email_verified: false,
            approved: false,
            super_admin: false,
        }
    }

    /// Mark the record as verified and approved.
    pub fn verified_and_approved(mut self) -> Self {
        self.email_verified = true;
        self.approved = true;
        self
    }

    /// Set the designated super-admin flag.
    pub fn with_super_admin(mut self, super_admin: bool) -> Self {
        self.super_admin = super_admin;
        self
    }
}

/// Resolved identity and capability context for one request.
///
/// Never persisted; rebuilt from the session slots on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    #[schema(value_type = String, example = "42")]
    id: PrincipalId,
    role: Role,
    is_super_admin: bool,
    email_verified: bool,
    approved: bool,
}

impl Principal {
    /// Identifier of the acting account.
    pub fn id(&self) -> &PrincipalId {
        &self.id
    }

    /// Role taken from the winning identity record.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this principal is the distinguished super-administrator.
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Whether the account's email address is verified.
    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    /// Whether moderation has approved the account.
    pub fn approved(&self) -> bool {
        self.approved
    }

    /// Whether the principal has the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Pure resolver from the two session slots to a [`Principal`].
///
/// # Examples
/// ```
/// use inquiry_backend::domain::{IdentityResolver, PrincipalId, Role, StoredIdentity};
///
/// let resolver = IdentityResolver::new(Some(PrincipalId::new("999").unwrap()));
/// let buyer = StoredIdentity::new(PrincipalId::new("7").unwrap(), Role::Buyer);
/// let admin = StoredIdentity::new(PrincipalId::new("999").unwrap(), Role::Admin);
///
/// let principal = resolver.resolve(Some(&buyer), Some(&admin)).expect("resolved");
/// assert_eq!(principal.role(), Role::Admin);
/// assert!(principal.is_super_admin());
/// assert!(resolver.resolve(None, None).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityResolver {
    super_admin_id: Option<PrincipalId>,
}

impl IdentityResolver {
    /// Create a resolver that recognises `super_admin_id` as the
    /// distinguished administrator, in addition to records flagged
    /// `superAdmin`.
    pub fn new(super_admin_id: Option<PrincipalId>) -> Self {
        Self { super_admin_id }
    }

    /// Configured super-admin identifier, if any.
    pub fn super_admin_id(&self) -> Option<&PrincipalId> {
        self.super_admin_id.as_ref()
    }

    /// Merge the ordinary and administrative slots into one principal.
    ///
    /// Returns `None` for anonymous requests.
    pub fn resolve(
        &self,
        ordinary: Option<&StoredIdentity>,
        admin: Option<&StoredIdentity>,
    ) -> Option<Principal> {
        admin.or(ordinary).map(|record| self.principal_from(record))
    }

    fn principal_from(&self, record: &StoredIdentity) -> Principal {
        let designated = record.super_admin || self.super_admin_id.as_ref() == Some(&record.id);
        Principal {
            id: record.id.clone(),
            role: record.role,
            is_super_admin: matches!(record.role, Role::Admin) && designated,
            email_verified: record.email_verified,
            approved: record.approved,
        }
    }
}

/// Build principals directly in tests without going through session slots.
#[cfg(any(test, feature = "test-support"))]
impl Principal {
    /// Construct a verified, approved principal with the given role.
    pub fn fixture(id: &str, role: Role) -> Self {
        let id = PrincipalId::new(id).unwrap_or_else(|err| panic!("fixture id: {err}"));
        IdentityResolver::default()
            .principal_from(&StoredIdentity::new(id, role).verified_and_approved())
    }

    /// Override the verification flag.
    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    /// Override the approval flag.
    pub fn with_approved(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }

    /// Override the super-admin flag.
    pub fn with_super_admin(mut self, super_admin: bool) -> Self {
        self.is_super_admin = super_admin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn id(raw: &str) -> PrincipalId {
        PrincipalId::new(raw).expect("fixture id")
    }

    #[fixture]
    fn resolver() -> IdentityResolver {
        IdentityResolver::new(Some(id("999")))
    }

    #[rstest]
    fn anonymous_when_no_slot_is_present(resolver: IdentityResolver) {
        assert!(resolver.resolve(None, None).is_none());
    }

    #[rstest]
    fn ordinary_slot_is_taken_verbatim(resolver: IdentityResolver) {
        let record = StoredIdentity::new(id("7"), Role::Supplier).verified_and_approved();

        let principal = resolver.resolve(Some(&record), None).expect("principal");

        assert_eq!(principal.id(), &id("7"));
        assert_eq!(principal.role(), Role::Supplier);
        assert!(principal.email_verified());
        assert!(principal.approved());
        assert!(!principal.is_super_admin());
    }

    #[rstest]
    fn admin_slot_wins_when_both_are_present(resolver: IdentityResolver) {
        let buyer = StoredIdentity::new(id("7"), Role::Buyer).verified_and_approved();
        let admin = StoredIdentity::new(id("3"), Role::Admin);

        let principal = resolver.resolve(Some(&buyer), Some(&admin)).expect("principal");

        assert_eq!(principal.id(), &id("3"));
        assert_eq!(principal.role(), Role::Admin);
        assert!(!principal.email_verified());
    }

    #[rstest]
    #[case::configured_id(StoredIdentity::new(id("999"), Role::Admin), true)]
    #[case::flagged_record(StoredIdentity::new(id("5"), Role::Admin).with_super_admin(true), true)]
    #[case::plain_admin(StoredIdentity::new(id("5"), Role::Admin), false)]
    #[case::configured_id_wrong_role(StoredIdentity::new(id("999"), Role::Buyer), false)]
    #[case::flag_wrong_role(StoredIdentity::new(id("5"), Role::Supplier).with_super_admin(true), false)]
    fn super_admin_is_computed(
        resolver: IdentityResolver,
        #[case] record: StoredIdentity,
        #[case] expected: bool,
    ) {
        let principal = resolver.resolve(None, Some(&record)).expect("principal");
        assert_eq!(principal.is_super_admin(), expected);
    }

    #[rstest]
    fn no_configured_id_only_honours_flag() {
        let resolver = IdentityResolver::default();
        let record = StoredIdentity::new(id("999"), Role::Admin);

        let principal = resolver.resolve(None, Some(&record)).expect("principal");
        assert!(!principal.is_super_admin());
    }

    #[rstest]
    fn stored_identity_defaults_missing_flags() {
        let record: StoredIdentity =
            serde_json::from_str(r#"{"id":"12","role":"buyer"}"#).expect("decode");

        assert_eq!(record, StoredIdentity::new(id("12"), Role::Buyer));
    }

    #[rstest]
    #[case("", PrincipalIdValidationError::Empty)]
    #[case(" 12", PrincipalIdValidationError::SurroundingWhitespace)]
    fn principal_id_rejects_invalid_values(
        #[case] raw: &str,
        #[case] expected: PrincipalIdValidationError,
    ) {
        assert_eq!(PrincipalId::new(raw), Err(expected));
    }
}
