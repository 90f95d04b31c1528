//! Identity-provider boundary.
//!
//! Authentication happens upstream; the provider's edge injects the
//! authenticated subject and role claim as headers, which this service
//! trusts for authorization decisions.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminRole {
    Admin,
    Superadmin,
}

impl AdminRole {
    fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "admin" => Some(Self::Admin),
            "superadmin" => Some(Self::Superadmin),
            _ => None,
        }
    }
}

/// The authenticated caller, as asserted by the identity provider.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: String,
    pub role: Option<AdminRole>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_some()
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin role required".into()))
        }
    }

    pub fn require_superadmin(&self) -> Result<(), ApiError> {
        if self.role == Some(AdminRole::Superadmin) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("superadmin role required".into()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::Unauthorized)?
            .to_string();

        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(AdminRole::from_claim);

        Ok(Identity { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Option<AdminRole>) -> Identity {
        Identity { user_id: "u-1".into(), role }
    }

    #[test]
    fn role_claims_parse() {
        assert_eq!(AdminRole::from_claim("admin"), Some(AdminRole::Admin));
        assert_eq!(AdminRole::from_claim("superadmin"), Some(AdminRole::Superadmin));
        assert_eq!(AdminRole::from_claim("customer"), None);
    }

    #[test]
    fn admin_gates() {
        assert!(identity(None).require_admin().is_err());
        assert!(identity(Some(AdminRole::Admin)).require_admin().is_ok());
        assert!(identity(Some(AdminRole::Admin)).require_superadmin().is_err());
        assert!(identity(Some(AdminRole::Superadmin)).require_superadmin().is_ok());
    }
}
