//! Identity extraction for authenticated routes.
//!
//! Tessera does not verify credentials itself: an upstream authenticator
//! (gateway or middleware terminating the session) verifies the caller
//! and forwards the resulting user id in the `x-user-id` header. The
//! [`Identity`] extractor trusts that value, per the system boundary --
//! its only job is to make "who is asking" a typed, mandatory parameter
//! of every write handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tessera_types::UserId;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the verified user id, set by the upstream authenticator.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The verified identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub UserId);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Auth(format!("missing {USER_ID_HEADER} header")))?;
        let raw = value
            .to_str()
            .map_err(|_err| ApiError::Auth(format!("unreadable {USER_ID_HEADER} header")))?;
        let uuid = Uuid::parse_str(raw)
            .map_err(|_err| ApiError::Auth(format!("malformed {USER_ID_HEADER} header")))?;
        Ok(Self(UserId::from(uuid)))
    }
}
