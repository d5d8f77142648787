use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

/// Operator profile as returned in the `data` field of the upstream login response
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_wire_role")]
    pub role: i64,
}

fn default_wire_role() -> i64 {
    Role::Standard.wire_value()
}

/// Payload of the signed local session token.
///
/// This is the long-lived source of truth; everything the browser is shown
/// about the session is copied out of it by [`SessionView::from_claims`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username, per JWT convention
    pub sub: String,
    pub uid: i64,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    /// Bearer credential attached to every forwarded call
    pub access_token: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl SessionClaims {
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// The access token, if there is one worth sending
    pub fn bearer(&self) -> Option<&str> {
        Some(self.access_token.as_str()).filter(|t| !t.is_empty())
    }
}

/// What the dashboard sees of a session. Never carries the access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub email: String,
    /// Numeric role: 1 standard, 10 operator, 100 admin
    #[schema(value_type = i64)]
    pub role: Role,
    pub is_admin: bool,
    pub expires: DateTime<Utc>,
}

impl SessionView {
    /// Copy every profile field out of the token; no field is ever carried over from a previous view.
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            id: claims.uid,
            username: claims.sub.clone(),
            display_name: claims.display_name.clone(),
            email: claims.email.clone(),
            role: claims.role,
            is_admin: claims.role.is_admin(),
            expires: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
        }
    }
}
