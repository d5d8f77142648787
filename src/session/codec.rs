//! Signing and verification of the local session token.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::claims::{SessionClaims, UserProfile};
use super::role::Role;
use crate::constants::SESSION_TOKEN_COOKIE;
use crate::error::BffError;

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl SessionCodec {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // clock skew

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX / 2),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Mint a fresh session for a profile that just signed in
    pub fn issue(
        &self,
        profile: &UserProfile,
        role: Role,
        access_token: String,
    ) -> Result<(SessionClaims, String), BffError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: profile.username.clone(),
            uid: profile.id,
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            role,
            access_token,
            iat: now,
            exp: now + self.ttl_secs,
            jti: Uuid::new_v4().to_string(),
        };
        let token = self.sign(&claims)?;
        Ok((claims, token))
    }

    /// Replace the access token, keeping the operator's identity
    pub fn reissue(
        &self,
        claims: &SessionClaims,
        access_token: String,
    ) -> Result<(SessionClaims, String), BffError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            access_token,
            iat: now,
            exp: now + self.ttl_secs,
            jti: Uuid::new_v4().to_string(),
            ..claims.clone()
        };
        let token = self.sign(&claims)?;
        Ok((claims, token))
    }

    pub fn decode(&self, token: &str) -> Result<SessionClaims, BffError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Resolve the caller's session from its cookies. Anything invalid or expired is anonymous.
    pub fn from_headers(&self, headers: &HeaderMap) -> Option<SessionClaims> {
        let jar = CookieJar::from_headers(headers);
        let cookie = jar.get(SESSION_TOKEN_COOKIE)?;
        match self.decode(cookie.value()) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Ignoring session token: {e}");
                None
            }
        }
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String, BffError> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }
}
