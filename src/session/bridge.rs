//! Exchange of operator credentials for an upstream session, and access-token rotation.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::claims::UserProfile;
use super::role::Role;
use super::set_cookie::{SetCookie, find_cookie};
use crate::constants::{
    ROLE_COOKIE, UPSTREAM_ACCESS_TOKEN_PATH, UPSTREAM_LOGIN_PATH, UPSTREAM_SESSION_COOKIE,
};
use crate::error::BffError;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamLoginResult {
    #[serde(default)]
    success: bool,
    data: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct UpstreamTokenResult {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

/// Everything kept from a successful upstream login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub profile: UserProfile,
    pub role: Role,
    pub upstream_session: Option<SetCookie>,
}

impl LoginOutcome {
    /// The upstream session value becomes the access token for forwarded calls
    pub fn access_token(&self) -> String {
        self.upstream_session
            .as_ref()
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }
}

/// Authenticate against the upstream login endpoint.
///
/// `Ok(None)` is a rejected sign-in (bad credentials or no profile). Transport
/// failures and malformed bodies are errors. Nothing is retried.
pub async fn login(
    client: &Client,
    upstream_url: &str,
    credentials: &Credentials,
) -> Result<Option<LoginOutcome>, BffError> {
    let response = client
        .post(format!("{upstream_url}{UPSTREAM_LOGIN_PATH}"))
        .json(credentials)
        .send()
        .await?;

    let headers = response.headers().clone();
    let text = response.text().await?;
    let result: UpstreamLoginResult =
        serde_json::from_str(&text).map_err(|e| BffError::Parse(e.to_string()))?;

    if !result.success {
        return Ok(None);
    }
    let Some(profile) = result.data else {
        return Ok(None);
    };

    let role = find_cookie(&headers, ROLE_COOKIE)
        .and_then(|c| c.value.parse::<i64>().ok())
        .map(Role::from_wire_lossy)
        .unwrap_or_else(|| Role::from_wire_lossy(profile.role));

    Ok(Some(LoginOutcome {
        profile,
        role,
        upstream_session: find_cookie(&headers, UPSTREAM_SESSION_COOKIE),
    }))
}

/// Ask the upstream for a new access token on behalf of the current one.
///
/// `Ok(None)` means the upstream refused; the caller keeps the old session.
pub async fn rotate_access_token(
    client: &Client,
    upstream_url: &str,
    access_token: &str,
) -> Result<Option<String>, BffError> {
    let response = client
        .get(format!("{upstream_url}{UPSTREAM_ACCESS_TOKEN_PATH}"))
        .bearer_auth(access_token)
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let result: UpstreamTokenResult = response
        .json()
        .await
        .map_err(|e| BffError::Parse(e.to_string()))?;

    Ok(match result.data {
        Value::String(token) if result.success && !token.is_empty() => Some(token),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_upstream, unreachable_upstream};
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode, header},
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::json;

    fn creds() -> Credentials {
        Credentials {
            username: "u".into(),
            password: "p".into(),
        }
    }

    #[tokio::test]
    async fn test_login_extracts_cookie_and_profile() {
        let upstream = Router::new().route(
            UPSTREAM_LOGIN_PATH,
            post(|| async {
                (
                    [(
                        header::SET_COOKIE,
                        "session=abc123; Path=/; Expires=Wed, 21 Oct 2026 07:28:00 GMT; Max-Age=3600",
                    )],
                    Json(json!({"success": true, "data": {"id": 1, "username": "u", "role": 10}})),
                )
            }),
        );
        let base = spawn_upstream(upstream).await;

        let outcome = login(&Client::new(), &base, &creds()).await.unwrap().unwrap();
        assert_eq!(outcome.profile.username, "u");
        assert_eq!(outcome.role, Role::Operator);
        assert_eq!(outcome.access_token(), "abc123");
        assert_eq!(outcome.upstream_session.unwrap().max_age, Some(3600));
    }

    #[tokio::test]
    async fn test_role_cookie_takes_precedence() {
        let upstream = Router::new().route(
            UPSTREAM_LOGIN_PATH,
            post(|| async {
                let mut headers = HeaderMap::new();
                headers.append(header::SET_COOKIE, "session=s1; Path=/".parse().unwrap());
                headers.append(header::SET_COOKIE, "role=100; Path=/".parse().unwrap());
                (
                    headers,
                    Json(json!({"success": true, "data": {"id": 3, "username": "root", "role": 10}})),
                )
            }),
        );
        let base = spawn_upstream(upstream).await;

        let outcome = login(&Client::new(), &base, &creds()).await.unwrap().unwrap();
        assert_eq!(outcome.role, Role::Admin);
        assert_eq!(outcome.access_token(), "s1");
    }

    #[tokio::test]
    async fn test_rejected_login_is_not_an_error() {
        let upstream = Router::new().route(
            UPSTREAM_LOGIN_PATH,
            post(|| async { Json(json!({"success": false, "message": "bad password"})) }),
        );
        let base = spawn_upstream(upstream).await;
        assert!(login(&Client::new(), &base, &creds()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_success_flag_or_profile_is_rejected() {
        let upstream = Router::new()
            .route(UPSTREAM_LOGIN_PATH, post(|| async { Json(json!({"success": true})) }));
        let base = spawn_upstream(upstream).await;
        assert!(login(&Client::new(), &base, &creds()).await.unwrap().is_none());

        let upstream = Router::new().route(
            UPSTREAM_LOGIN_PATH,
            post(|| async { Json(json!({"data": {"id": 1, "username": "u"}})) }),
        );
        let base = spawn_upstream(upstream).await;
        assert!(login(&Client::new(), &base, &creds()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_and_network_failure_are_errors() {
        let upstream = Router::new().route(
            UPSTREAM_LOGIN_PATH,
            post(|| async { (StatusCode::BAD_GATEWAY, "<html>oops</html>").into_response() }),
        );
        let base = spawn_upstream(upstream).await;
        assert!(matches!(
            login(&Client::new(), &base, &creds()).await,
            Err(BffError::Parse(_))
        ));

        let base = unreachable_upstream().await;
        assert!(matches!(
            login(&Client::new(), &base, &creds()).await,
            Err(BffError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_rotate_access_token() {
        let upstream = Router::new().route(
            UPSTREAM_ACCESS_TOKEN_PATH,
            get(|headers: HeaderMap| async move {
                match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                    Some("Bearer old") => Json(json!({"success": true, "data": "new"})).into_response(),
                    _ => StatusCode::UNAUTHORIZED.into_response(),
                }
            }),
        );
        let base = spawn_upstream(upstream).await;
        let client = Client::new();

        assert_eq!(
            rotate_access_token(&client, &base, "old").await.unwrap().as_deref(),
            Some("new")
        );
        assert!(rotate_access_token(&client, &base, "stale").await.unwrap().is_none());
    }
}
