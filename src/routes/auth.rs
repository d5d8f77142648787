use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{ErrorResponse, SuccessResponse};
use crate::AppState;
use crate::constants::SIGN_IN_FAILED;
use crate::error::BffError;
use crate::session::cookies::{clear_cookies, role_cookie, session_token_cookie, upstream_session_cookie};
use crate::session::{Credentials, SessionView, login as upstream_login, rotate_access_token};

// --- Types ---

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginResponse {
    fn failed() -> Self {
        Self {
            success: false,
            user: None,
            message: Some(SIGN_IN_FAILED.to_string()),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionView>,
}

// --- Handlers ---

/// Sign in through the upstream and mint a local session
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = Credentials,
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, body = LoginResponse),
        (status = 502, body = LoginResponse),
    )
)]
pub async fn login(State(state): State<Arc<AppState>>, Json(credentials): Json<Credentials>) -> Response {
    let outcome = match upstream_login(&state.http_client, &state.config.upstream_url, &credentials).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            info!("Sign-in rejected for {}", credentials.username);
            return (StatusCode::UNAUTHORIZED, Json(LoginResponse::failed())).into_response();
        }
        Err(e) => {
            warn!("Sign-in for {} failed: {e}", credentials.username);
            return (StatusCode::BAD_GATEWAY, Json(LoginResponse::failed())).into_response();
        }
    };

    let (claims, token) = match state
        .sessions
        .issue(&outcome.profile, outcome.role, outcome.access_token())
    {
        Ok(issued) => issued,
        Err(e) => return e.to_internal_response(),
    };

    let secure = state.config.secure_cookies();
    let mut jar = CookieJar::new()
        .add(session_token_cookie(token, state.sessions.ttl_secs(), secure))
        .add(role_cookie(outcome.role, secure));
    if let Some(upstream) = outcome.upstream_session {
        jar = jar.add(upstream_session_cookie(upstream.value, upstream.max_age, secure));
    }

    info!("Operator {} signed in", claims.username());
    (
        jar,
        Json(LoginResponse {
            success: true,
            user: Some(SessionView::from_claims(&claims)),
            message: None,
        }),
    )
        .into_response()
}

/// Drop every cookie minted at sign-in
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, body = SuccessResponse),
    )
)]
pub async fn logout() -> (CookieJar, Json<SuccessResponse>) {
    let jar = clear_cookies()
        .into_iter()
        .fold(CookieJar::new(), |jar, cookie| jar.add(cookie));
    (jar, Json(SuccessResponse { success: true }))
}

/// Current session, as seen by the dashboard
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "auth",
    responses(
        (status = 200, body = SessionResponse),
    )
)]
pub async fn session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<SessionResponse> {
    let user = state
        .sessions
        .from_headers(&headers)
        .map(|claims| SessionView::from_claims(&claims));

    Json(SessionResponse {
        authenticated: user.is_some(),
        user,
    })
}

/// Replace the session's access token with a freshly issued one
#[utoipa::path(
    post,
    path = "/api/auth/token",
    tag = "auth",
    responses(
        (status = 200, body = SuccessResponse),
        (status = 401, body = ErrorResponse),
        (status = 502, body = ErrorResponse),
    )
)]
pub async fn rotate_token(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(claims) = state.sessions.from_headers(&headers) else {
        return BffError::Unauthenticated.into_response();
    };
    let Some(current) = claims.bearer() else {
        return BffError::Unauthenticated.into_response();
    };

    let token = match rotate_access_token(&state.http_client, &state.config.upstream_url, current).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Upstream refused to issue a new access token".into(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse { error: e.to_string() }),
            )
                .into_response();
        }
    };

    match state.sessions.reissue(&claims, token) {
        Ok((rotated, session_token)) => {
            info!("Rotated access token for {}", rotated.username());
            let jar = CookieJar::new().add(session_token_cookie(
                session_token,
                state.sessions.ttl_secs(),
                state.config.secure_cookies(),
            ));
            (jar, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => e.to_internal_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::constants::{UPSTREAM_ACCESS_TOKEN_PATH, UPSTREAM_LOGIN_PATH};
    use crate::test_support::{body_json, echo_router, request, spawn_upstream, unreachable_upstream};
    use axum::{
        Router,
        http::{Method, header},
        routing::{get, post},
    };
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tower::ServiceExt;

    fn login_request(username: &str) -> axum::extract::Request {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                json!({"username": username, "password": "pw"}).to_string(),
            ))
            .unwrap()
    }

    /// Collect `name=value` pairs from every Set-Cookie header on a response
    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
            .collect()
    }

    /// Upstream with a login endpoint, a token endpoint and an echo for everything else
    async fn upstream() -> String {
        let router = echo_router(Arc::new(AtomicUsize::new(0)))
            .route(
                UPSTREAM_LOGIN_PATH,
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["username"] == "u" {
                        (
                            [(
                                header::SET_COOKIE,
                                "session=abc123; Path=/; Expires=Wed, 21 Oct 2026 07:28:00 GMT; Max-Age=3600",
                            )],
                            Json(json!({"success": true, "data": {"id": 1, "username": "u", "role": 10}})),
                        )
                            .into_response()
                    } else {
                        Json(json!({"success": false, "message": "wrong password"})).into_response()
                    }
                }),
            )
            .route(
                UPSTREAM_ACCESS_TOKEN_PATH,
                get(|| async { Json(json!({"success": true, "data": "rotated"})) }),
            );
        spawn_upstream(router).await
    }

    async fn app(base: &str) -> Router {
        let state = Arc::new(AppState::new(Config::for_upstream(base)).unwrap());
        crate::routes::router(state)
    }

    #[tokio::test]
    async fn test_login_mints_session_and_cookies() {
        let router = app(&upstream().await).await;

        let response = router.oneshot(login_request("u")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookies(&response);
        assert!(cookies.contains(&"session=abc123".to_string()));
        assert!(cookies.contains(&"role=10".to_string()));
        assert!(cookies.iter().any(|c| c.starts_with("bff_session=")));

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["user"]["username"], "u");
        assert_eq!(json["user"]["role"], 10);
        assert!(json["user"].get("accessToken").is_none());
    }

    #[tokio::test]
    async fn test_failed_login_is_generic_401() {
        let router = app(&upstream().await).await;

        let response = router.oneshot(login_request("nobody")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&response).is_empty());
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": SIGN_IN_FAILED})
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_login_is_502() {
        let router = app(&unreachable_upstream().await).await;
        let response = router.oneshot(login_request("u")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["message"], SIGN_IN_FAILED);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let router = app(&upstream().await).await;

        // Anonymous
        let response = router
            .clone()
            .oneshot(request(Method::GET, "/api/auth/session", None, ""))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({"authenticated": false}));

        // Authenticated
        let response = router.clone().oneshot(login_request("u")).await.unwrap();
        let cookie = set_cookies(&response).join("; ");

        let response = router
            .clone()
            .oneshot(request(Method::GET, "/api/auth/session", Some(&cookie), ""))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["user"]["username"], "u");
        assert_eq!(json["user"]["isAdmin"], true);

        // Forwarded calls carry the upstream session value as bearer
        let response = router
            .clone()
            .oneshot(request(Method::GET, "/api/channel", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["authorization"], "Bearer abc123");

        // Logout clears everything
        let response = router
            .clone()
            .oneshot(request(Method::POST, "/api/auth/logout", Some(&cookie), ""))
            .await
            .unwrap();
        let cleared = set_cookies(&response);
        assert!(cleared.contains(&"bff_session=".to_string()));
        assert!(cleared.contains(&"session=".to_string()));
        assert!(cleared.contains(&"role=".to_string()));
    }

    #[tokio::test]
    async fn test_rotation_switches_bearer_immediately() {
        let router = app(&upstream().await).await;

        let response = router.clone().oneshot(login_request("u")).await.unwrap();
        let login_cookies = set_cookies(&response);
        let cookie = login_cookies.join("; ");

        let response = router
            .clone()
            .oneshot(request(Method::POST, "/api/auth/token", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let rotated = set_cookies(&response);
        assert_eq!(rotated.len(), 1);

        let cookie = login_cookies
            .iter()
            .filter(|c| !c.starts_with("bff_session="))
            .chain(rotated.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");

        let response = router
            .clone()
            .oneshot(request(Method::GET, "/api/token", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["authorization"], "Bearer rotated");

        let response = router
            .oneshot(request(Method::GET, "/api/auth/session", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["user"]["username"], "u");
    }

    #[tokio::test]
    async fn test_rotation_requires_session() {
        let router = app(&upstream().await).await;
        let response = router
            .oneshot(request(Method::POST, "/api/auth/token", None, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({"error": "Not signed in"}));
    }
}
