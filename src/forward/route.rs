use axum::http::Method;

/// How a forwarded call authenticates to the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthInjection {
    /// Public route: the session is never consulted
    None,
    /// `Authorization: Bearer <access token>` from the signed session
    Bearer,
    /// `Cookie: session=<value>` from the locally stored upstream cookie
    Cookie,
}

/// One forwarding rule: a local route and the upstream endpoint it maps to.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub local_path: &'static str,
    /// Upstream path, optionally containing `{name}` placeholders
    pub upstream_path_template: &'static str,
    pub methods: Vec<Method>,
    pub auth: AuthInjection,
    pub uses_path_params: bool,
}

impl RouteSpec {
    pub fn new(local_path: &'static str, upstream_path_template: &'static str) -> Self {
        Self {
            local_path,
            upstream_path_template,
            methods: vec![Method::GET],
            auth: AuthInjection::Bearer,
            uses_path_params: false,
        }
    }

    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    pub fn with_path_param(mut self) -> Self {
        self.uses_path_params = true;
        self
    }

    pub fn public(mut self) -> Self {
        self.auth = AuthInjection::None;
        self
    }

    pub fn cookie_auth(mut self) -> Self {
        self.auth = AuthInjection::Cookie;
        self
    }
}
