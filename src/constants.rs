/// Cookie carrying the signed local session token
pub const SESSION_TOKEN_COOKIE: &str = "bff_session";

/// Cookie carrying the upstream backend session value (also the name the upstream uses)
pub const UPSTREAM_SESSION_COOKIE: &str = "session";

/// Cookie carrying the operator's numeric role
pub const ROLE_COOKIE: &str = "role";

/// Upstream login endpoint
pub const UPSTREAM_LOGIN_PATH: &str = "/api/user/login";

/// Upstream endpoint that issues a fresh access token for the caller
pub const UPSTREAM_ACCESS_TOKEN_PATH: &str = "/api/user/token";

/// Session token lifetime: 30 days
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 300;

/// Largest request body the forwarder buffers: 2 MiB
pub const MAX_FORWARD_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Maximum number of redirects followed on an upstream call
pub const MAX_UPSTREAM_REDIRECTS: usize = 10;

/// Hard ceiling for the timeout probe route
pub const TIMEOUT_PROBE_BUDGET_SECS: u64 = 58;

/// Generic message shown for every failed sign-in
pub const SIGN_IN_FAILED: &str = "Sign in failed";
