//! Bearer authentication middleware.
//!
//! For each request:
//! 1. Skips CORS preflight requests
//! 2. Resolves the route's auth requirement via [`RoutePolicy`]
//! 3. For public routes: inserts an anonymous `SecurityContext`
//! 4. For protected routes: extracts the bearer token, verifies it, and
//!    inserts the resulting `SecurityContext`

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ErrorBody;
use crate::auth::TokenService;
use crate::security::SecurityContext;

/// Route matcher for explicitly public routes of one HTTP method.
#[derive(Default)]
struct PublicRouteMatcher {
    matcher: matchit::Router<()>,
}

impl PublicRouteMatcher {
    fn insert(&mut self, path: &str) -> Result<(), matchit::InsertError> {
        self.matcher.insert(path, ())
    }

    fn find(&self, path: &str) -> bool {
        self.matcher.at(path).is_ok()
    }
}

/// Whether a route requires authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No authentication required (public route).
    None,
    /// A valid bearer token is required.
    Required,
}

/// Method-aware public-route policy.
///
/// Routes are protected by default; explicitly registered (method, path)
/// patterns are public. Patterns use `{param}` placeholders, the same
/// syntax the router itself uses.
#[derive(Clone)]
pub struct RoutePolicy {
    public_matchers: Arc<HashMap<Method, PublicRouteMatcher>>,
    require_auth_by_default: bool,
}

/// Builder for [`RoutePolicy`].
pub struct RoutePolicyBuilder {
    public: Vec<(Method, String)>,
    require_auth_by_default: bool,
}

impl RoutePolicy {
    #[must_use]
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder {
            public: Vec::new(),
            require_auth_by_default: true,
        }
    }

    /// Resolve the authentication requirement for a given (method, path).
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> AuthRequirement {
        let is_public = self
            .public_matchers
            .get(method)
            .is_some_and(|matcher| matcher.find(path));

        if self.require_auth_by_default && !is_public {
            AuthRequirement::Required
        } else {
            AuthRequirement::None
        }
    }
}

impl RoutePolicyBuilder {
    /// Mark a (method, path pattern) as public.
    #[must_use]
    pub fn public(mut self, method: Method, path: &str) -> Self {
        self.public.push((method, path.to_owned()));
        self
    }

    #[must_use]
    pub fn require_auth_by_default(mut self, value: bool) -> Self {
        self.require_auth_by_default = value;
        self
    }

    pub fn build(self) -> Result<RoutePolicy, matchit::InsertError> {
        let mut public_matchers: HashMap<Method, PublicRouteMatcher> = HashMap::new();
        for (method, path) in self.public {
            public_matchers
                .entry(method)
                .or_default()
                .insert(&path)?;
        }
        Ok(RoutePolicy {
            public_matchers: Arc::new(public_matchers),
            require_auth_by_default: self.require_auth_by_default,
        })
    }
}

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub policy: RoutePolicy,
}

/// Authentication middleware verifying bearer tokens.
pub async fn authn_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    // Skip CORS preflight
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    match state.policy.resolve(req.method(), req.uri().path()) {
        AuthRequirement::None => {
            req.extensions_mut().insert(SecurityContext::anonymous());
            next.run(req).await
        }
        AuthRequirement::Required => {
            let Some(token) = extract_bearer_token(req.headers()) else {
                return unauthorized("Missing or invalid Authorization header");
            };

            match state.tokens.verify(token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims.to_context());
                    next.run(req).await
                }
                Err(err) => {
                    tracing::debug!("bearer token rejected: {err}");
                    unauthorized("Invalid or expired token")
                }
            }
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

/// Extract Bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").map(str::trim))
}

/// Check if this is a CORS preflight request.
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}
