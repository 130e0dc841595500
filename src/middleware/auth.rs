use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Query, Request, State},
    http::{HeaderMap, Uri},
    middleware::Next,
    response::Response,
};

use super::policy::{is_owner, Access, PolicyTable};
use crate::auth::cookie::{read_cookie, TOKEN_COOKIE};
use crate::auth::{Claims, TokenSigner};
use crate::error::ApiError;

pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized access";
pub const FORBIDDEN_MESSAGE: &str = "forbidden access";

/// Identity decoded from the token cookie, available to handlers behind the
/// gate as `Extension<AuthUser>`.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: Option<String>,
    pub claims: Claims,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email().map(str::to_string),
            claims,
        }
    }
}

/// Token verification plus the route policy table it enforces.
#[derive(Clone)]
pub struct IdentityGate {
    signer: Arc<TokenSigner>,
    policies: Arc<PolicyTable>,
}

impl IdentityGate {
    pub fn new(signer: TokenSigner, policies: PolicyTable) -> Self {
        Self {
            signer: Arc::new(signer),
            policies: Arc::new(policies),
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Missing, invalid and expired tokens all produce the same 401.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
        let token = read_cookie(headers, TOKEN_COOKIE).ok_or_else(|| {
            tracing::debug!("Rejecting request without token cookie");
            ApiError::unauthorized(UNAUTHORIZED_MESSAGE)
        })?;

        let claims = self.signer.verify(token).map_err(|e| {
            tracing::debug!("Rejecting token: {}", e);
            ApiError::unauthorized(UNAUTHORIZED_MESSAGE)
        })?;

        Ok(AuthUser::from(claims))
    }

    pub fn authorize(&self, access: &Access, user: &AuthUser, uri: &Uri) -> Result<(), ApiError> {
        if let Access::Owner { query_param } = access {
            let claimed = query_value(uri, query_param);
            if !is_owner(user, claimed.as_deref()) {
                tracing::warn!(
                    "Ownership check failed: token email {:?} requested {:?}",
                    user.email,
                    claimed
                );
                return Err(ApiError::forbidden(FORBIDDEN_MESSAGE));
            }
        }
        Ok(())
    }
}

/// Applies the policy table to every routed request. Public routes pass
/// straight through; others need a valid `token` cookie, and owner routes
/// also need the token email to match the query parameter.
pub async fn identity_gate(
    State(gate): State<IdentityGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    };
    let access = gate.policies.access(request.method(), &path).clone();

    if access == Access::Public {
        return Ok(next.run(request).await);
    }

    let user = gate.authenticate(request.headers())?;
    gate.authorize(&access, &user, request.uri())?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn query_value(uri: &Uri, name: &str) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.get(name).cloned()
}
