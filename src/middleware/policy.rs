use axum::http::Method;

use super::auth::AuthUser;
use crate::routes::paths;

/// What a route requires of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No token needed.
    Public,
    /// A valid token cookie.
    Authenticated,
    /// A valid token whose email equals the named query parameter.
    Owner { query_param: &'static str },
}

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
}

/// Declarative access rules keyed by method and route pattern. Routes not
/// listed are public.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    routes: Vec<RoutePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: Method, path: &'static str, access: Access) -> Self {
        self.routes.push(RoutePolicy { method, path, access });
        self
    }

    pub fn standard(gate_food_detail: bool) -> Self {
        let food_detail = if gate_food_detail { Access::Authenticated } else { Access::Public };

        Self::new()
            .with(Method::GET, paths::FOOD_ITEM, food_detail)
            .with(Method::GET, paths::MY_FOODS, Access::Owner { query_param: "email" })
    }

    /// `path` may be either the route pattern (`/foods/:id`) or a concrete
    /// request path (`/foods/42`). HEAD is answered by GET handlers, so it
    /// shares their policy.
    pub fn access(&self, method: &Method, path: &str) -> &Access {
        let method = if *method == Method::HEAD { &Method::GET } else { method };
        self.routes
            .iter()
            .find(|r| r.method == *method && pattern_matches(r.path, path))
            .map(|r| &r.access)
            .unwrap_or(&Access::Public)
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.trim_end_matches('/').split('/');
    let mut path_segments = path.trim_end_matches('/').split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with(':') && !s.is_empty() => continue,
            (Some(p), Some(s)) if p == s => continue,
            _ => return false,
        }
    }
}

/// Ownership predicate: the authenticated email must equal the email the
/// caller claims to be acting for. Either side missing is a mismatch.
pub fn is_owner(user: &AuthUser, claimed: Option<&str>) -> bool {
    matches!((user.email.as_deref(), claimed), (Some(actual), Some(claimed)) if actual == claimed)
}
