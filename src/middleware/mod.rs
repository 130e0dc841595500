pub mod auth;
pub mod policy;

pub use auth::{identity_gate, AuthUser, IdentityGate};
pub use policy::{is_owner, Access, PolicyTable, RoutePolicy};
