use std::sync::Arc;

use crate::auth::{TokenError, TokenSigner};
use crate::config::AppConfig;
use crate::database::Database;
use crate::middleware::{IdentityGate, PolicyTable};

/// Shared context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub gate: IdentityGate,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Result<Self, TokenError> {
        let signer = TokenSigner::new(&config.security.jwt_secret)?;
        let policies = PolicyTable::standard(config.security.gate_food_detail);
        Ok(Self {
            db,
            config: Arc::new(config),
            gate: IdentityGate::new(signer, policies),
        })
    }

    pub fn signer(&self) -> &TokenSigner {
        self.gate.signer()
    }
}
