//! Server state

use std::sync::Arc;

use crate::authn::session::SessionVerifierExt;
use crate::vercel::deployments::DeploymentApi;

/// Server state shared across handlers
pub struct ServerState {
    /// Deployment API client; `None` until Vercel credentials are configured
    pub api: Option<Arc<dyn DeploymentApi>>,

    /// Session verifier for inbound requests
    pub sessions: Arc<dyn SessionVerifierExt>,
}

impl ServerState {
    pub fn new(
        api: Option<Arc<dyn DeploymentApi>>,
        sessions: Arc<dyn SessionVerifierExt>,
    ) -> Self {
        Self { api, sessions }
    }
}
