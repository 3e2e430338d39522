//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::options::AppOptions;
use crate::authn::session::JwtSessionVerifier;
use crate::errors::AppError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::vercel::client::VercelClient;
use crate::vercel::deployments::DeploymentApi;

/// Run the adventus server until the shutdown signal resolves
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    info!("Initializing adventus server...");

    let api: Option<Arc<dyn DeploymentApi>> = match &options.vercel {
        Some(vercel) => {
            let client = VercelClient::new(
                &vercel.api_base_url,
                &vercel.project_id,
                vercel.token.clone(),
            )?;
            Some(Arc::new(client))
        }
        None => {
            warn!("Vercel credentials not configured; log endpoints will report the missing configuration");
            None
        }
    };

    let sessions = Arc::new(JwtSessionVerifier::new(&options.session.secret));
    let state = Arc::new(ServerState::new(api, sessions));

    let handle = serve(&options.server, state, shutdown_signal).await?;
    handle
        .await
        .map_err(|e| AppError::ServerError(e.to_string()))?
}
