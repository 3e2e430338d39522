//! Deployment API operations

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::error;

use crate::errors::AppError;
use crate::models::deployment::{Deployment, DeploymentListResponse};
use crate::vercel::client::{RuntimeLogsOutcome, VercelClient};

/// Deployment API surface used by the log handlers
///
/// Behind a trait so handlers can be exercised against in-memory fakes.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Most recent deployment for the project, optionally restricted to a
    /// target environment. `None` when the project has no deployments.
    async fn latest_deployment(&self, target: Option<&str>)
        -> Result<Option<Deployment>, AppError>;

    /// Build event stream for a deployment, in upstream order
    async fn deployment_events(
        &self,
        deployment_id: &str,
    ) -> Result<Vec<serde_json::Value>, AppError>;

    /// Runtime log stream for a deployment
    async fn runtime_logs(&self, deployment_id: &str) -> Result<RuntimeLogsOutcome, AppError>;
}

#[async_trait]
impl DeploymentApi for VercelClient {
    async fn latest_deployment(
        &self,
        target: Option<&str>,
    ) -> Result<Option<Deployment>, AppError> {
        let mut query = vec![("projectId", self.project_id()), ("limit", "1")];
        if let Some(target) = target {
            query.push(("target", target));
        }

        let url = self.url("/v6/deployments", &query)?;
        let response: DeploymentListResponse = self.get_json(url, "deployments").await?;

        Ok(response.deployments.into_iter().next())
    }

    async fn deployment_events(
        &self,
        deployment_id: &str,
    ) -> Result<Vec<serde_json::Value>, AppError> {
        let url = self.url(&format!("/v3/deployments/{}/events", deployment_id), &[])?;
        self.get_json(url, "build logs").await
    }

    async fn runtime_logs(&self, deployment_id: &str) -> Result<RuntimeLogsOutcome, AppError> {
        let url = self.url(
            &format!(
                "/v1/projects/{}/deployments/{}/runtime-logs",
                self.project_id(),
                deployment_id
            ),
            &[],
        )?;

        let response = self.get_raw(url).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Runtime logs fetch failed: {} - {}", status, body);

            if status == StatusCode::FORBIDDEN {
                return Ok(RuntimeLogsOutcome::Forbidden);
            }
            return Ok(RuntimeLogsOutcome::Failed { status, body });
        }

        let body = response.text().await?;
        Ok(RuntimeLogsOutcome::Success { body })
    }
}
