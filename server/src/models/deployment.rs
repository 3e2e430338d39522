//! Deployment models

use serde::{Deserialize, Serialize};

/// List of deployments response from the upstream API
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentListResponse {
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

/// A deployment as returned by the upstream list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    /// Upstream-assigned deployment ID
    pub uid: String,

    /// Deployment URL (host only, no scheme)
    pub url: String,

    /// Deployment state, e.g. 'READY', 'ERROR', 'BUILDING'
    #[serde(default)]
    pub state: String,

    /// Creation timestamp in epoch milliseconds
    pub created: i64,
}

/// Deployment metadata exposed to dashboard clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub id: String,
    pub url: String,
    pub state: String,
    pub created_at: i64,
}

impl From<&Deployment> for DeploymentInfo {
    fn from(deployment: &Deployment) -> Self {
        Self {
            id: deployment.uid.clone(),
            url: deployment.url.clone(),
            state: deployment.state.clone(),
            created_at: deployment.created,
        }
    }
}

/// Uniform log payload returned by both log endpoints
///
/// `logs` is always present; a placeholder string stands in when the
/// upstream has nothing to show.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    pub logs: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vercel_logs_url: Option<String>,
}

impl LogResponse {
    /// A success response carrying only a placeholder message
    pub fn placeholder(message: &str) -> Self {
        Self {
            logs: message.to_string(),
            deployment: None,
            vercel_logs_url: None,
        }
    }
}
