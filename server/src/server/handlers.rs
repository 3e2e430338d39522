//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::authn::session::extract_session_token;
use crate::errors::AppError;
use crate::logview::format::{format_build_events, format_runtime_logs};
use crate::models::deployment::{DeploymentInfo, LogResponse};
use crate::server::state::ServerState;
use crate::utils::version_info;
use crate::vercel::client::RuntimeLogsOutcome;
use crate::vercel::deployments::DeploymentApi;

/// Error body for terminal failures
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "adventus-server".to_string(),
        version: version.version,
    })
}

/// Version response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Log viewer page handler
pub async fn logs_page_handler() -> impl IntoResponse {
    Html(include_str!("assets/logs.html"))
}

/// Check the request's session, then make sure upstream credentials exist.
/// Returns the API client or a ready-made terminal response.
fn authorize<'a>(
    state: &'a ServerState,
    headers: &HeaderMap,
) -> Result<&'a dyn DeploymentApi, Response> {
    let session = extract_session_token(headers)
        .and_then(|token| state.sessions.verify(&token).ok());

    if session.is_none() {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
            }),
        )
            .into_response());
    }

    match state.api.as_deref() {
        Some(api) => Ok(api),
        None => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Vercel credentials not configured".to_string(),
            }),
        )
            .into_response()),
    }
}

fn internal_error(context: &str, err: AppError) -> Response {
    error!("{}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Build logs handler
///
/// Resolves the latest deployment (any target), fetches its build event
/// stream and renders it as timestamped text.
pub async fn build_logs_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Response {
    let api = match authorize(&state, &headers) {
        Ok(api) => api,
        Err(response) => return response,
    };

    match fetch_build_logs(api).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => internal_error("Build logs error", e),
    }
}

async fn fetch_build_logs(api: &dyn DeploymentApi) -> Result<LogResponse, AppError> {
    let Some(deployment) = api.latest_deployment(None).await? else {
        return Ok(LogResponse::placeholder("No deployments found"));
    };

    let events = api.deployment_events(&deployment.uid).await?;
    let formatted = format_build_events(&events);

    Ok(LogResponse {
        logs: if formatted.is_empty() {
            "No build logs available".to_string()
        } else {
            formatted
        },
        deployment: Some(DeploymentInfo::from(&deployment)),
        vercel_logs_url: None,
    })
}

/// Runtime logs handler
///
/// Resolves the latest production deployment and fetches its runtime log
/// stream. A 403 from upstream is plan-gating, not an error: the response
/// degrades to a deep link into the provider's hosted log viewer.
pub async fn runtime_logs_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Response {
    let api = match authorize(&state, &headers) {
        Ok(api) => api,
        Err(response) => return response,
    };

    match fetch_runtime_logs(api).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => internal_error("Runtime logs error", e),
    }
}

async fn fetch_runtime_logs(api: &dyn DeploymentApi) -> Result<LogResponse, AppError> {
    let Some(deployment) = api.latest_deployment(Some("production")).await? else {
        return Ok(LogResponse::placeholder("No production deployments found"));
    };

    let info = DeploymentInfo::from(&deployment);

    let response = match api.runtime_logs(&deployment.uid).await? {
        RuntimeLogsOutcome::Forbidden => {
            // The provider's /_logs pathname shows the hosted log viewer
            let vercel_logs_url = format!("https://{}/_logs", deployment.url);
            LogResponse {
                logs: format!(
                    "Runtime logs are not accessible via API on the free plan.\n\n\
                     Click \"Open in Vercel\" below to view runtime logs directly.\n\n\
                     Direct link: {}",
                    vercel_logs_url
                ),
                deployment: Some(info),
                vercel_logs_url: Some(vercel_logs_url),
            }
        }
        RuntimeLogsOutcome::Failed { status, body } => LogResponse {
            logs: format!(
                "Runtime logs API error ({}): {}\n\n\
                 Note: Runtime logs are only stored for 1 hour by Vercel. \
                 For longer retention, configure Log Drains.",
                status.as_u16(),
                body
            ),
            deployment: Some(info),
            vercel_logs_url: None,
        },
        RuntimeLogsOutcome::Success { body } => {
            let formatted = format_runtime_logs(&body);
            LogResponse {
                logs: if formatted.is_empty() {
                    "No runtime logs available (logs are only kept for 1 hour)".to_string()
                } else {
                    formatted
                },
                deployment: Some(info),
                vercel_logs_url: None,
            }
        }
    };

    Ok(response)
}
