//! Application configuration options

use std::env;

use secrecy::SecretString;

use crate::errors::AppError;

/// Default Vercel API base URL
pub const DEFAULT_VERCEL_API_URL: &str = "https://api.vercel.com";

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// HTTP server configuration
    pub server: ServerOptions,

    /// Vercel API credentials; absent until both env vars are configured
    pub vercel: Option<VercelOptions>,

    /// Session verification configuration
    pub session: SessionOptions,
}

impl AppOptions {
    /// Build options from the environment
    ///
    /// Vercel credentials are deliberately optional here: the log endpoints
    /// report the missing configuration per request instead of preventing
    /// startup. The session secret has no such fallback.
    pub fn from_env() -> Result<Self, AppError> {
        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| AppError::ConfigError("SESSION_SECRET is not set".to_string()))?;

        let vercel = match (env::var("VERCEL_PROJECT_ID"), env::var("VERCEL_TOKEN")) {
            (Ok(project_id), Ok(token)) => Some(VercelOptions {
                project_id,
                token: token.into(),
                api_base_url: env::var("VERCEL_API_URL")
                    .unwrap_or_else(|_| DEFAULT_VERCEL_API_URL.to_string()),
            }),
            _ => None,
        };

        let mut server = ServerOptions::default();
        if let Ok(host) = env::var("HOST") {
            server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            server.port = port
                .parse()
                .map_err(|_| AppError::ConfigError(format!("Invalid PORT: {}", port)))?;
        }

        Ok(Self {
            server,
            vercel,
            session: SessionOptions {
                secret: session_secret.into(),
            },
        })
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Vercel API options
#[derive(Debug, Clone)]
pub struct VercelOptions {
    /// Project whose deployments are surfaced
    pub project_id: String,

    /// API token used for bearer authentication
    pub token: SecretString,

    /// Upstream API base URL, overridable for tests
    pub api_base_url: String,
}

/// Session verification options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Signing secret shared with the identity provider
    pub secret: SecretString,
}
