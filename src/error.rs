//! Application error types and user-facing banners.

use crate::config::ConfigError;
use oracle_forge_client::Error as GatewayError;


/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The gateway client failed or the backend rejected the call.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A command-line argument could not be used.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local file or terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// One-line message suitable for showing to the user.
    #[must_use]
    pub fn banner(&self) -> String {
        match self {
            AppError::Config(err) => format!("Configuration problem: {err}"),
            AppError::Gateway(err) => gateway_banner(err),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Io(err) => format!("File error: {err}"),
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidInput(_) => 2,
            AppError::Config(_) => 3,
            AppError::Gateway(GatewayError::Transport(_)) => 4,
            _ => 1,
        }
    }
}

fn gateway_banner(err: &GatewayError) -> String {
    match err {
        GatewayError::Transport(inner) if inner.is_timeout() => {
            "The Oracle Forge server took too long to answer. Try again shortly.".to_string()
        }
        GatewayError::Transport(_) => {
            "Cannot reach the Oracle Forge server. Check that it is running.".to_string()
        }
        GatewayError::RateLimited { retry_after } => match retry_after.as_deref() {
            Some(after) => format!("Too many requests. Retry after {after} seconds."),
            None => "Too many requests. Please slow down and retry.".to_string(),
        },
        GatewayError::Application { message, .. } => message.clone(),
        GatewayError::Cancelled => "Request cancelled.".to_string(),
        other => other.to_string(),
    }
}
