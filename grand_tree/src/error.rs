//! Error types for the interactive app.

use thiserror::Error;
use tree_scene::SceneError;

/// Landmark detector or camera failure.  Always degraded to "no hand".
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("hand tracking device unavailable: {0}")]
    Unavailable(String),

    #[error("detector failed on frame at {timestamp_ms} ms: {message}")]
    Frame { timestamp_ms: f64, message: String },
}

/// Greeting generation failure.  Always replaced by the fallback greeting.
#[derive(Debug, Error)]
pub enum GreetingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("greeting service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed greeting response: {0}")]
    Malformed(String),

    #[error("no API key configured")]
    MissingKey,
}

/// Errors that can stop the app before or while opening its window.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}
