use thiserror::Error;

/// Errors raised while validating a [`TreeConfig`](crate::TreeConfig).
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("{name} must be finite and positive (got {value})")]
    InvalidDimension { name: &'static str, value: f32 },
}
