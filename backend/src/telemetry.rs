//! Tracing subscriber initialisation.

use tracing_subscriber::{EnvFilter, fmt};

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
#[error("tracing init failed: {message}")]
pub struct TelemetryError {
    message: String,
}

/// Install a JSON `fmt` subscriber filtered by `RUST_LOG`.
///
/// Fails when a global subscriber is already set; callers usually log the
/// error and carry on.
pub fn init_tracing() -> Result<(), TelemetryError> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
        .map_err(|e| TelemetryError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn second_install_reports_an_error() {
        drop(init_tracing());

        let err = init_tracing().expect_err("subscriber already installed");

        assert!(err.to_string().starts_with("tracing init failed"));
    }
}
