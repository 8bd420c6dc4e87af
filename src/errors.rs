use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Convergence error: {0}")]
    ConvergenceError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Integration error: {0}")]
    IntegrationError(String),
}
