use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Every attempt failed. Callers treat this as fatal.
    #[error("Could not connect to the cluster after {attempts} attempts: {last_error}")]
    Exhausted { attempts: usize, last_error: String },
}
