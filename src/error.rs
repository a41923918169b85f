use thiserror::Error;

/// Faults a filter update can signal to the caller.
///
/// These are deterministic numeric faults: retrying the same update with
/// the same inputs fails the same way. Recovery belongs to the caller —
/// skip the update, hold the previous estimate, or reset the covariance.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// The innovation covariance could not be factorized, so no Kalman
    /// gain exists. The filter state is left unchanged.
    #[error("innovation covariance is singular")]
    SingularInnovation,
}

/// Result type for filter update operations.
pub type FilterResult<T> = Result<T, FilterError>;
