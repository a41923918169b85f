//! Recursive estimation and control filters for periodic control loops.
//!
//! Four independent components, each updated synchronously from a
//! caller-owned real-time task:
//!
//! - [`LinearKalmanFilter`] — recursive Bayesian estimator for
//!   linear-Gaussian systems
//! - [`ExtendedKalmanFilter`] — nonlinear generalization with injected
//!   model closures and user-supplied Jacobians
//! - [`PidController`] / [`VectorPid`] — discrete PID control law with
//!   output clamping and integral anti-windup
//! - [`IirFilter`] — direct-form II recursive digital filter over scalar
//!   or vector-valued signals
//!
//! Matrix and vector arithmetic goes through the aliases in
//! [`types::linalg`]; dimension agreement is checked at compile time.
//! Updates never allocate, never block, and a failed update leaves the
//! previous state intact so the owning loop can keep operating on
//! stale-but-valid estimates.

pub mod error;
pub mod filters;
pub mod types;

pub use error::{FilterError, FilterResult};
pub use filters::ekf::ExtendedKalmanFilter;
pub use filters::iir::{IirFilter, Sample};
pub use filters::kalman::LinearKalmanFilter;
pub use filters::pid::{PidConfig, PidController, Saturation, VectorPid};
