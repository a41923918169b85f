// kalman.rs — linear Kalman filter
//
// Recursive Bayesian state estimation for linear-Gaussian systems. The
// transition and observation matrices are supplied per update call, so a
// single filter instance can track a time-varying linear model and process
// observations of different dimensions across calls.

use nalgebra::{Const, DimMin};

use crate::error::{FilterError, FilterResult};
use crate::types::linalg::{solve_right, Matrix, Vector};

/// Linear Kalman filter over an `N`-dimensional state.
///
/// Owns the state estimate and its covariance; both are mutated only by
/// [`update`](Self::update). The covariance starts at zero — the initial
/// state is trusted exactly until process noise accumulates.
#[derive(Clone, Debug)]
pub struct LinearKalmanFilter<const N: usize> {
    /// Current state estimate
    state: Vector<N>,

    /// Estimate covariance (P)
    covariance: Matrix<N, N>,
}

impl<const N: usize> LinearKalmanFilter<N> {
    /// Create a filter starting at `initial_state` with zero covariance.
    pub fn new(initial_state: Vector<N>) -> Self {
        Self {
            state: initial_state,
            covariance: Matrix::<N, N>::zeros(),
        }
    }

    /// Run one predict + correct cycle against an `M`-dimensional
    /// observation.
    ///
    /// * `f` — state transition matrix
    /// * `u` — external input added to the predicted state
    /// * `h` — state to observation mapping matrix
    /// * `q` — process noise covariance; symmetric PSD is a caller contract
    /// * `r` — observation noise covariance; symmetric PSD is a caller
    ///   contract
    /// * `z` — observation vector
    ///
    /// If the innovation covariance is singular the update is rejected and
    /// the previous state and covariance are kept.
    pub fn update<const M: usize>(
        &mut self,
        f: &Matrix<N, N>,
        u: &Vector<N>,
        h: &Matrix<M, N>,
        q: &Matrix<N, N>,
        r: &Matrix<M, M>,
        z: &Vector<M>,
    ) -> FilterResult<()>
    where
        Const<M>: DimMin<Const<M>, Output = Const<M>>,
    {
        let state_predict = f * self.state + u;
        let cov_predict = f * self.covariance * f.transpose() + q;

        let h_t = h.transpose();
        let innovation = z - h * state_predict;
        let innovation_cov = h * cov_predict * h_t + r;

        // Gain from K * S = P_pred * H^T, solved rather than inverted
        let gain = match solve_right(&(cov_predict * h_t), &innovation_cov) {
            Some(k) => k,
            None => {
                log::warn!("kalman update rejected: innovation covariance is singular");
                return Err(FilterError::SingularInnovation);
            }
        };

        self.state = state_predict + gain * innovation;
        self.covariance = cov_predict - gain * h * cov_predict;
        Ok(())
    }

    /// Current state estimate.
    pub fn get_state(&self) -> &Vector<N> {
        &self.state
    }

    /// Current estimate covariance.
    pub fn get_covariance(&self) -> &Matrix<N, N> {
        &self.covariance
    }

    /// Overwrite the state estimate.
    pub fn set_state(&mut self, state: Vector<N>) {
        self.state = state;
    }

    /// Overwrite the estimate covariance, e.g. to re-seed uncertainty after
    /// a fault.
    pub fn set_covariance(&mut self, covariance: Matrix<N, N>) {
        self.covariance = covariance;
    }
}

impl<const N: usize> Default for LinearKalmanFilter<N> {
    fn default() -> Self {
        Self::new(Vector::<N>::zeros())
    }
}
