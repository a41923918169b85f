use nalgebra::{Const, DimMin};

use crate::error::{FilterError, FilterResult};
use crate::types::linalg::{solve_right, Matrix, Vector};

type TransitionFn<const N: usize, U> = Box<dyn Fn(&Vector<N>, &U) -> Vector<N>>;
type TransitionJacobianFn<const N: usize, U> = Box<dyn Fn(&Vector<N>, &U) -> Matrix<N, N>>;

/// Extended Kalman filter over an `N`-dimensional state with external
/// input type `U`.
///
/// The nonlinear transition model is injected at construction as a pair of
/// closures — the transition itself and its Jacobian with respect to the
/// state. The observation model is supplied per [`update`](Self::update)
/// call and is generic over the observation dimension, so one filter
/// instance can process heterogeneous observation types across calls.
///
/// Model closures must be pure functions of their arguments; they are
/// re-evaluated on every update. Jacobians must be first-order consistent
/// with the functions they differentiate — that is a precondition, not
/// checked at runtime.
pub struct ExtendedKalmanFilter<const N: usize, U = ()> {
    /// Current state estimate
    state: Vector<N>,

    /// Estimate covariance (P)
    covariance: Matrix<N, N>,

    /// State transition: expected next state from current state and input
    transition: TransitionFn<N, U>,

    /// Derivative of the transition with respect to the state
    transition_jacobian: TransitionJacobianFn<N, U>,
}

impl<const N: usize, U> ExtendedKalmanFilter<N, U> {
    /// Create a filter from its transition model, starting at
    /// `initial_state` with zero covariance.
    pub fn new(
        initial_state: Vector<N>,
        transition: impl Fn(&Vector<N>, &U) -> Vector<N> + 'static,
        transition_jacobian: impl Fn(&Vector<N>, &U) -> Matrix<N, N> + 'static,
    ) -> Self {
        Self {
            state: initial_state,
            covariance: Matrix::<N, N>::zeros(),
            transition: Box::new(transition),
            transition_jacobian: Box::new(transition_jacobian),
        }
    }

    /// Run one predict + correct cycle against an `M`-dimensional
    /// observation.
    ///
    /// * `observation` — measurement vector
    /// * `h` — state to expected observation mapping
    /// * `h_jacobian` — derivative of `h` with respect to the state
    /// * `q` — process noise covariance; symmetric PSD is a caller contract
    /// * `r` — observation noise covariance; symmetric PSD is a caller
    ///   contract
    /// * `input` — external input forwarded to the transition closures
    ///
    /// The transition Jacobian is evaluated at the current state; the
    /// observation model at the predicted state. If the innovation
    /// covariance is singular the update is rejected and the previous state
    /// and covariance are kept.
    pub fn update<const M: usize>(
        &mut self,
        observation: &Vector<M>,
        h: impl Fn(&Vector<N>) -> Vector<M>,
        h_jacobian: impl Fn(&Vector<N>) -> Matrix<M, N>,
        q: &Matrix<N, N>,
        r: &Matrix<M, M>,
        input: &U,
    ) -> FilterResult<()>
    where
        Const<M>: DimMin<Const<M>, Output = Const<M>>,
    {
        let state_predict = (self.transition)(&self.state, input);
        let fj = (self.transition_jacobian)(&self.state, input);
        let cov_predict = fj * self.covariance * fj.transpose() + q;

        let hj = h_jacobian(&state_predict);
        let hj_t = hj.transpose();
        let innovation = observation - h(&state_predict);
        let innovation_cov = hj * cov_predict * hj_t + r;

        let gain = match solve_right(&(cov_predict * hj_t), &innovation_cov) {
            Some(k) => k,
            None => {
                log::warn!("ekf update rejected: innovation covariance is singular");
                return Err(FilterError::SingularInnovation);
            }
        };

        self.state = state_predict + gain * innovation;
        self.covariance = cov_predict - gain * hj * cov_predict;
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

impl<const N: usize> ExtendedKalmanFilter<N, ()> {
    /// Create a filter for a system without external input: the model
    /// closures take the state only.
    pub fn autonomous(
        initial_state: Vector<N>,
        transition: impl Fn(&Vector<N>) -> Vector<N> + 'static,
        transition_jacobian: impl Fn(&Vector<N>) -> Matrix<N, N> + 'static,
    ) -> Self {
        Self::new(
            initial_state,
            move |state, _: &()| transition(state),
            move |state, _: &()| transition_jacobian(state),
        )
    }

    /// [`update`](Self::update) without an external input term.
    pub fn update_autonomous<const M: usize>(
        &mut self,
        observation: &Vector<M>,
        h: impl Fn(&Vector<N>) -> Vector<M>,
        h_jacobian: impl Fn(&Vector<N>) -> Matrix<M, N>,
        q: &Matrix<N, N>,
        r: &Matrix<M, M>,
    ) -> FilterResult<()>
    where
        Const<M>: DimMin<Const<M>, Output = Const<M>>,
    {
        self.update(observation, h, h_jacobian, q, r, &())
    }
}
