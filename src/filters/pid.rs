// pid.rs — discrete PID control law
//
// Scalar and element-wise vector variants sharing the same update law:
//
//   output = P·e + I·dt·(integral + e) + D·(e − e_prev)/dt
//
// With clamping enabled, the integral only accumulates while the previous
// output was not saturated in the direction of the new contribution, and
// the clamped bound that was hit is recorded as the saturation state.

use serde::{Deserialize, Serialize};

use crate::types::linalg::Vector;

/// Which clamp bound, if any, the last output hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Saturation {
    None,
    Low,
    High,
}

/// Gains and clamp bounds for a PID controller.
///
/// Immutable once a controller is built from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Output clamp bounds `(low, high)`; `None` disables clamping and
    /// anti-windup.
    pub clamp: Option<(f64, f64)>,
}

impl PidConfig {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            clamp: None,
        }
    }

    /// Clamp the output to `[low, high]` and enable integral anti-windup.
    pub fn with_clamp(mut self, low: f64, high: f64) -> Self {
        self.clamp = Some((low, high));
        self
    }

    /// Build a scalar controller.
    pub fn build(self) -> PidController {
        PidController::new(self)
    }
}

/// Discrete PID controller over a scalar error signal.
#[derive(Clone, Debug)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    clamp: Option<(f64, f64)>,

    output: f64,
    integral: f64,
    prev_input: f64,
    saturation: Saturation,
}

impl PidController {
    pub fn new(config: PidConfig) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            clamp: config.clamp,
            output: 0.0,
            integral: 0.0,
            prev_input: 0.0,
            saturation: Saturation::None,
        }
    }

    /// Advance the controller with the next error sample and return the
    /// control output.
    ///
    /// `dt` must be positive; the derivative term is undefined at
    /// `dt = 0`.
    pub fn update(&mut self, input: f64, dt: f64) -> f64 {
        debug_assert!(dt > 0.0, "dt must be positive");

        let proposed_integral = self.integral + input;
        let mut output = self.kp * input
            + self.ki * dt * proposed_integral
            + self.kd * (input - self.prev_input) / dt;

        match self.clamp {
            Some((low, high)) => {
                // Contribute to the integral only when not winding further
                // into an existing saturation
                if (input >= 0.0 && self.saturation != Saturation::High)
                    || (input <= 0.0 && self.saturation != Saturation::Low)
                {
                    self.integral = proposed_integral;
                }

                self.saturation = if output >= high {
                    output = high;
                    Saturation::High
                } else if output <= low {
                    output = low;
                    Saturation::Low
                } else {
                    Saturation::None
                };
            }
            None => self.integral = proposed_integral,
        }

        self.prev_input = input;
        self.output = output;
        output
    }

    /// Last computed output.
    pub fn get_output(&self) -> f64 {
        self.output
    }

    /// Saturation state after the last update.
    pub fn get_saturation(&self) -> Saturation {
        self.saturation
    }

    /// Clear integral, derivative memory, and saturation state, keeping
    /// the gains and bounds.
    pub fn reset(&mut self) {
        self.output = 0.0;
        self.integral = 0.0;
        self.prev_input = 0.0;
        self.saturation = Saturation::None;
    }
}

/// Element-wise PID over an `N`-dimensional error signal.
///
/// Gains are scalar and apply to every component; clamp bounds and the
/// saturation state are tracked per component.
#[derive(Clone, Debug)]
pub struct VectorPid<const N: usize> {
    kp: f64,
    ki: f64,
    kd: f64,
    clamp: Option<(Vector<N>, Vector<N>)>,

    output: Vector<N>,
    integral: Vector<N>,
    prev_input: Vector<N>,
    saturation: [Saturation; N],
}

impl<const N: usize> VectorPid<N> {
    /// Build from a scalar config; scalar clamp bounds apply to every
    /// component.
    pub fn new(config: PidConfig) -> Self {
        let clamp = config
            .clamp
            .map(|(low, high)| (Vector::<N>::repeat(low), Vector::<N>::repeat(high)));
        Self::with_bounds(config.kp, config.ki, config.kd, clamp)
    }

    /// Build with per-component clamp bounds, overriding any scalar clamp
    /// in `config`.
    pub fn with_component_clamp(config: PidConfig, low: Vector<N>, high: Vector<N>) -> Self {
        Self::with_bounds(config.kp, config.ki, config.kd, Some((low, high)))
    }

    fn with_bounds(kp: f64, ki: f64, kd: f64, clamp: Option<(Vector<N>, Vector<N>)>) -> Self {
        Self {
            kp,
            ki,
            kd,
            clamp,
            output: Vector::<N>::zeros(),
            integral: Vector::<N>::zeros(),
            prev_input: Vector::<N>::zeros(),
            saturation: [Saturation::None; N],
        }
    }

    /// Advance the controller with the next error vector; every step of
    /// the scalar update law is applied element-wise.
    ///
    /// `dt` must be positive; the derivative term is undefined at
    /// `dt = 0`.
    pub fn process(&mut self, input: &Vector<N>, dt: f64) -> Vector<N> {
        debug_assert!(dt > 0.0, "dt must be positive");

        let proposed_integral = self.integral + input;
        let mut output = input * self.kp
            + proposed_integral * (self.ki * dt)
            + (input - self.prev_input) * (self.kd / dt);

        match &self.clamp {
            Some((low, high)) => {
                for i in 0..N {
                    if (input[i] >= 0.0 && self.saturation[i] != Saturation::High)
                        || (input[i] <= 0.0 && self.saturation[i] != Saturation::Low)
                    {
                        self.integral[i] += input[i];
                    }

                    self.saturation[i] = if output[i] >= high[i] {
                        output[i] = high[i];
                        Saturation::High
                    } else if output[i] <= low[i] {
                        output[i] = low[i];
                        Saturation::Low
                    } else {
                        Saturation::None
                    };
                }
            }
            None => self.integral = proposed_integral,
        }

        self.prev_input = *input;
        self.output = output;
        output
    }

    /// Last computed output.
    pub fn get_output(&self) -> &Vector<N> {
        &self.output
    }

    /// Per-component saturation state after the last update.
    pub fn get_saturation(&self) -> &[Saturation; N] {
        &self.saturation
    }

    /// Clear integral, derivative memory, and saturation state, keeping
    /// the gains and bounds.
    pub fn reset(&mut self) {
        self.output = Vector::<N>::zeros();
        self.integral = Vector::<N>::zeros();
        self.prev_input = Vector::<N>::zeros();
        self.saturation = [Saturation::None; N];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unclamped_terms() {
        // P=2, I=1, D=0.5 at dt=1, hand-computed two-step response
        let mut pid = PidConfig::new(2.0, 1.0, 0.5).build();

        let out1 = pid.update(1.0, 1.0);
        // P: 2.0, I: 1*(0+1) = 1.0, D: 0.5*(1-0) = 0.5
        assert_relative_eq!(out1, 3.5);

        let out2 = pid.update(2.0, 1.0);
        // P: 4.0, I: 1*(1+2) = 3.0, D: 0.5*(2-1) = 0.5
        assert_relative_eq!(out2, 7.5);
    }

    #[test]
    fn test_dt_scales_integral_and_derivative() {
        let mut pid = PidConfig::new(0.0, 1.0, 0.0).build();

        let out1 = pid.update(2.0, 0.5);
        // I: 1 * 0.5 * (0+2) = 1.0
        assert_relative_eq!(out1, 1.0);

        let out2 = pid.update(2.0, 0.5);
        // I: 1 * 0.5 * (2+2) = 2.0
        assert_relative_eq!(out2, 2.0);
        assert_relative_eq!(pid.integral, 4.0);
    }

    #[test]
    fn test_anti_windup_integral_freezes_while_saturated() {
        let mut pid = PidConfig::new(1.0, 1.0, 0.0).with_clamp(-1.0, 1.0).build();

        pid.update(5.0, 1.0);
        assert_eq!(pid.get_saturation(), Saturation::High);
        let integral_after_one = pid.integral;

        for _ in 0..10 {
            let out = pid.update(5.0, 1.0);
            assert_eq!(out, 1.0);
            assert_eq!(pid.get_saturation(), Saturation::High);
        }

        // N saturated updates with the same input leave the integral where
        // one update left it
        assert_eq!(pid.integral, integral_after_one);
    }

    #[test]
    fn test_opposing_input_unwinds_despite_saturation() {
        let mut pid = PidConfig::new(1.0, 0.1, 0.0).with_clamp(-2.0, 2.0).build();

        pid.update(10.0, 1.0);
        assert_eq!(pid.get_saturation(), Saturation::High);
        let integral_before = pid.integral;

        // A negative input still contributes while saturated high
        pid.update(-1.0, 1.0);
        assert!(pid.integral < integral_before);
        assert_eq!(pid.get_saturation(), Saturation::None);
    }

    #[test]
    fn test_low_saturation_reported_and_released() {
        let mut pid = PidConfig::new(2.0, 0.0, 0.0).with_clamp(-1.0, 1.0).build();

        let out = pid.update(-3.0, 1.0);
        assert_eq!(out, -1.0);
        assert_eq!(pid.get_saturation(), Saturation::Low);

        let out = pid.update(0.1, 1.0);
        assert_relative_eq!(out, 0.2);
        assert_eq!(pid.get_saturation(), Saturation::None);
    }

    #[test]
    fn test_reset_clears_state_keeps_gains() {
        let mut pid = PidConfig::new(1.0, 1.0, 1.0).build();
        pid.update(5.0, 1.0);
        pid.update(3.0, 1.0);
        assert!(pid.get_output() != 0.0);

        pid.reset();
        assert_eq!(pid.get_output(), 0.0);
        assert_eq!(pid.get_saturation(), Saturation::None);

        // Gains survive: first post-reset step matches a fresh controller
        let out = pid.update(1.0, 1.0);
        assert_relative_eq!(out, PidConfig::new(1.0, 1.0, 1.0).build().update(1.0, 1.0));
    }

    #[test]
    fn test_vector_pid_elementwise_saturation_masks() {
        let mut pid = VectorPid::<2>::new(PidConfig::new(2.0, 1.0, 0.0).with_clamp(-5.0, 5.0));

        let out = pid.process(&Vector::<2>::new(1.0, -4.0), 1.0);
        assert_relative_eq!(out, Vector::<2>::new(3.0, -5.0));
        assert_eq!(*pid.get_saturation(), [Saturation::None, Saturation::Low]);

        let out = pid.process(&Vector::<2>::new(2.0, -4.0), 1.0);
        assert_relative_eq!(out, Vector::<2>::new(5.0, -5.0));
        assert_eq!(*pid.get_saturation(), [Saturation::High, Saturation::Low]);

        // Saturated component frozen, the other still accumulating
        assert_relative_eq!(pid.integral, Vector::<2>::new(3.0, -4.0));
    }

    #[test]
    fn test_vector_pid_per_component_bounds() {
        let mut pid = VectorPid::<2>::with_component_clamp(
            PidConfig::new(1.0, 0.0, 0.0),
            Vector::<2>::new(-1.0, -10.0),
            Vector::<2>::new(1.0, 10.0),
        );

        let out = pid.process(&Vector::<2>::new(4.0, 4.0), 1.0);
        assert_relative_eq!(out, Vector::<2>::new(1.0, 4.0));
        assert_eq!(*pid.get_saturation(), [Saturation::High, Saturation::None]);
    }
}
