use std::collections::VecDeque;
use std::ops::{Add, Mul, Sub};

use crate::types::linalg::Vector;

/// Signal sample a recursive filter can process.
///
/// Coefficients stay scalar: a sample only needs scaling by a coefficient
/// and addition/subtraction with other samples. Implemented for `f64` and
/// for fixed-size vectors, where each coefficient multiplies the whole
/// vector.
pub trait Sample:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self>
{
    /// Additive identity, used to seed the delay line and output.
    fn zero() -> Self;
}

impl Sample for f64 {
    fn zero() -> Self {
        0.0
    }
}

impl<const D: usize> Sample for Vector<D> {
    fn zero() -> Self {
        Vector::<D>::zeros()
    }
}

/// Direct-form II recursive digital filter.
///
/// Realizes `H(z) = B(z) / A(z)` with the numerator given as `b0..` and
/// the denominator as `a1..` (`a0` is taken as 1; divide both coefficient
/// sets through by `a0` before construction otherwise). The delay line is
/// a ring buffer of `max(num_dim, den_dim) - 1` entries, newest first —
/// allocated once at construction and never grown, so memory stays
/// constant over an unbounded input stream.
pub struct IirFilter<T: Sample> {
    num: Vec<f64>,
    den: Vec<f64>,
    delay_line: VecDeque<T>,
    capacity: usize,
    output: T,
}

impl<T: Sample> IirFilter<T> {
    /// Build a filter from numerator coefficients `b0..` and denominator
    /// coefficients `a1..`.
    ///
    /// # Panics
    ///
    /// Panics if `num` is empty.
    pub fn new(num: &[f64], den: &[f64]) -> Self {
        assert!(!num.is_empty(), "numerator needs at least b0");
        let capacity = usize::max(num.len() - 1, den.len());
        Self {
            num: num.to_vec(),
            den: den.to_vec(),
            delay_line: VecDeque::with_capacity(capacity),
            capacity,
            output: T::zero(),
        }
    }

    /// Compute the next output and advance the delay line.
    pub fn update(&mut self, input: T) -> T {
        let mut delay_next = input;
        for (i, &a) in self.den.iter().enumerate() {
            if let Some(&d) = self.delay_line.get(i) {
                delay_next = delay_next - d * a;
            }
        }

        let mut output = delay_next * self.num[0];
        for (i, &b) in self.num[1..].iter().enumerate() {
            if let Some(&d) = self.delay_line.get(i) {
                output = output + d * b;
            }
        }

        // Pop before push so the buffer never grows past its capacity
        if self.capacity > 0 {
            if self.delay_line.len() == self.capacity {
                self.delay_line.pop_back();
            }
            self.delay_line.push_front(delay_next);
        }

        self.output = output;
        output
    }

    /// Last computed output, without recomputation.
    pub fn get_output(&self) -> T {
        self.output
    }

    /// Number of entries currently in the delay line, bounded by
    /// `max(num_dim, den_dim) - 1`.
    pub fn delay_len(&self) -> usize {
        self.delay_line.len()
    }

    /// Clear the delay line and output, keeping the coefficients.
    pub fn reset(&mut self) {
        self.delay_line.clear();
        self.output = T::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_third_order_sequence_exact() {
        // b = [1, 2, 3], a = [1, 3, 5, 7]: rational arithmetic keeps these
        // outputs exact in f64
        let mut filter = IirFilter::<f64>::new(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]);

        let outputs: Vec<f64> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|&x| filter.update(x))
            .collect();

        assert_eq!(outputs, vec![1.0, 1.0, 2.0, -2.0]);
    }

    #[test]
    fn test_output_accessor_does_not_recompute() {
        let mut filter = IirFilter::<f64>::new(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]);
        filter.update(1.0);

        assert_eq!(filter.get_output(), 1.0);
        assert_eq!(filter.get_output(), 1.0);
    }

    #[test]
    fn test_feedforward_only() {
        // y[n] = x[n] + 2*x[n-1]
        let mut filter = IirFilter::<f64>::new(&[1.0, 2.0], &[]);

        filter.update(1.0);
        let out = filter.update(3.0);
        assert_eq!(out, 5.0);
    }

    #[test]
    fn test_vector_signal() {
        let mut filter = IirFilter::<Vector<3>>::new(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]);

        let inputs = [
            Vector::<3>::new(1.0, 7.0, 3.0),
            Vector::<3>::new(2.0, 3.0, 4.0),
            Vector::<3>::new(5.0, 3.0, 9.0),
        ];
        for input in &inputs {
            filter.update(*input);
        }

        assert_relative_eq!(filter.get_output(), Vector::<3>::new(4.0, 7.0, 8.0));
    }

    #[test]
    fn test_delay_line_stays_bounded() {
        let mut filter = IirFilter::<f64>::new(&[1.0, 2.0, 3.0], &[-0.5]);
        let capacity = 2; // max(3, 2) - 1

        for i in 0..10_000 {
            filter.update((i % 7) as f64);
            assert!(filter.delay_len() <= capacity);
        }
        assert_eq!(filter.delay_len(), capacity);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = IirFilter::<f64>::new(&[1.0, 2.0], &[-0.5]);
        filter.update(1.0);
        filter.update(2.0);

        filter.reset();
        assert_eq!(filter.delay_len(), 0);
        assert_eq!(filter.get_output(), 0.0);

        // Post-reset response matches a fresh filter
        let out = filter.update(1.0);
        assert_eq!(out, IirFilter::<f64>::new(&[1.0, 2.0], &[-0.5]).update(1.0));
    }
}
