//! Adaptive explicit Runge-Kutta integration.
//!
//! This module provides the Dormand-Prince 5(4) embedded pair used to advance
//! the collision equation of motion. The fifth-order solution is propagated
//! and the embedded fourth-order solution estimates the local error, which
//! drives a PI step-size controller.
//!
//! # Error Control
//!
//! ```text
//! sc_i  = atol + rtol · max(|y_i|, |y_new_i|)
//! err   = sqrt( (1/N) Σ (e_i / sc_i)² )
//! accept when err ≤ 1
//! h_new = h · clamp(safety · err^(-α) · err_prev^(β), 0.2, 10)
//! ```
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector2;
//! use sim_core::integrators::DormandPrince;
//! use sim_types::IntegratorConfig;
//!
//! // Harmonic oscillator: x'' = -x
//! let mut stepper = DormandPrince::new(0.0, Vector2::new(1.0, 0.0), &IntegratorConfig::default());
//! stepper
//!     .integrate_to(std::f64::consts::PI, |_, y| Vector2::new(y[1], -y[0]))
//!     .unwrap();
//!
//! assert!((stepper.state()[0] + 1.0).abs() < 1e-5);
//! ```

use nalgebra::SVector;
use sim_types::{IntegratorConfig, StepError};

// Butcher tableau
const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19372.0 / 6561.0,
    -25360.0 / 2187.0,
    64448.0 / 6561.0,
    -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];
// Fifth-order weights; also the last stage row (FSAL)
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];
// Fifth minus fourth order weights
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const ORDER: f64 = 5.0;
const BETA: f64 = 0.04;
const ALPHA: f64 = 1.0 / ORDER - 0.75 * BETA;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Work counters of an adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegratorStats {
    /// Accepted steps.
    pub accepted: usize,
    /// Rejected steps.
    pub rejected: usize,
    /// Right-hand-side evaluations.
    pub evaluations: usize,
}

/// Dormand-Prince 5(4) integrator for `y' = f(t, y)` with `y ∈ ℝᴺ`.
///
/// The integrator keeps its step-size proposal between calls to
/// [`integrate_to`](Self::integrate_to), so a sequence of short output
/// intervals costs about as much as one long one.
#[derive(Debug, Clone)]
pub struct DormandPrince<const N: usize> {
    t: f64,
    y: SVector<f64, N>,
    step: Option<f64>,
    previous_error: f64,
    relative_tolerance: f64,
    absolute_tolerance: f64,
    safety: f64,
    max_steps: usize,
    stats: IntegratorStats,
}

impl<const N: usize> DormandPrince<N> {
    /// Create an integrator at time `t0` and state `y0`.
    #[must_use]
    pub fn new(t0: f64, y0: SVector<f64, N>, config: &IntegratorConfig) -> Self {
        Self {
            t: t0,
            y: y0,
            step: None,
            previous_error: 1e-4,
            relative_tolerance: config.relative_tolerance,
            absolute_tolerance: config.absolute_tolerance,
            safety: config.safety,
            max_steps: config.max_steps,
            stats: IntegratorStats::default(),
        }
    }

    /// Current time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SVector<f64, N> {
        self.y
    }

    /// Work done so far.
    #[must_use]
    pub fn stats(&self) -> IntegratorStats {
        self.stats
    }

    /// Step size the controller will try next, once one has been chosen.
    #[must_use]
    pub fn proposed_step(&self) -> Option<f64> {
        self.step
    }

    /// Advance to `t_end` with adaptive internal steps.
    ///
    /// The right-hand side is re-evaluated at the start of every call, so
    /// `f` may change between calls (for example when a contact law switches
    /// branch between output samples). On error the integrator stays at the
    /// last accepted state.
    pub fn integrate_to<F>(&mut self, t_end: f64, mut f: F) -> Result<(), StepError>
    where
        F: FnMut(f64, &SVector<f64, N>) -> SVector<f64, N>,
    {
        if t_end <= self.t {
            return Ok(());
        }

        let y0 = self.y;
        let mut k1 = self.eval(&mut f, self.t, &y0)?;
        let mut h = match self.step {
            Some(h) => h,
            None => self.initial_step(&mut f, &k1, t_end - self.t)?,
        };
        let mut last_rejected = false;
        let mut attempts = 0;

        while self.t < t_end {
            if attempts >= self.max_steps {
                return Err(StepError::TooManySteps {
                    time: self.t,
                    steps: self.max_steps,
                });
            }
            attempts += 1;

            let remaining = t_end - self.t;
            let min_step = 16.0 * f64::EPSILON * self.t.abs().max(remaining);
            if remaining <= min_step {
                // Closer than the time axis can resolve
                self.y += k1 * remaining;
                self.t = t_end;
                break;
            }
            if h < min_step {
                return Err(StepError::StepSizeUnderflow {
                    time: self.t,
                    step: h,
                });
            }

            let h_try = h.min(remaining);
            let (y_new, k7, error) = self.trial_step(&mut f, &k1, h_try)?;
            let norm = self.error_norm(&error, &y_new);

            if norm <= 1.0 {
                let mut factor = if norm == 0.0 {
                    MAX_FACTOR
                } else {
                    self.safety * norm.powf(-ALPHA) * self.previous_error.powf(BETA)
                };
                factor = factor.clamp(MIN_FACTOR, MAX_FACTOR);
                if last_rejected {
                    factor = factor.min(1.0);
                }

                self.t = if h_try == remaining { t_end } else { self.t + h_try };
                self.y = y_new;
                k1 = k7;
                self.previous_error = norm.max(1e-4);
                self.stats.accepted += 1;
                last_rejected = false;

                // A step shortened to land on t_end says little about the
                // step the solution allows.
                h = if h_try < h { h.max(h_try * factor) } else { h_try * factor };
            } else {
                let factor = (self.safety * norm.powf(-ALPHA)).max(MIN_FACTOR);
                h = h_try * factor;
                self.stats.rejected += 1;
                last_rejected = true;
            }
        }

        self.step = Some(h);
        Ok(())
    }

    fn eval<F>(&mut self, f: &mut F, t: f64, y: &SVector<f64, N>) -> Result<SVector<f64, N>, StepError>
    where
        F: FnMut(f64, &SVector<f64, N>) -> SVector<f64, N>,
    {
        self.stats.evaluations += 1;
        let dy = f(t, y);
        if dy.iter().all(|v| v.is_finite()) {
            Ok(dy)
        } else {
            Err(StepError::NonFinite { time: t })
        }
    }

    /// One Dormand-Prince step of size `h` from the current state.
    ///
    /// Returns the fifth-order state, the derivative there, and the
    /// embedded error estimate.
    #[allow(clippy::type_complexity)]
    fn trial_step<F>(
        &mut self,
        f: &mut F,
        k1: &SVector<f64, N>,
        h: f64,
    ) -> Result<(SVector<f64, N>, SVector<f64, N>, SVector<f64, N>), StepError>
    where
        F: FnMut(f64, &SVector<f64, N>) -> SVector<f64, N>,
    {
        let t = self.t;
        let y = self.y;

        let k2 = self.eval(f, t + C[0] * h, &(y + k1 * (h * A2[0])))?;
        let k3 = self.eval(f, t + C[1] * h, &(y + (k1 * A3[0] + k2 * A3[1]) * h))?;
        let k4 = self.eval(
            f,
            t + C[2] * h,
            &(y + (k1 * A4[0] + k2 * A4[1] + k3 * A4[2]) * h),
        )?;
        let k5 = self.eval(
            f,
            t + C[3] * h,
            &(y + (k1 * A5[0] + k2 * A5[1] + k3 * A5[2] + k4 * A5[3]) * h),
        )?;
        let k6 = self.eval(
            f,
            t + C[4] * h,
            &(y + (k1 * A6[0] + k2 * A6[1] + k3 * A6[2] + k4 * A6[3] + k5 * A6[4]) * h),
        )?;

        let y_new = y + (k1 * B[0] + k3 * B[2] + k4 * B[3] + k5 * B[4] + k6 * B[5]) * h;
        if !y_new.iter().all(|v| v.is_finite()) {
            return Err(StepError::NonFinite { time: t + h });
        }
        let k7 = self.eval(f, t + C[5] * h, &y_new)?;

        let error =
            (k1 * E[0] + k3 * E[2] + k4 * E[3] + k5 * E[4] + k6 * E[5] + k7 * E[6]) * h;
        Ok((y_new, k7, error))
    }

    fn scale(&self, a: f64, b: f64) -> f64 {
        self.absolute_tolerance + self.relative_tolerance * a.abs().max(b.abs())
    }

    fn error_norm(&self, error: &SVector<f64, N>, y_new: &SVector<f64, N>) -> f64 {
        let sum: f64 = (0..N)
            .map(|i| (error[i] / self.scale(self.y[i], y_new[i])).powi(2))
            .sum();
        (sum / N as f64).sqrt()
    }

    fn rms_scaled(&self, v: &SVector<f64, N>) -> f64 {
        let sum: f64 = (0..N)
            .map(|i| (v[i] / self.scale(self.y[i], self.y[i])).powi(2))
            .sum();
        (sum / N as f64).sqrt()
    }

    /// Starting step estimate (Hairer, Nørsett & Wanner, II.4).
    fn initial_step<F>(&mut self, f: &mut F, f0: &SVector<f64, N>, span: f64) -> Result<f64, StepError>
    where
        F: FnMut(f64, &SVector<f64, N>) -> SVector<f64, N>,
    {
        let d0 = self.rms_scaled(&self.y);
        let d1 = self.rms_scaled(f0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6 * span
        } else {
            0.01 * d0 / d1
        }
        .min(span);

        let y1 = self.y + f0 * h0;
        let f1 = self.eval(f, self.t + h0, &y1)?;
        let d2 = self.rms_scaled(&(f1 - f0)) / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6 * span)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / ORDER)
        };

        Ok((100.0 * h0).min(h1).min(span))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Vector1, Vector2};
    use std::f64::consts::PI;

    fn config() -> IntegratorConfig {
        IntegratorConfig::default()
    }

    #[test]
    fn test_exponential_decay() {
        let mut stepper = DormandPrince::new(0.0, Vector1::new(1.0), &config());
        stepper.integrate_to(1.0, |_, y| -y).unwrap();
        assert_eq!(stepper.time(), 1.0);
        assert_relative_eq!(stepper.state()[0], (-1.0_f64).exp(), max_relative = 1e-6);
    }

    #[test]
    fn test_tableau_consistency() {
        // Row sums equal the nodes
        assert_relative_eq!(A2.iter().sum::<f64>(), C[0], epsilon = 1e-15);
        assert_relative_eq!(A3.iter().sum::<f64>(), C[1], epsilon = 1e-15);
        assert_relative_eq!(A4.iter().sum::<f64>(), C[2], epsilon = 1e-14);
        assert_relative_eq!(A5.iter().sum::<f64>(), C[3], epsilon = 1e-13);
        assert_relative_eq!(A6.iter().sum::<f64>(), C[4], epsilon = 1e-13);
        assert_relative_eq!(B.iter().sum::<f64>(), 1.0, epsilon = 1e-15);
        // Both embedded solutions are consistent
        assert!(E.iter().sum::<f64>().abs() < 1e-15);
    }

    #[test]
    fn test_oscillator_over_many_intervals() {
        let mut stepper = DormandPrince::new(0.0, Vector2::new(0.0, 1.0), &config());
        let dt = 2.0 * PI / 1000.0;
        for k in 1..=1000 {
            stepper
                .integrate_to(k as f64 * dt, |_, y| Vector2::new(y[1], -y[0]))
                .unwrap();
            let t = stepper.time();
            assert!((stepper.state()[0] - t.sin()).abs() < 1e-5);
        }
        assert_relative_eq!(stepper.state()[1], 1.0, epsilon = 1e-5);

        // The step proposal carries over, so most intervals need one step
        let stats = stepper.stats();
        assert!(stats.accepted < 1100, "accepted = {}", stats.accepted);
        assert!(stepper.proposed_step().is_some());
    }

    #[test]
    fn test_backwards_target_is_noop() {
        let mut stepper = DormandPrince::new(1.0, Vector1::new(2.0), &config());
        stepper.integrate_to(0.5, |_, y| -y).unwrap();
        assert_eq!(stepper.time(), 1.0);
        assert_eq!(stepper.state()[0], 2.0);
        assert_eq!(stepper.stats().evaluations, 0);
    }

    #[test]
    fn test_too_many_steps() {
        let config = config().with_max_steps(5);
        let mut stepper = DormandPrince::new(0.0, Vector1::new(1.0), &config);
        let err = stepper.integrate_to(1.0, |_, y| y * -1e9).unwrap_err();
        assert!(matches!(err, StepError::TooManySteps { steps: 5, .. }));
        assert!(stepper.time() < 1.0);
    }

    #[test]
    fn test_non_finite_derivative() {
        let mut stepper = DormandPrince::new(0.0, Vector1::new(1.0), &config());
        let err = stepper
            .integrate_to(1.0, |t, y| if t > 0.5 { Vector1::new(f64::NAN) } else { -y })
            .unwrap_err();
        let StepError::NonFinite { time } = err else {
            unreachable!("expected a non-finite error, got {err:?}");
        };
        assert!(time > 0.5);
        assert!(stepper.time() <= 0.5);
        assert!(stepper.state()[0].is_finite());
    }
}
