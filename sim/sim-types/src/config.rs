//! Integrator configuration.
//!
//! Controls the output grid of a collision run and the tolerances of the
//! adaptive step-size controller that advances between output samples.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for one collision integration.
///
/// The output grid is `t_k = k·dt` for `k = 0, 1, ...` while `t_k` stays
/// within the horizon `horizon_factor · contact_time`. When `timestep` is
/// `None` the grid spacing is `horizon / samples_per_horizon`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegratorConfig {
    /// Fixed output spacing (seconds). Derived from the contact time when `None`.
    pub timestep: Option<f64>,
    /// Number of output intervals across the horizon when `timestep` is unset.
    pub samples_per_horizon: usize,
    /// Integration horizon as a multiple of the contact time.
    pub horizon_factor: f64,
    /// Relative error tolerance of the adaptive stepper.
    pub relative_tolerance: f64,
    /// Absolute error tolerance of the adaptive stepper.
    pub absolute_tolerance: f64,
    /// Maximum internal steps per output interval.
    pub max_steps: usize,
    /// Safety factor applied to step-size proposals.
    pub safety: f64,
    /// Truncate the record at the first negative force.
    ///
    /// `None` uses the contact law's own default.
    pub limit_force: Option<bool>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            timestep: None,
            samples_per_horizon: 1000,
            horizon_factor: 2.0,
            relative_tolerance: 1e-6,
            absolute_tolerance: 1e-12,
            max_steps: 500,
            safety: 0.9,
            limit_force: None,
        }
    }
}

impl IntegratorConfig {
    /// Tight tolerances for reference trajectories.
    #[must_use]
    pub fn high_accuracy() -> Self {
        Self {
            relative_tolerance: 1e-10,
            absolute_tolerance: 1e-15,
            max_steps: 5000,
            ..Default::default()
        }
    }

    /// Loose tolerances and a coarse grid for sweeps.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            samples_per_horizon: 200,
            relative_tolerance: 1e-4,
            absolute_tolerance: 1e-10,
            ..Default::default()
        }
    }

    /// Set a fixed output timestep.
    #[must_use]
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = Some(timestep);
        self
    }

    /// Set the horizon as a multiple of the contact time.
    #[must_use]
    pub fn with_horizon_factor(mut self, factor: f64) -> Self {
        self.horizon_factor = factor;
        self
    }

    /// Set the relative and absolute tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, relative: f64, absolute: f64) -> Self {
        self.relative_tolerance = relative;
        self.absolute_tolerance = absolute;
        self
    }

    /// Set the internal step budget per output interval.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Override the contact law's limit-force default.
    #[must_use]
    pub fn with_limit_force(mut self, limit_force: bool) -> Self {
        self.limit_force = Some(limit_force);
        self
    }

    /// Output spacing for a run whose contact time is `contact_time`.
    #[must_use]
    pub fn output_timestep(&self, contact_time: f64) -> f64 {
        self.timestep.unwrap_or_else(|| {
            self.horizon(contact_time) / self.samples_per_horizon.max(1) as f64
        })
    }

    /// Integration horizon for a run whose contact time is `contact_time`.
    #[must_use]
    pub fn horizon(&self, contact_time: f64) -> f64 {
        self.horizon_factor * contact_time
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(dt) = self.timestep {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(crate::SimError::InvalidTimestep(dt));
            }
        }

        if self.samples_per_horizon == 0 {
            return Err(crate::SimError::invalid_config(
                "samples_per_horizon must be at least 1",
            ));
        }

        if !self.horizon_factor.is_finite() || self.horizon_factor <= 0.0 {
            return Err(crate::SimError::invalid_config(
                "horizon_factor must be positive",
            ));
        }

        if self.relative_tolerance.is_nan()
            || self.absolute_tolerance.is_nan()
            || self.relative_tolerance <= 0.0
            || self.absolute_tolerance <= 0.0
        {
            return Err(crate::SimError::invalid_config(
                "tolerances must be positive",
            ));
        }

        if self.max_steps == 0 {
            return Err(crate::SimError::invalid_config(
                "max_steps must be at least 1",
            ));
        }

        if !(self.safety > 0.0 && self.safety <= 1.0) {
            return Err(crate::SimError::invalid_config(
                "safety factor must be in (0, 1]",
            ));
        }

        Ok(())
    }
}
