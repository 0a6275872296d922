//! Error types for contact simulation.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors that can occur while configuring or running a collision.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A material parameter is outside its physical range.
    #[error("invalid parameter {name}: {value} ({reason})")]
    InvalidParameter {
        /// Parameter name, as it appears in a species record.
        name: &'static str,
        /// The offending value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A parameter required by the selected contact law is absent.
    #[error("missing parameter {name}: required by the {law} contact law")]
    MissingParameter {
        /// Parameter name, as it appears in a species record.
        name: &'static str,
        /// The contact law that needs it.
        law: &'static str,
    },

    /// Particle radius or mass is not usable.
    #[error("invalid particle: {reason}")]
    InvalidParticle {
        /// Description of what's wrong.
        reason: String,
    },

    /// Invalid output timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Invalid integrator configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// The contact law does not provide this force term.
    #[error("{term} force is not implemented for the {law} contact law")]
    NotImplemented {
        /// The contact law that was asked.
        law: &'static str,
        /// The missing force term.
        term: &'static str,
    },
}

impl SimError {
    /// Create an invalid parameter error.
    #[must_use]
    pub const fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    /// Create a missing parameter error.
    #[must_use]
    pub const fn missing(name: &'static str, law: &'static str) -> Self {
        Self::MissingParameter { name, law }
    }

    /// Create an invalid particle error.
    #[must_use]
    pub fn invalid_particle(reason: impl Into<String>) -> Self {
        Self::InvalidParticle {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a not-implemented error.
    #[must_use]
    pub const fn not_implemented(law: &'static str, term: &'static str) -> Self {
        Self::NotImplemented { law, term }
    }

    /// Check if this error was raised while validating configuration.
    ///
    /// Configuration errors are always reported before any integration step.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::MissingParameter { .. }
                | Self::InvalidParticle { .. }
                | Self::InvalidTimestep(_)
                | Self::InvalidConfig { .. }
        )
    }
}

/// Reasons the ODE integrator gave up on a collision.
///
/// These are terminal conditions for one collision, not configuration
/// errors: the samples produced before the failure are kept.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepError {
    /// The adaptive step size shrank below what `f64` can resolve at `time`.
    #[error("step size underflow at t = {time} (h = {step})")]
    StepSizeUnderflow {
        /// Integration time when the step collapsed.
        time: f64,
        /// The rejected step size.
        step: f64,
    },

    /// More internal steps than allowed were needed for one output interval.
    #[error("exceeded {steps} internal steps at t = {time}")]
    TooManySteps {
        /// Integration time when the budget ran out.
        time: f64,
        /// The step budget.
        steps: usize,
    },

    /// The state or its derivative became `NaN` or infinite.
    #[error("non-finite state at t = {time}")]
    NonFinite {
        /// Integration time when the state diverged.
        time: f64,
    },
}

impl StepError {
    /// Integration time at which the failure occurred.
    #[must_use]
    pub const fn time(&self) -> f64 {
        match *self {
            Self::StepSizeUnderflow { time, .. }
            | Self::TooManySteps { time, .. }
            | Self::NonFinite { time } => time,
        }
    }
}
