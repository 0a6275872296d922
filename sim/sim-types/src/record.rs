//! Collision histories.
//!
//! A [`CollisionRecord`] is the materialized output of one particle-wall
//! collision: equal-length series of time, overlap state, and normal force,
//! plus how the run ended.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::StepError;

/// One output sample of a collision.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionSample {
    /// Time since first contact (s).
    pub time: f64,
    /// Overlap δ (m). Positive when the sphere penetrates the wall.
    pub overlap: f64,
    /// Overlap rate δ̇ (m/s).
    pub overlap_rate: f64,
    /// Normal contact force (N). Positive is repulsive.
    pub force: f64,
}

impl CollisionSample {
    /// Create a sample.
    #[must_use]
    pub const fn new(time: f64, overlap: f64, overlap_rate: f64, force: f64) -> Self {
        Self {
            time,
            overlap,
            overlap_rate,
            force,
        }
    }

    /// Overlap state `[δ, δ̇]`.
    #[must_use]
    pub const fn state(&self) -> [f64; 2] {
        [self.overlap, self.overlap_rate]
    }
}

/// How a collision run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Termination {
    /// The overlap dropped to the separation threshold.
    Separated,
    /// The integration horizon was exhausted while still in contact.
    HorizonReached,
    /// The integrator gave up. Samples before the failure are kept.
    Failed(StepError),
}

impl Termination {
    /// Whether the run ended without an integrator failure.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Separated => write!(f, "separated"),
            Self::HorizonReached => write!(f, "horizon reached"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Displacement and force history of one collision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionRecord {
    /// Output samples, in time order.
    pub samples: Vec<CollisionSample>,
    /// How the run ended.
    pub termination: Termination,
    /// Whether the limit-force trim removed trailing samples.
    pub trimmed: bool,
    /// Output grid spacing (s).
    pub timestep: f64,
    /// Estimated contact time of the law that produced this record (s).
    pub contact_time: f64,
}

impl CollisionRecord {
    /// Create an empty record.
    #[must_use]
    pub const fn new(timestep: f64, contact_time: f64) -> Self {
        Self {
            samples: Vec::new(),
            termination: Termination::HorizonReached,
            trimmed: false,
            timestep,
            contact_time,
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the record holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample times.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Overlap states `[δ, δ̇]`, one row per sample.
    #[must_use]
    pub fn displacements(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(CollisionSample::state).collect()
    }

    /// Normal forces.
    #[must_use]
    pub fn forces(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.force).collect()
    }

    /// Sample with the largest normal force.
    #[must_use]
    pub fn peak_force(&self) -> Option<CollisionSample> {
        self.samples
            .iter()
            .copied()
            .max_by(|a, b| a.force.total_cmp(&b.force))
    }

    /// Largest overlap reached.
    #[must_use]
    pub fn max_overlap(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.overlap)
            .max_by(f64::total_cmp)
    }

    /// Time spanned by the samples.
    #[must_use]
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Secant stiffness at peak force, `F_peak / δ(F_peak)`.
    #[must_use]
    pub fn characteristic_stiffness(&self) -> Option<f64> {
        self.peak_force()
            .filter(|peak| peak.overlap > 0.0)
            .map(|peak| peak.force / peak.overlap)
    }

    /// Outgoing speed at the last sample, `-δ̇`.
    #[must_use]
    pub fn rebound_velocity(&self) -> Option<f64> {
        self.samples.last().map(|s| -s.overlap_rate)
    }

    /// Whether the run ended without an integrator failure.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.termination.is_success()
    }

    /// Truncate the record at the first sample with negative force.
    ///
    /// Nothing is removed when every force is non-negative. Returns the
    /// number of samples removed.
    pub fn limit_force(&mut self) -> usize {
        let Some(cut) = self.samples.iter().position(|s| s.force < 0.0) else {
            return 0;
        };
        let removed = self.samples.len() - cut;
        self.samples.truncate(cut);
        self.trimmed = true;
        removed
    }
}
