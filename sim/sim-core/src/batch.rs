//! Batched collisions: many independent particle-wall impacts.
//!
//! Every case builds its own contact law, so cases share nothing but the
//! integrator configuration. Cases run in parallel via rayon when the
//! `parallel` feature is enabled and sequentially otherwise, with identical
//! results either way.
//!
//! # Examples
//!
//! ```
//! use sim_contact::ContactLawKind;
//! use sim_core::{CollisionBatch, CollisionCase, CollisionIntegrator};
//! use sim_types::{MaterialParameters, Particle};
//!
//! let material = MaterialParameters::default();
//! let particle = Particle::from_density(0.02, material.density);
//!
//! let batch: CollisionBatch = [ContactLawKind::SpringDashpot, ContactLawKind::HertzMindlin]
//!     .into_iter()
//!     .map(|kind| CollisionCase::new(kind, material, particle))
//!     .collect();
//!
//! let records = batch.run(&CollisionIntegrator::default());
//! assert_eq!(records.len(), 2);
//! assert!(records.iter().all(Result::is_ok));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sim_contact::{ContactLawKind, ContactLawModel};
use sim_types::{CollisionRecord, MaterialParameters, Particle, Result};

use crate::collision::CollisionIntegrator;

/// One collision to run: a law, a material and a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CollisionCase {
    /// Contact law.
    pub kind: ContactLawKind,
    /// Material of particle and wall.
    pub material: MaterialParameters,
    /// Impacting particle.
    pub particle: Particle,
}

impl CollisionCase {
    /// Create a case.
    #[must_use]
    pub const fn new(kind: ContactLawKind, material: MaterialParameters, particle: Particle) -> Self {
        Self {
            kind,
            material,
            particle,
        }
    }

    /// Build the contact law for this case.
    pub fn build(&self) -> Result<ContactLawModel> {
        ContactLawModel::new(self.kind, self.material, self.particle)
    }

    /// Build the law and run the collision.
    pub fn run(&self, integrator: &CollisionIntegrator) -> Result<CollisionRecord> {
        let mut law = self.build()?;
        integrator.run(&mut law)
    }
}

/// A list of independent collision cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionBatch {
    cases: Vec<CollisionCase>,
}

impl CollisionBatch {
    /// Create a batch from a list of cases.
    #[must_use]
    pub fn new(cases: Vec<CollisionCase>) -> Self {
        Self { cases }
    }

    /// Number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// The cases, in run order.
    #[must_use]
    pub fn cases(&self) -> &[CollisionCase] {
        &self.cases
    }

    /// Append a case.
    pub fn push(&mut self, case: CollisionCase) {
        self.cases.push(case);
    }

    // ==================== Running ====================

    /// Run every case.
    ///
    /// Returns one result per case, in case order. A case whose parameters
    /// are invalid yields an error without affecting the others.
    ///
    /// # Determinism
    ///
    /// Each case is a pure function of its own parameters and the shared
    /// configuration, so results do not depend on thread count or
    /// scheduling order.
    #[must_use]
    pub fn run(&self, integrator: &CollisionIntegrator) -> Vec<Result<CollisionRecord>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
            self.cases
                .par_iter()
                .map(|case| case.run(integrator))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.cases
                .iter()
                .map(|case| case.run(integrator))
                .collect()
        }
    }
}

impl FromIterator<CollisionCase> for CollisionBatch {
    fn from_iter<I: IntoIterator<Item = CollisionCase>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<CollisionCase> for CollisionBatch {
    fn extend<I: IntoIterator<Item = CollisionCase>>(&mut self, iter: I) {
        self.cases.extend(iter);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use sim_types::{SimError, Termination};

    fn default_case(kind: ContactLawKind) -> CollisionCase {
        let material = MaterialParameters::default();
        CollisionCase::new(kind, material, Particle::from_density(0.02, material.density))
    }

    #[test]
    fn test_batch_bookkeeping() {
        let mut batch = CollisionBatch::default();
        assert!(batch.is_empty());
        batch.push(default_case(ContactLawKind::SpringDashpot));
        batch.extend([default_case(ContactLawKind::HertzMindlin)]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.cases()[1].kind, ContactLawKind::HertzMindlin);
    }

    #[test]
    fn test_results_in_case_order() {
        let batch: CollisionBatch = [0.01, 0.02, 0.04]
            .into_iter()
            .map(|radius| {
                let material = MaterialParameters::default();
                CollisionCase::new(
                    ContactLawKind::SpringDashpot,
                    material,
                    Particle::from_density(radius, material.density),
                )
            })
            .collect();

        let records = batch.run(&CollisionIntegrator::default());
        let contact_times: Vec<f64> = records
            .iter()
            .map(|r| r.as_ref().unwrap().contact_time)
            .collect();
        // Larger particles stay in contact longer
        assert!(contact_times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_case_isolated() {
        // Thornton-Ning needs a yield pressure
        let batch = CollisionBatch::new(vec![
            default_case(ContactLawKind::ThorntonNing),
            default_case(ContactLawKind::SpringDashpot),
        ]);
        let records = batch.run(&CollisionIntegrator::default());
        assert!(matches!(
            records[0],
            Err(SimError::MissingParameter { name: "yieldPress", .. })
        ));
        assert_eq!(
            records[1].as_ref().unwrap().termination,
            Termination::Separated
        );
    }

    #[test]
    fn test_batch_matches_single_runs() {
        let integrator = CollisionIntegrator::default();
        let cases = [
            default_case(ContactLawKind::SpringDashpot),
            default_case(ContactLawKind::HertzMindlin),
        ];
        let batch: CollisionBatch = cases.into_iter().collect();
        let records = batch.run(&integrator);
        for (case, record) in cases.iter().zip(&records) {
            assert_eq!(record.as_ref().unwrap(), &case.run(&integrator).unwrap());
        }
    }
}
