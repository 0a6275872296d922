//! Linear spring-dashpot law.
//!
//! ```text
//! F_n = k_n δ - c_n δ̇ - 4π Γ R δ
//! ```
//!
//! The stiffness is calibrated so that the linear spring reproduces the
//! Hertzian contact duration at the characteristic velocity, and the
//! damping so that the collision ends with the configured restitution.
//! Because the law is linear its trajectory has a closed form, which
//! [`SpringDashpot::displacement_analytical`] evaluates on a fixed grid.

use std::f64::consts::PI;

use sim_types::{
    CollisionRecord, CollisionSample, MaterialParameters, Particle, Result, SimError, Termination,
};
use tracing::debug;

use crate::law::{
    ContactLaw, ContactLawKind, require, spring_dashpot_damping, spring_dashpot_stiffness,
    validate_inputs,
};

/// Linear spring-dashpot contact law.
///
/// # Example
///
/// ```
/// use sim_contact::{ContactLaw, SpringDashpot};
/// use sim_types::{MaterialParameters, Particle};
///
/// let material = MaterialParameters::default();
/// let particle = Particle::from_density(0.02, material.density);
/// let law = SpringDashpot::new(material, particle).unwrap();
///
/// // Pure spring at rest
/// let f = law.normal_force(1e-5, 0.0);
/// assert!((f - law.stiffness(1e-5) * 1e-5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpringDashpot {
    material: MaterialParameters,
    particle: Particle,
    stiffness: f64,
    damping: f64,
    cohesion: Option<f64>,
    limit_force: bool,
}

impl SpringDashpot {
    /// Build the law. Requires a coefficient of restitution.
    pub fn new(material: MaterialParameters, particle: Particle) -> Result<Self> {
        validate_inputs(&material, &particle)?;
        let restitution = require(
            material.coefficient_restitution,
            "coefficientRestitution",
            ContactLawKind::SpringDashpot,
        )?;

        let stiffness = spring_dashpot_stiffness(&material, &particle);
        let damping = spring_dashpot_damping(stiffness, particle.mass, restitution);

        Ok(Self {
            material,
            particle,
            stiffness,
            damping,
            cohesion: material.cohesion_energy_density,
            limit_force: ContactLawKind::SpringDashpot.limits_force_by_default(),
        })
    }

    /// Override the limit-force default.
    #[must_use]
    pub fn with_limit_force(mut self, limit_force: bool) -> Self {
        self.limit_force = limit_force;
        self
    }

    /// Damped angular frequency `ω = sqrt(k/m - (c/2m)²)`.
    #[must_use]
    pub fn damped_frequency(&self) -> f64 {
        let m = self.particle.mass;
        (self.stiffness / m - 0.25 * (self.damping / m).powi(2)).sqrt()
    }

    /// Closed-form state `[δ, δ̇]` at time `time` after first contact.
    ///
    /// ```text
    /// δ(t)  = v0/ω · exp(c t / 2m) · sin(ω t)
    /// δ̇(t) = c/2m · δ(t) + v0 · cos(ω t) · exp(c t / 2m)
    /// ```
    ///
    /// Cohesion is not included in the closed form.
    #[must_use]
    pub fn analytical_state(&self, time: f64) -> [f64; 2] {
        let m = self.particle.mass;
        let v0 = self.material.characteristic_velocity();
        let omega = self.damped_frequency();
        let decay = (0.5 * self.damping * time / m).exp();

        let overlap = v0 / omega * decay * (omega * time).sin();
        let overlap_rate = 0.5 * self.damping / m * overlap + v0 * (omega * time).cos() * decay;
        [overlap, overlap_rate]
    }

    /// Closed-form collision history.
    ///
    /// Samples `t_k = k·dt` for `k < floor(T_c / dt)`, with `dt` defaulting
    /// to 1% of the contact time. With limit-force on, every sample with a
    /// negative force is dropped.
    pub fn displacement_analytical(&self, timestep: Option<f64>) -> Result<CollisionRecord> {
        let contact_time = self.contact_time();
        let dt = timestep.unwrap_or(0.01 * contact_time);
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidTimestep(dt));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (contact_time / dt).floor() as usize;

        let mut record = CollisionRecord::new(dt, contact_time);
        record.termination = Termination::Separated;
        record.samples = (0..steps)
            .map(|k| {
                let time = k as f64 * dt;
                let [overlap, overlap_rate] = self.analytical_state(time);
                CollisionSample::new(time, overlap, overlap_rate, self.normal_force(overlap, overlap_rate))
            })
            .collect();

        if self.limit_force {
            let before = record.len();
            record.samples.retain(|s| s.force >= 0.0);
            let removed = before - record.len();
            if removed > 0 {
                record.trimmed = true;
                debug!(removed, "dropped attractive samples from analytical trajectory");
            }
        }

        Ok(record)
    }
}

impl ContactLaw for SpringDashpot {
    fn kind(&self) -> ContactLawKind {
        ContactLawKind::SpringDashpot
    }

    fn material(&self) -> &MaterialParameters {
        &self.material
    }

    fn particle(&self) -> &Particle {
        &self.particle
    }

    fn stiffness(&self, _overlap: f64) -> f64 {
        self.stiffness
    }

    fn damping_coefficient(&self, _overlap: f64) -> f64 {
        self.damping
    }

    fn elastic_force(&self, overlap: f64) -> f64 {
        self.stiffness * overlap
    }

    fn dissipative_force(&self, _overlap: f64, overlap_rate: f64) -> f64 {
        self.damping * overlap_rate
    }

    fn cohesive_force(&self, overlap: f64) -> f64 {
        self.cohesion
            .map_or(0.0, |gamma| gamma * 4.0 * PI * overlap * self.particle.radius)
    }

    fn normal_force(&self, overlap: f64, overlap_rate: f64) -> f64 {
        self.elastic_force(overlap)
            - self.dissipative_force(overlap, overlap_rate)
            - self.cohesive_force(overlap)
    }

    fn limit_force(&self) -> bool {
        self.limit_force
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn law() -> SpringDashpot {
        let material = MaterialParameters::default();
        SpringDashpot::new(material, Particle::from_density(0.02, material.density)).unwrap()
    }

    #[test]
    fn test_requires_restitution() {
        let material = MaterialParameters::new(1e7, 0.25, 1000.0);
        let err = SpringDashpot::new(material, Particle::from_density(0.02, 1000.0)).unwrap_err();
        assert!(matches!(
            err,
            SimError::MissingParameter {
                name: "coefficientRestitution",
                ..
            }
        ));
    }

    #[test]
    fn test_force_terms() {
        let law = law();
        let k = law.stiffness(0.0);
        let c = law.damping_coefficient(0.0);
        assert!(k > 0.0);
        assert!(c < 0.0);

        // Approaching increases the repulsive force
        assert!(law.normal_force(1e-5, 0.1) > law.normal_force(1e-5, 0.0));
        assert_relative_eq!(law.normal_force(1e-5, 0.1), k * 1e-5 - c * 0.1, epsilon = 1e-12);
        assert_eq!(law.cohesive_force(1e-5), 0.0);
    }

    #[test]
    fn test_cohesion_term() {
        let material = MaterialParameters::default().with_cohesion(0.05);
        let law = SpringDashpot::new(material, Particle::from_density(0.02, 1000.0)).unwrap();
        assert_relative_eq!(
            law.cohesive_force(1e-5),
            0.05 * 4.0 * PI * 1e-5 * 0.02,
            epsilon = 1e-15
        );
        assert!(law.normal_force(1e-5, 0.0) < law.elastic_force(1e-5));
    }

    #[test]
    fn test_tangential_not_implemented() {
        let err = law().tangential_force(1e-5, 0.0).unwrap_err();
        assert!(matches!(err, SimError::NotImplemented { term: "tangential", .. }));
    }

    #[test]
    fn test_analytical_boundary_states() {
        let law = law();
        let [overlap, rate] = law.analytical_state(0.0);
        assert_eq!(overlap, 0.0);
        assert_relative_eq!(rate, 0.1, epsilon = 1e-15);

        // Damped half period equals the contact time and the rebound speed
        // recovers the restitution coefficient.
        let tc = law.contact_time();
        assert_relative_eq!(law.damped_frequency() * tc, PI, max_relative = 1e-12);
        let [_, rate] = law.analytical_state(tc);
        assert_relative_eq!(rate, -0.9 * 0.1, max_relative = 1e-9);
    }

    #[test]
    fn test_analytical_grid() {
        let law = law().with_limit_force(false);
        let tc = law.contact_time();
        let record = law.displacement_analytical(None).unwrap();

        assert_eq!(record.len(), 100);
        assert_relative_eq!(record.timestep, 0.01 * tc, epsilon = 1e-18);
        assert_eq!(record.samples[0].time, 0.0);
        assert!(record.samples.iter().all(|s| s.overlap >= 0.0));
        assert!(!record.trimmed);
        // The dashpot pulls at the end of the unloading phase
        assert!(record.samples.last().unwrap().force < 0.0);
    }

    #[test]
    fn test_analytical_limit_force() {
        let law = law();
        assert!(law.limit_force());
        let record = law.displacement_analytical(Some(law.contact_time() / 250.0)).unwrap();
        assert!(record.trimmed);
        assert!(record.forces().iter().all(|&f| f >= 0.0));
        assert!(record.len() < 250);
    }

    #[test]
    fn test_analytical_rejects_bad_timestep() {
        assert!(matches!(
            law().displacement_analytical(Some(0.0)),
            Err(SimError::InvalidTimestep(_))
        ));
    }
}
