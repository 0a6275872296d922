//! Hertz-Mindlin visco-elastic law.
//!
//! ```text
//! a    = contact radius at δ
//! k_n  = 4/3 · Y · a
//! c_n  = 2 sqrt(5/6) · ln(e) / sqrt(ln²(e) + π²) · sqrt(2 m Y a)
//! F_n  = k_n δ - c_n δ̇ - 4π Γ R δ
//! ```
//!
//! Since `a ∝ sqrt(δ)` without adhesion, the elastic force grows as `δ^(3/2)`.

use std::f64::consts::PI;

use sim_types::{MaterialParameters, Particle, Result};

use crate::law::{ContactLaw, ContactLawKind, require, validate_inputs};
use crate::radius::ContactRadiusSolver;

/// Hertzian contact with overlap-dependent viscous damping.
#[derive(Debug, Clone, PartialEq)]
pub struct HertzMindlin {
    material: MaterialParameters,
    particle: Particle,
    effective_modulus: f64,
    radius_solver: ContactRadiusSolver,
    damping_factor: f64,
    cohesion: Option<f64>,
    limit_force: bool,
}

impl HertzMindlin {
    /// Build the law. Requires a coefficient of restitution.
    pub fn new(material: MaterialParameters, particle: Particle) -> Result<Self> {
        validate_inputs(&material, &particle)?;
        let restitution = require(
            material.coefficient_restitution,
            "coefficientRestitution",
            ContactLawKind::HertzMindlin,
        )?;
        let ln_e = restitution.ln();

        Ok(Self {
            material,
            particle,
            effective_modulus: material.effective_modulus(),
            radius_solver: ContactRadiusSolver::for_material(&material),
            damping_factor: 2.0 * (5.0_f64 / 6.0).sqrt() * ln_e / (ln_e * ln_e + PI * PI).sqrt(),
            cohesion: material.cohesion_energy_density,
            limit_force: ContactLawKind::HertzMindlin.limits_force_by_default(),
        })
    }

    /// Override the limit-force default.
    #[must_use]
    pub fn with_limit_force(mut self, limit_force: bool) -> Self {
        self.limit_force = limit_force;
        self
    }

    /// Contact radius at overlap `overlap`.
    #[must_use]
    pub fn contact_radius(&self, overlap: f64) -> f64 {
        self.radius_solver.radius(overlap, self.particle.radius)
    }
}

impl ContactLaw for HertzMindlin {
    fn kind(&self) -> ContactLawKind {
        ContactLawKind::HertzMindlin
    }

    fn material(&self) -> &MaterialParameters {
        &self.material
    }

    fn particle(&self) -> &Particle {
        &self.particle
    }

    fn stiffness(&self, overlap: f64) -> f64 {
        4.0 / 3.0 * self.effective_modulus * self.contact_radius(overlap)
    }

    fn damping_coefficient(&self, overlap: f64) -> f64 {
        let a = self.contact_radius(overlap);
        self.damping_factor * (2.0 * self.particle.mass * self.effective_modulus * a).sqrt()
    }

    fn elastic_force(&self, overlap: f64) -> f64 {
        self.stiffness(overlap) * overlap
    }

    fn dissipative_force(&self, overlap: f64, overlap_rate: f64) -> f64 {
        self.damping_coefficient(overlap) * overlap_rate
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
    use sim_types::SimError;

    fn law(material: MaterialParameters) -> HertzMindlin {
        HertzMindlin::new(material, Particle::from_density(0.02, material.density)).unwrap()
    }

    #[test]
    fn test_elastic_force_three_halves_power() {
        let law = law(MaterialParameters::default());
        let y = MaterialParameters::default().effective_modulus();
        let delta: f64 = 1e-5;
        let expected = 4.0 / 3.0 * y * 0.02_f64.sqrt() * delta.powf(1.5);
        assert_relative_eq!(law.elastic_force(delta), expected, max_relative = 1e-12);

        // Doubling the overlap scales the force by 2^(3/2)
        assert_relative_eq!(
            law.elastic_force(2.0 * delta) / law.elastic_force(delta),
            2.0_f64.powf(1.5),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_damping_vanishes_for_perfect_restitution() {
        let elastic = law(MaterialParameters::default().with_restitution(1.0));
        assert_eq!(elastic.damping_coefficient(1e-5), 0.0);
        assert_eq!(elastic.normal_force(1e-5, 0.3), elastic.elastic_force(1e-5));

        let damped = law(MaterialParameters::default());
        assert!(damped.damping_coefficient(1e-5) < 0.0);
        assert!(damped.normal_force(1e-5, 0.1) > damped.elastic_force(1e-5));
    }

    #[test]
    fn test_no_force_without_overlap() {
        let law = law(MaterialParameters::default());
        assert_eq!(law.elastic_force(0.0), 0.0);
        assert_eq!(law.elastic_force(-1e-6), 0.0);
        assert_eq!(law.damping_coefficient(-1e-6), 0.0);
    }

    #[test]
    fn test_cohesion_uses_adhesive_radius() {
        let plain = law(MaterialParameters::default());
        let sticky = law(MaterialParameters::default().with_cohesion(0.05));
        assert!(sticky.contact_radius(1e-6) > plain.contact_radius(1e-6));
        assert!(sticky.cohesive_force(1e-6) > 0.0);
    }

    #[test]
    fn test_requires_restitution() {
        let material = MaterialParameters::new(1e7, 0.25, 1000.0);
        let err = HertzMindlin::new(material, Particle::from_density(0.02, 1000.0)).unwrap_err();
        assert!(matches!(err, SimError::MissingParameter { .. }));
        assert!(err.to_string().contains("Hertz-Mindlin"));
    }
}
