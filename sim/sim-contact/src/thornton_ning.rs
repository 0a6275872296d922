//! Thornton-Ning elasto-plastic law.
//!
//! Loading follows Hertz until the contact radius reaches the yield radius
//! `a_y`; beyond it the elastic part is capped and a plastic term grows with
//! the contact area:
//!
//! ```text
//! a < a_y:   F = 4/3 Y a³ / R                       - sqrt(8π Γ Y a³)
//! a ≥ a_y:   F = 4/3 Y a_y³ / R + π p_y (a² - a_y²) - a_y sqrt(8π Γ Y a)
//! ```
//!
//! Once the overlap starts to decrease after yielding, the law switches to
//! an elastic unloading branch about a flattened contact of radius `R_p`
//! and permanent overlap `δ_p`:
//!
//! ```text
//! R_p = 4/3 Y a_max³ / (F_max + sqrt(8π Γ Y a_max³))
//! δ_p = a_max² (1/R - 1/R_p)
//! a_u = radius(δ - δ_p, R_p)
//! F   = 4/3 Y a_u³ / R_p - sqrt(8π Γ Y a_u³)
//! ```
//!
//! The switch happens at most once per collision.

use std::f64::consts::PI;

use sim_types::{MaterialParameters, Particle, Result};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::law::{ContactLaw, ContactLawKind, require, validate_inputs};
use crate::radius::ContactRadiusSolver;

const YIELD_RADIUS_MAX_ITERATIONS: usize = 100;
const YIELD_RADIUS_TOLERANCE: f64 = 1e-12;

/// Plastic-contact geometry frozen at the loading-to-unloading transition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnloadingState {
    /// Largest overlap reached while loading.
    pub max_overlap: f64,
    /// Largest force reached while loading.
    pub max_force: f64,
    /// Contact radius at the largest overlap.
    pub max_radius: f64,
    /// Curvature radius of the flattened contact, `R_p`.
    pub plastic_radius: f64,
    /// Permanent overlap `δ_p`.
    pub plastic_overlap: f64,
    /// Overlap at which the contact separates, `δ_f`.
    pub separation_overlap: f64,
    /// Pull-off force `-1.5 R_p Γ`, with cohesion only.
    pub cutoff_force: Option<f64>,
}

/// Hysteresis phase of an elasto-plastic contact.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HysteresisPhase {
    /// Overlap has not decreased since yielding (or never yielded).
    Loading {
        /// Running maximum of the overlap.
        max_overlap: f64,
        /// Running maximum of the force.
        max_force: f64,
    },
    /// Elastic recovery about the plastically flattened contact.
    Unloading(UnloadingState),
}

impl HysteresisPhase {
    /// Phase at first contact.
    pub const INITIAL: Self = Self::Loading {
        max_overlap: 0.0,
        max_force: 0.0,
    };
}

impl Default for HysteresisPhase {
    fn default() -> Self {
        Self::INITIAL
    }
}

#[derive(Debug, Clone, Copy)]
struct ForceTerms {
    radius: f64,
    elastic: f64,
    plastic: f64,
    cohesive: f64,
}

/// Elasto-plastic contact law with loading/unloading hysteresis.
///
/// # Example
///
/// ```
/// use sim_contact::{ContactLaw, ThorntonNing};
/// use sim_types::{MaterialParameters, Particle};
///
/// let material = MaterialParameters::default().with_yield_press(1e5);
/// let particle = Particle::from_density(0.02, material.density);
/// let law = ThorntonNing::new(material, particle).unwrap();
///
/// // Without cohesion the yield radius has a closed form
/// let expected = 1e5 * std::f64::consts::PI * 0.02 / (2.0 * material.effective_modulus());
/// assert!((law.yield_radius() - expected).abs() < 1e-12);
/// assert!(!law.is_unloading());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ThorntonNing {
    material: MaterialParameters,
    particle: Particle,
    effective_modulus: f64,
    yield_press: f64,
    radius_solver: ContactRadiusSolver,
    cohesion: Option<f64>,
    yield_radius: f64,
    limit_force: bool,
    phase: HysteresisPhase,
}

impl ThorntonNing {
    /// Build the law. Requires a yield pressure.
    pub fn new(material: MaterialParameters, particle: Particle) -> Result<Self> {
        validate_inputs(&material, &particle)?;
        let yield_press = require(
            material.yield_press,
            "yieldPress",
            ContactLawKind::ThorntonNing,
        )?;

        let mut law = Self {
            material,
            particle,
            effective_modulus: material.effective_modulus(),
            yield_press,
            radius_solver: ContactRadiusSolver::for_material(&material),
            cohesion: material.cohesion_energy_density,
            yield_radius: 0.0,
            limit_force: ContactLawKind::ThorntonNing.limits_force_by_default(),
            phase: HysteresisPhase::INITIAL,
        };
        law.yield_radius = law.compute_yield_radius();
        Ok(law)
    }

    /// Override the limit-force default.
    #[must_use]
    pub fn with_limit_force(mut self, limit_force: bool) -> Self {
        self.limit_force = limit_force;
        self
    }

    /// Contact radius at the onset of yield, `a_y`.
    #[must_use]
    pub fn yield_radius(&self) -> f64 {
        self.yield_radius
    }

    /// Solve for the yield radius.
    ///
    /// Newton iteration on `f(x) = p_y x - 2Y x³/(πR) + sqrt(2ΓY/π)` with
    /// `a_y = x²`, seeded at the cohesionless root. Non-convergence is logged
    /// and the last iterate is used.
    #[must_use]
    pub fn compute_yield_radius(&self) -> f64 {
        let py = self.yield_press;
        let y = self.effective_modulus;
        let k = 2.0 * y / (PI * self.particle.radius);
        let c = self
            .cohesion
            .map_or(0.0, |gamma| (2.0 * gamma * y / PI).sqrt());

        let mut x = (py * PI * self.particle.radius / (2.0 * y)).sqrt();
        let mut residual = f64::NAN;
        for _ in 0..YIELD_RADIUS_MAX_ITERATIONS {
            residual = py * x - k * x.powi(3) + c;
            if residual.abs() <= YIELD_RADIUS_TOLERANCE * (py * x.abs() + c) {
                return x * x;
            }
            let jacobian = py - 3.0 * k * x * x;
            if jacobian == 0.0 || !jacobian.is_finite() {
                break;
            }
            x -= residual / jacobian;
        }

        warn!(
            residual,
            yield_radius = x * x,
            "yield radius solve did not converge"
        );
        x * x
    }

    /// Impact velocity above which the contact yields.
    ///
    /// ```text
    /// v_y = 1.56 · sqrt(p_y⁵ / (Y⁴ ρ))
    /// ```
    #[must_use]
    pub fn yield_velocity(&self) -> f64 {
        1.56 * (self.yield_press.powi(5) / (self.effective_modulus.powi(4) * self.material.density))
            .sqrt()
    }

    /// Current hysteresis phase.
    #[must_use]
    pub fn phase(&self) -> HysteresisPhase {
        self.phase
    }

    /// Whether the contact is on its unloading branch.
    #[must_use]
    pub fn is_unloading(&self) -> bool {
        matches!(self.phase, HysteresisPhase::Unloading(_))
    }

    fn cohesion_term(&self, gamma: f64, radius_cubed_like: f64) -> f64 {
        (8.0 * PI * gamma * self.effective_modulus * radius_cubed_like).sqrt()
    }

    fn terms(&self, overlap: f64) -> ForceTerms {
        let y = self.effective_modulus;
        match self.phase {
            HysteresisPhase::Loading { .. } => {
                let r = self.particle.radius;
                let a = self.radius_solver.radius(overlap, r);
                let ay = self.yield_radius;
                if a < ay {
                    ForceTerms {
                        radius: a,
                        elastic: 4.0 / 3.0 * y * a.powi(3) / r,
                        plastic: 0.0,
                        cohesive: self
                            .cohesion
                            .map_or(0.0, |gamma| self.cohesion_term(gamma, a.powi(3))),
                    }
                } else {
                    ForceTerms {
                        radius: a,
                        elastic: 4.0 / 3.0 * y * ay.powi(3) / r,
                        plastic: PI * self.yield_press * (a * a - ay * ay),
                        cohesive: self
                            .cohesion
                            .map_or(0.0, |gamma| ay * self.cohesion_term(gamma, a)),
                    }
                }
            }
            HysteresisPhase::Unloading(state) => {
                let rp = state.plastic_radius;
                let a = self
                    .radius_solver
                    .radius(overlap - state.plastic_overlap, rp);
                ForceTerms {
                    radius: a,
                    elastic: 4.0 / 3.0 * y * a.powi(3) / rp,
                    plastic: 0.0,
                    cohesive: self
                        .cohesion
                        .map_or(0.0, |gamma| self.cohesion_term(gamma, a.powi(3))),
                }
            }
        }
    }

    /// Freeze the plastic contact geometry from the loading maxima.
    fn unloading_state(&self, max_overlap: f64, max_force: f64) -> UnloadingState {
        let y = self.effective_modulus;
        let r = self.particle.radius;
        let max_radius = self.radius_solver.radius(max_overlap, r);

        let pull = self
            .cohesion
            .map_or(0.0, |gamma| self.cohesion_term(gamma, max_radius.powi(3)));
        let plastic_radius = 4.0 / 3.0 * y * max_radius.powi(3) / (max_force + pull);
        let plastic_overlap = max_radius * max_radius * (1.0 / r - 1.0 / plastic_radius);

        let (separation_overlap, cutoff_force) = match self.cohesion {
            Some(gamma) => (
                plastic_overlap
                    - 0.75 * (PI * PI * gamma * gamma * plastic_radius / (y * y)).powf(1.0 / 3.0),
                Some(-1.5 * plastic_radius * gamma),
            ),
            None => (plastic_overlap, None),
        };

        UnloadingState {
            max_overlap,
            max_force,
            max_radius,
            plastic_radius,
            plastic_overlap,
            separation_overlap,
            cutoff_force,
        }
    }
}

impl ContactLaw for ThorntonNing {
    fn kind(&self) -> ContactLawKind {
        ContactLawKind::ThorntonNing
    }

    fn material(&self) -> &MaterialParameters {
        &self.material
    }

    fn particle(&self) -> &Particle {
        &self.particle
    }

    fn stiffness(&self, overlap: f64) -> f64 {
        4.0 / 3.0 * self.effective_modulus * self.terms(overlap).radius
    }

    fn damping_coefficient(&self, _overlap: f64) -> f64 {
        0.0
    }

    fn elastic_force(&self, overlap: f64) -> f64 {
        self.terms(overlap).elastic
    }

    /// Plastic work term. Adds to the repulsive force while loading past yield.
    fn dissipative_force(&self, overlap: f64, _overlap_rate: f64) -> f64 {
        self.terms(overlap).plastic
    }

    fn cohesive_force(&self, overlap: f64) -> f64 {
        self.terms(overlap).cohesive
    }

    fn normal_force(&self, overlap: f64, _overlap_rate: f64) -> f64 {
        let terms = self.terms(overlap);
        terms.elastic + terms.plastic - terms.cohesive
    }

    fn limit_force(&self) -> bool {
        self.limit_force
    }

    fn separation_overlap(&self) -> f64 {
        match self.phase {
            HysteresisPhase::Loading { .. } => 0.0,
            HysteresisPhase::Unloading(state) => state.separation_overlap,
        }
    }

    fn begin_collision(&mut self) {
        self.phase = HysteresisPhase::INITIAL;
    }

    fn observe(&mut self, overlap: f64, force: f64) {
        let HysteresisPhase::Loading {
            max_overlap,
            max_force,
        } = self.phase
        else {
            return;
        };
        let max_force = max_force.max(force);

        let radius = self.radius_solver.radius(overlap, self.particle.radius);
        if overlap < max_overlap && radius >= self.yield_radius {
            let state = self.unloading_state(max_overlap, max_force);
            debug!(
                max_overlap,
                max_force,
                plastic_radius = state.plastic_radius,
                plastic_overlap = state.plastic_overlap,
                separation_overlap = state.separation_overlap,
                "contact switched to unloading"
            );
            self.phase = HysteresisPhase::Unloading(state);
        } else {
            self.phase = HysteresisPhase::Loading {
                max_overlap: max_overlap.max(overlap),
                max_force,
            };
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::HertzMindlin;
    use approx::assert_relative_eq;
    use sim_types::SimError;

    fn plastic_material() -> MaterialParameters {
        MaterialParameters::default().with_yield_press(1e5)
    }

    fn law(material: MaterialParameters) -> ThorntonNing {
        ThorntonNing::new(material, Particle::from_density(0.02, material.density)).unwrap()
    }

    /// Drive the law through a load/unload cycle the way the integrator does.
    fn cycle(law: &mut ThorntonNing, overlaps: &[f64]) {
        for &overlap in overlaps {
            let force = law.normal_force(overlap, 0.0);
            law.observe(overlap, force);
        }
    }

    #[test]
    fn test_requires_yield_press() {
        let err = ThorntonNing::new(
            MaterialParameters::default(),
            Particle::from_density(0.02, 1000.0),
        )
        .unwrap_err();
        assert_eq!(err, SimError::missing("yieldPress", "Thornton-Ning"));
    }

    #[test]
    fn test_yield_radius_with_cohesion() {
        let plain = law(plastic_material());
        let sticky = law(plastic_material().with_cohesion(0.05));
        assert_relative_eq!(
            plain.yield_radius(),
            1e5 * PI * 0.02 / (2.0 * plain.effective_modulus),
            max_relative = 1e-12
        );

        // Cohesion shifts the root outward
        let a = sticky.yield_radius();
        assert!(a > plain.yield_radius());
        let x = a.sqrt();
        let y = sticky.effective_modulus;
        let residual =
            1e5 * x - 2.0 * y * x.powi(3) / (PI * 0.02) + (2.0 * 0.05 * y / PI).sqrt();
        assert!(residual.abs() < 1e-9 * 1e5 * x);
    }

    #[test]
    fn test_yield_velocity() {
        let law = law(plastic_material());
        let y = law.effective_modulus;
        assert_relative_eq!(
            law.yield_velocity(),
            1.56 * (1e25 / (y.powi(4) * 1000.0)).sqrt(),
            max_relative = 1e-12
        );
        assert!(law.yield_velocity() < 0.1);
    }

    #[test]
    fn test_elastic_branch_matches_hertz() {
        let thornton = law(MaterialParameters::default().with_yield_press(1e20));
        let hertz = HertzMindlin::new(
            MaterialParameters::default().with_restitution(1.0),
            Particle::from_density(0.02, 1000.0),
        )
        .unwrap();
        for overlap in [1e-6, 1e-5, 1e-4] {
            assert_relative_eq!(
                thornton.normal_force(overlap, 0.05),
                hertz.normal_force(overlap, 0.05),
                max_relative = 1e-12
            );
        }
        assert_eq!(thornton.damping_coefficient(1e-5), 0.0);
    }

    #[test]
    fn test_plastic_term_past_yield() {
        let law = law(plastic_material());
        let ay = law.yield_radius();
        let overlap = 2e-4;
        let a = (overlap * 0.02_f64).sqrt();
        assert!(a > ay);
        assert_relative_eq!(
            law.dissipative_force(overlap, 0.0),
            PI * 1e5 * (a * a - ay * ay),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            law.elastic_force(overlap),
            4.0 / 3.0 * law.effective_modulus * ay.powi(3) / 0.02,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_transition_after_yield() {
        let mut law = law(plastic_material());
        cycle(&mut law, &[5e-5, 1e-4, 1.5e-4, 2e-4]);
        assert!(!law.is_unloading());

        cycle(&mut law, &[1.9e-4]);
        let HysteresisPhase::Unloading(state) = law.phase() else {
            panic!("expected unloading");
        };
        assert_eq!(state.max_overlap, 2e-4);
        assert!(state.plastic_radius > 0.02);
        assert!(state.plastic_overlap > 0.0);
        assert_eq!(state.separation_overlap, state.plastic_overlap);
        assert!(state.cutoff_force.is_none());
        assert_eq!(law.separation_overlap(), state.plastic_overlap);

        // The unloading branch starts from the loading peak
        assert_relative_eq!(
            law.normal_force(state.max_overlap, 0.0),
            state.max_force,
            max_relative = 1e-9
        );
        // and reaches zero at the permanent overlap
        assert!(law.normal_force(state.plastic_overlap, 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_transition_happens_once() {
        let mut law = law(plastic_material());
        cycle(&mut law, &[1e-4, 2e-4, 1.9e-4]);
        let first = law.phase();
        cycle(&mut law, &[2.5e-4, 1.0e-4]);
        assert_eq!(law.phase(), first);
    }

    #[test]
    fn test_elastic_contact_never_unloads() {
        let mut law = law(MaterialParameters::default().with_yield_press(1e20));
        cycle(&mut law, &[1e-4, 2e-4, 1.5e-4, 1e-5]);
        assert!(!law.is_unloading());
        assert_eq!(law.separation_overlap(), 0.0);
    }

    #[test]
    fn test_begin_collision_resets() {
        let mut law = law(plastic_material());
        cycle(&mut law, &[1e-4, 2e-4, 1.9e-4]);
        assert!(law.is_unloading());
        law.begin_collision();
        assert_eq!(law.phase(), HysteresisPhase::INITIAL);
    }

    #[test]
    fn test_cohesive_unloading_separates_below_plastic_overlap() {
        let mut law = law(plastic_material().with_cohesion(0.05));
        cycle(&mut law, &[1e-4, 2e-4, 1.9e-4]);
        let HysteresisPhase::Unloading(state) = law.phase() else {
            panic!("expected unloading");
        };
        assert!(state.separation_overlap < state.plastic_overlap);
        assert_relative_eq!(
            state.cutoff_force.unwrap(),
            -1.5 * state.plastic_radius * 0.05,
            max_relative = 1e-12
        );
        assert!(!law.limit_force());
    }
}
