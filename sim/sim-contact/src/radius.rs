//! Contact-patch radius from overlap.
//!
//! Without adhesion the radius follows the Hertzian closed form:
//!
//! ```text
//! a = sqrt(δ R)
//! ```
//!
//! With adhesion (JKR) the radius satisfies
//!
//! ```text
//! δ = a²/R - sqrt(2π Γ / Y) · sqrt(a)
//! ```
//!
//! Squared, this is the quartic
//!
//! ```text
//! a⁴ + c2 a² + c1 a + c0 = 0
//! c0 = R² δ²
//! c1 = -2π Γ R² / Y
//! c2 = -2 R δ
//! ```
//!
//! which is reduced to its resolvent cubic and solved in closed form
//! (Cardano). When any intermediate of the closed form is not a finite real
//! number the solver falls back to the Hertzian radius; this is a silent,
//! local recovery and never an error.

use sim_types::MaterialParameters;
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Adhesion constants for the JKR radius solve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Adhesion {
    /// Cohesion energy density Γ (J/m²).
    pub cohesion_energy_density: f64,
    /// Effective modulus Y (Pa).
    pub effective_modulus: f64,
}

impl Adhesion {
    /// Create adhesion constants.
    #[must_use]
    pub const fn new(cohesion_energy_density: f64, effective_modulus: f64) -> Self {
        Self {
            cohesion_energy_density,
            effective_modulus,
        }
    }

    /// Adhesion constants of a material, if it is cohesive.
    #[must_use]
    pub fn from_material(material: &MaterialParameters) -> Option<Self> {
        material
            .cohesion_energy_density
            .map(|gamma| Self::new(gamma, material.effective_modulus()))
    }
}

/// Computes the contact-patch radius for a given overlap.
///
/// # Example
///
/// ```
/// use sim_contact::{Adhesion, ContactRadiusSolver};
///
/// let hertz = ContactRadiusSolver::hertz();
/// assert!((hertz.radius(1e-6, 0.02) - (1e-6_f64 * 0.02).sqrt()).abs() < 1e-15);
///
/// // Adhesion enlarges the contact patch
/// let jkr = ContactRadiusSolver::jkr(Adhesion::new(0.05, 5.3e6));
/// assert!(jkr.radius(1e-6, 0.02) > hertz.radius(1e-6, 0.02));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactRadiusSolver {
    adhesion: Option<Adhesion>,
}

impl ContactRadiusSolver {
    /// Non-adhesive solver.
    #[must_use]
    pub const fn hertz() -> Self {
        Self { adhesion: None }
    }

    /// Adhesive (JKR) solver.
    #[must_use]
    pub const fn jkr(adhesion: Adhesion) -> Self {
        Self {
            adhesion: Some(adhesion),
        }
    }

    /// Solver matching a material: adhesive exactly when cohesion is set.
    #[must_use]
    pub fn for_material(material: &MaterialParameters) -> Self {
        Self {
            adhesion: Adhesion::from_material(material),
        }
    }

    /// Adhesion constants, if adhesive.
    #[must_use]
    pub const fn adhesion(&self) -> Option<Adhesion> {
        self.adhesion
    }

    /// Contact radius for overlap `overlap` against a sphere of radius
    /// `particle_radius`. Always finite and non-negative.
    #[must_use]
    pub fn radius(&self, overlap: f64, particle_radius: f64) -> f64 {
        match self.adhesion {
            None => fallback_approx(overlap, particle_radius),
            Some(adhesion) => solve_real(overlap, particle_radius, adhesion).unwrap_or_else(|| {
                trace!(overlap, particle_radius, "JKR radius not real, using Hertzian radius");
                fallback_approx(overlap, particle_radius)
            }),
        }
    }
}

/// Hertzian radius `sqrt(δ R)`, or 0 for a non-positive overlap.
#[must_use]
pub fn fallback_approx(overlap: f64, particle_radius: f64) -> f64 {
    if overlap > 0.0 {
        (overlap * particle_radius).sqrt()
    } else {
        0.0
    }
}

/// Closed-form JKR radius.
///
/// Returns `None` when any intermediate of the closed form is not a finite
/// real number. Cube roots of negative arguments count as non-real.
///
/// Without cohesion the quartic is the perfect square `(a² - Rδ)²`, whose
/// double root the closed form only resolves to `sqrt(ε)`; that case returns
/// the Hertzian radius directly.
#[must_use]
pub fn solve_real(overlap: f64, particle_radius: f64, adhesion: Adhesion) -> Option<f64> {
    const THIRD: f64 = 1.0 / 3.0;

    let r = particle_radius;
    let gamma = adhesion.cohesion_energy_density;
    let y = adhesion.effective_modulus;

    if gamma == 0.0 {
        return (overlap >= 0.0).then_some((overlap * r).sqrt());
    }

    let c0 = r * r * overlap * overlap;
    let c1 = -2.0 * std::f64::consts::PI * gamma * r * r / y;
    let c2 = -2.0 * r * overlap;

    // Depressed resolvent cubic s³ + p s + q
    let p = -c2 * c2 / 12.0 - c0;
    let q = -c2 * c2 * c2 / 108.0 + c0 * c2 / 3.0 - c1 * c1 / 8.0;
    let discriminant = q * q / 4.0 + p * p * p / 27.0;

    let u = if discriminant > 0.0 {
        (-q / 2.0 + discriminant.sqrt()).powf(THIRD)
    } else {
        (-q / 2.0).powf(THIRD)
    };

    let s = if overlap == 0.0 {
        -5.0 / 6.0 * c2 - q.powf(THIRD)
    } else {
        -5.0 / 6.0 * c2 + u - p / (3.0 * u)
    };

    let w = (c2 + 2.0 * s).sqrt();
    if !w.is_finite() {
        return None;
    }

    let l = c1 / (2.0 * w);
    let correction = 0.5 * (w * w - 4.0 * (c2 + s + l)).sqrt();
    if !correction.is_finite() {
        return None;
    }

    let a = 0.5 * w + correction;

    (a.is_finite() && a >= 0.0).then_some(a)
}
