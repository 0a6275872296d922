//! Particle geometry and inertia.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Result, SimError};

/// A spherical particle colliding with a rigid wall.
///
/// The particle is read-only for the duration of a collision.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Particle {
    /// Sphere radius (m).
    pub radius: f64,
    /// Particle mass (kg).
    pub mass: f64,
}

impl Particle {
    /// Create a particle from an explicit radius and mass.
    #[must_use]
    pub const fn new(radius: f64, mass: f64) -> Self {
        Self { radius, mass }
    }

    /// Create a solid sphere of the given density.
    ///
    /// ```
    /// use sim_types::Particle;
    ///
    /// let p = Particle::from_density(0.02, 1000.0);
    /// let expected = 1000.0 * 4.0 / 3.0 * std::f64::consts::PI * 0.02_f64.powi(3);
    /// assert!((p.mass - expected).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_density(radius: f64, density: f64) -> Self {
        Self {
            radius,
            mass: density * Self::sphere_volume(radius),
        }
    }

    /// Volume of a sphere with this particle's radius.
    #[must_use]
    pub fn volume(&self) -> f64 {
        Self::sphere_volume(self.radius)
    }

    fn sphere_volume(radius: f64) -> f64 {
        4.0 / 3.0 * std::f64::consts::PI * radius.powi(3)
    }

    /// Validate radius and mass.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SimError::invalid_particle(format!(
                "radius must be positive and finite, got {}",
                self.radius
            )));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SimError::invalid_particle(format!(
                "mass must be positive and finite, got {}",
                self.mass
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mass_from_density() {
        let p = Particle::from_density(0.02, 1000.0);
        assert_relative_eq!(p.mass, 1000.0 * p.volume(), epsilon = 1e-15);
        assert_relative_eq!(p.mass, 0.033_510_321_638_291_124, epsilon = 1e-12);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_invalid_particle() {
        assert!(Particle::new(0.0, 1.0).validate().is_err());
        assert!(Particle::new(0.01, -1.0).validate().is_err());
        assert!(Particle::new(f64::INFINITY, 1.0).validate().is_err());

        let err = Particle::new(0.01, 0.0).validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidParticle { .. }));
        assert!(err.to_string().contains("mass"));
    }
}
