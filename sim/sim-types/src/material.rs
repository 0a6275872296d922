//! Material properties for one particle species.
//!
//! A [`MaterialParameters`] record carries the physical constants the
//! normal-force laws read. Optional fields are genuinely optional: their
//! presence switches behavior on (cohesion toggles adhesion) or is only
//! required by some contact laws (yield pressure for elasto-plastic contact).
//! Which fields a law needs is checked when the law is constructed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Result, SimError};

/// Impact velocity assumed when a species does not set one (m/s).
pub const DEFAULT_CHARACTERISTIC_VELOCITY: f64 = 0.1;

/// Restitution assumed by the contact-time estimate when a species does not set one.
pub const DEFAULT_RESTITUTION: f64 = 0.9;

/// Physical constants for one particle species.
///
/// Field names follow the species records of the DEM configuration layer
/// (`youngsModulus`, `poissonsRatio`, ...) when serialized.
///
/// # Example
///
/// ```
/// use sim_types::MaterialParameters;
///
/// let material = MaterialParameters::new(1e7, 0.25, 1000.0)
///     .with_restitution(0.9)
///     .with_characteristic_velocity(0.1);
///
/// assert!(material.validate().is_ok());
/// assert!((material.effective_modulus() - 1e7 / (2.0 * (1.0 - 0.0625))).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MaterialParameters {
    /// Young's modulus (Pa).
    pub youngs_modulus: f64,

    /// Poisson's ratio, in (-1, 0.5).
    pub poissons_ratio: f64,

    /// Coefficient of restitution, in (0, 1].
    ///
    /// Required by the visco-elastic laws, which derive their damping from it.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub coefficient_restitution: Option<f64>,

    /// Sliding friction coefficient. Carried for tangential consumers.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub coefficient_friction: Option<f64>,

    /// Rolling friction coefficient. Carried for tangential consumers.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub coefficient_rolling_friction: Option<f64>,

    /// Rolling viscous damping coefficient. Carried for tangential consumers.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub coefficient_rolling_viscous_damping: Option<f64>,

    /// Cohesion energy density (J/m²).
    ///
    /// When present, adhesive (JKR) contact is switched on.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub cohesion_energy_density: Option<f64>,

    /// Yield pressure (Pa). Required by the elasto-plastic law only.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub yield_press: Option<f64>,

    /// Characteristic impact velocity (m/s). Defaults to 0.1 when absent.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub characteristic_velocity: Option<f64>,

    /// Mass density (kg/m³).
    pub density: f64,
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self::new(1e7, 0.25, 1000.0)
            .with_restitution(0.9)
            .with_characteristic_velocity(DEFAULT_CHARACTERISTIC_VELOCITY)
    }
}

impl MaterialParameters {
    /// Create a record with only the always-required constants set.
    #[must_use]
    pub const fn new(youngs_modulus: f64, poissons_ratio: f64, density: f64) -> Self {
        Self {
            youngs_modulus,
            poissons_ratio,
            coefficient_restitution: None,
            coefficient_friction: None,
            coefficient_rolling_friction: None,
            coefficient_rolling_viscous_damping: None,
            cohesion_energy_density: None,
            yield_press: None,
            characteristic_velocity: None,
            density,
        }
    }

    /// Soda-lime glass beads.
    #[must_use]
    pub fn glass() -> Self {
        Self::new(63e9, 0.22, 2500.0)
            .with_restitution(0.9)
            .with_friction(0.3)
    }

    /// Hardened steel, with a yield pressure for elasto-plastic contact.
    #[must_use]
    pub fn steel() -> Self {
        Self::new(200e9, 0.3, 7800.0)
            .with_restitution(0.8)
            .with_friction(0.4)
            .with_yield_press(1.5e9)
    }

    /// Set the coefficient of restitution.
    #[must_use]
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.coefficient_restitution = Some(restitution);
        self
    }

    /// Set the sliding friction coefficient.
    #[must_use]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.coefficient_friction = Some(friction);
        self
    }

    /// Set the rolling friction and rolling viscous damping coefficients.
    #[must_use]
    pub fn with_rolling_friction(mut self, friction: f64, viscous_damping: f64) -> Self {
        self.coefficient_rolling_friction = Some(friction);
        self.coefficient_rolling_viscous_damping = Some(viscous_damping);
        self
    }

    /// Switch on adhesion with the given cohesion energy density.
    #[must_use]
    pub fn with_cohesion(mut self, energy_density: f64) -> Self {
        self.cohesion_energy_density = Some(energy_density);
        self
    }

    /// Set the yield pressure.
    #[must_use]
    pub fn with_yield_press(mut self, yield_press: f64) -> Self {
        self.yield_press = Some(yield_press);
        self
    }

    /// Set the characteristic impact velocity.
    #[must_use]
    pub fn with_characteristic_velocity(mut self, velocity: f64) -> Self {
        self.characteristic_velocity = Some(velocity);
        self
    }

    /// Effective modulus `Y / (2 (1 - ν²))` for particle-wall contact.
    ///
    /// Always recomputed from the current modulus and Poisson ratio.
    #[must_use]
    pub fn effective_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 - self.poissons_ratio * self.poissons_ratio))
    }

    /// Characteristic impact velocity, or 0.1 m/s when unset.
    #[must_use]
    pub fn characteristic_velocity(&self) -> f64 {
        self.characteristic_velocity
            .unwrap_or(DEFAULT_CHARACTERISTIC_VELOCITY)
    }

    /// Coefficient of restitution, or 0.9 when unset.
    #[must_use]
    pub fn restitution_or_default(&self) -> f64 {
        self.coefficient_restitution.unwrap_or(DEFAULT_RESTITUTION)
    }

    /// Whether adhesive contact is switched on.
    #[must_use]
    pub fn is_cohesive(&self) -> bool {
        self.cohesion_energy_density.is_some()
    }

    /// Validate every parameter that is set.
    ///
    /// This checks physical ranges only. Which optional parameters a given
    /// contact law requires is checked by the law itself.
    pub fn validate(&self) -> Result<()> {
        if !self.youngs_modulus.is_finite() || self.youngs_modulus <= 0.0 {
            return Err(SimError::invalid_parameter(
                "youngsModulus",
                self.youngs_modulus,
                "must be positive and finite",
            ));
        }
        if !(self.poissons_ratio > -1.0 && self.poissons_ratio < 0.5) {
            return Err(SimError::invalid_parameter(
                "poissonsRatio",
                self.poissons_ratio,
                "must be in (-1, 0.5)",
            ));
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(SimError::invalid_parameter(
                "density",
                self.density,
                "must be positive and finite",
            ));
        }
        if let Some(e) = self.coefficient_restitution {
            if !(e > 0.0 && e <= 1.0) {
                return Err(SimError::invalid_parameter(
                    "coefficientRestitution",
                    e,
                    "must be in (0, 1]",
                ));
            }
        }

        let non_negative = [
            ("coefficientFriction", self.coefficient_friction),
            ("coefficientRollingFriction", self.coefficient_rolling_friction),
            (
                "coefficientRollingViscousDamping",
                self.coefficient_rolling_viscous_damping,
            ),
            ("cohesionEnergyDensity", self.cohesion_energy_density),
        ];
        for (name, value) in non_negative {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(SimError::invalid_parameter(name, v, "cannot be negative"));
                }
            }
        }

        let positive = [
            ("yieldPress", self.yield_press),
            ("characteristicVelocity", self.characteristic_velocity),
        ];
        for (name, value) in positive {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(SimError::invalid_parameter(
                        name,
                        v,
                        "must be positive and finite",
                    ));
                }
            }
        }

        Ok(())
    }
}
