//! The contact-law capability interface.
//!
//! Every normal-force law exposes the same set of force terms. Stateless
//! laws ignore the collision lifecycle hooks; hysteretic laws use them to
//! track their loading history.
//!
//! # Sign Convention
//!
//! ```text
//! δ  > 0   sphere penetrates the wall
//! δ̇  > 0   approaching
//! F  > 0   repulsive
//! ```

use std::f64::consts::PI;

use sim_types::{MaterialParameters, Particle, Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Model-selection tag for a normal-force law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContactLawKind {
    /// Linear spring and dashpot.
    SpringDashpot,
    /// Hertzian spring with viscous damping.
    HertzMindlin,
    /// Thornton-Ning elasto-plastic law with hysteresis.
    ThorntonNing,
}

impl ContactLawKind {
    /// All law kinds.
    pub const ALL: [Self; 3] = [Self::SpringDashpot, Self::HertzMindlin, Self::ThorntonNing];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpringDashpot => "spring-dashpot",
            Self::HertzMindlin => "Hertz-Mindlin",
            Self::ThorntonNing => "Thornton-Ning",
        }
    }

    /// Whether samples past the first attractive force are dropped by default.
    ///
    /// The elasto-plastic law keeps them: its adhesive unloading branch is
    /// attractive by construction.
    #[must_use]
    pub const fn limits_force_by_default(self) -> bool {
        !matches!(self, Self::ThorntonNing)
    }
}

impl std::fmt::Display for ContactLawKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ContactLawKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SpringDashpot" | "spring-dashpot" | "hooke" => Ok(Self::SpringDashpot),
            "HertzMindlin" | "Hertz-Mindlin" | "hertz" => Ok(Self::HertzMindlin),
            "ThorntonNing" | "Thornton-Ning" | "hysteresis_coh/thorn" => Ok(Self::ThorntonNing),
            other => Err(SimError::invalid_config(format!(
                "unknown contact law '{other}'"
            ))),
        }
    }
}

/// A normal-force law for a sphere against a rigid wall.
///
/// Force evaluation takes `&self`: the integrator may evaluate the force at
/// trial states that are later rejected. History-dependent state changes only
/// through [`ContactLaw::begin_collision`] and [`ContactLaw::observe`], which
/// the integrator calls once per accepted output sample.
pub trait ContactLaw: std::fmt::Debug + Send + Sync {
    /// Which law this is.
    fn kind(&self) -> ContactLawKind;

    /// Material constants the law was built from.
    fn material(&self) -> &MaterialParameters;

    /// Particle the law was built for.
    fn particle(&self) -> &Particle;

    /// Stiffness `k_n` at overlap `overlap`.
    fn stiffness(&self, overlap: f64) -> f64;

    /// Viscous damping coefficient `c_n` at overlap `overlap`.
    ///
    /// Carries the sign of `ln e`, so it is non-positive.
    fn damping_coefficient(&self, overlap: f64) -> f64;

    /// Elastic (conservative) part of the normal force.
    fn elastic_force(&self, overlap: f64) -> f64;

    /// Dissipative part of the normal force.
    fn dissipative_force(&self, overlap: f64, overlap_rate: f64) -> f64;

    /// Adhesive part of the normal force, zero without cohesion.
    fn cohesive_force(&self, overlap: f64) -> f64;

    /// Total normal force.
    fn normal_force(&self, overlap: f64, overlap_rate: f64) -> f64;

    /// Tangential force.
    ///
    /// None of the provided laws model tangential contact.
    fn tangential_force(&self, _overlap: f64, _overlap_rate: f64) -> Result<f64> {
        Err(SimError::not_implemented(self.kind().name(), "tangential"))
    }

    /// Estimated collision duration.
    ///
    /// Every law uses the spring-dashpot estimate so that grids are
    /// comparable across laws.
    fn contact_time(&self) -> f64 {
        contact_time(self.material(), self.particle())
    }

    /// Whether to drop samples from the first attractive force onward.
    fn limit_force(&self) -> bool {
        self.kind().limits_force_by_default()
    }

    /// Overlap at or below which the particle has left the wall.
    fn separation_overlap(&self) -> f64 {
        0.0
    }

    /// Reset any history before a new collision.
    fn begin_collision(&mut self) {}

    /// Record an accepted sample at overlap `overlap` with force `force`.
    fn observe(&mut self, _overlap: f64, _force: f64) {}
}

/// Linear stiffness giving the Hertzian contact duration at the
/// characteristic velocity.
///
/// ```text
/// k_n = 16/15 · sqrt(R) · Y · (15 m v0² / (16 sqrt(R) Y))^(1/5)
/// ```
#[must_use]
pub fn spring_dashpot_stiffness(material: &MaterialParameters, particle: &Particle) -> f64 {
    let y = material.effective_modulus();
    let v0 = material.characteristic_velocity();
    let sqrt_r = particle.radius.sqrt();

    16.0 / 15.0 * sqrt_r * y * (15.0 * particle.mass * v0 * v0 / (16.0 * sqrt_r * y)).powf(0.2)
}

/// Spring-dashpot damping coefficient for restitution `restitution`.
///
/// ```text
/// c_n = ln(e) · sqrt(4 m k_n / (π² + ln²(e)))
/// ```
#[must_use]
pub fn spring_dashpot_damping(stiffness: f64, mass: f64, restitution: f64) -> f64 {
    let ln_e = restitution.ln();
    ln_e * (4.0 * mass * stiffness / (PI * PI + ln_e * ln_e)).sqrt()
}

/// Characteristic collision duration.
///
/// ```text
/// T_c = sqrt(m (π² + ln²(e)) / k_n)
/// ```
///
/// Uses the configured restitution, or 0.9 when the material has none.
#[must_use]
pub fn contact_time(material: &MaterialParameters, particle: &Particle) -> f64 {
    let kn = spring_dashpot_stiffness(material, particle);
    let ln_e = material.restitution_or_default().ln();
    (particle.mass * (PI * PI + ln_e * ln_e) / kn).sqrt()
}

pub(crate) fn require(
    value: Option<f64>,
    name: &'static str,
    kind: ContactLawKind,
) -> Result<f64> {
    value.ok_or(SimError::missing(name, kind.name()))
}

pub(crate) fn validate_inputs(material: &MaterialParameters, particle: &Particle) -> Result<()> {
    material.validate()?;
    particle.validate()
}
