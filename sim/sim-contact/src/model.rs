//! Contact-law selection.
//!
//! [`ContactLawModel`] is the closed set of normal-force laws, built from a
//! [`ContactLawKind`] tag. Construction validates the material against the
//! selected law, so a missing parameter is reported before any integration.

use sim_types::{MaterialParameters, Particle, Result};

use crate::law::{ContactLaw, ContactLawKind};
use crate::{HertzMindlin, SpringDashpot, ThorntonNing};

/// One of the supported normal-force laws.
///
/// # Example
///
/// ```
/// use sim_contact::{ContactLaw, ContactLawKind, ContactLawModel};
/// use sim_types::{MaterialParameters, Particle};
///
/// let material = MaterialParameters::default();
/// let particle = Particle::from_density(0.02, material.density);
///
/// let model = ContactLawModel::new(ContactLawKind::HertzMindlin, material, particle).unwrap();
/// assert_eq!(model.kind(), ContactLawKind::HertzMindlin);
///
/// // The elasto-plastic law needs a yield pressure
/// assert!(ContactLawModel::new(ContactLawKind::ThorntonNing, material, particle).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ContactLawModel {
    /// Linear spring-dashpot.
    SpringDashpot(SpringDashpot),
    /// Hertz-Mindlin.
    HertzMindlin(HertzMindlin),
    /// Thornton-Ning elasto-plastic.
    ThorntonNing(ThorntonNing),
}

impl ContactLawModel {
    /// Build the law selected by `kind`.
    pub fn new(kind: ContactLawKind, material: MaterialParameters, particle: Particle) -> Result<Self> {
        Ok(match kind {
            ContactLawKind::SpringDashpot => Self::SpringDashpot(SpringDashpot::new(material, particle)?),
            ContactLawKind::HertzMindlin => Self::HertzMindlin(HertzMindlin::new(material, particle)?),
            ContactLawKind::ThorntonNing => Self::ThorntonNing(ThorntonNing::new(material, particle)?),
        })
    }

    /// Override the law's limit-force default.
    #[must_use]
    pub fn with_limit_force(self, limit_force: bool) -> Self {
        match self {
            Self::SpringDashpot(law) => Self::SpringDashpot(law.with_limit_force(limit_force)),
            Self::HertzMindlin(law) => Self::HertzMindlin(law.with_limit_force(limit_force)),
            Self::ThorntonNing(law) => Self::ThorntonNing(law.with_limit_force(limit_force)),
        }
    }

    /// The elasto-plastic law, if selected.
    #[must_use]
    pub fn as_thornton_ning(&self) -> Option<&ThorntonNing> {
        match self {
            Self::ThorntonNing(law) => Some(law),
            _ => None,
        }
    }

    /// The spring-dashpot law, if selected.
    #[must_use]
    pub fn as_spring_dashpot(&self) -> Option<&SpringDashpot> {
        match self {
            Self::SpringDashpot(law) => Some(law),
            _ => None,
        }
    }

    /// Yield velocity. Only the elasto-plastic law defines one.
    #[must_use]
    pub fn yield_velocity(&self) -> Option<f64> {
        self.as_thornton_ning().map(ThorntonNing::yield_velocity)
    }

    /// Yield radius. Only the elasto-plastic law defines one.
    #[must_use]
    pub fn compute_yield_radius(&self) -> Option<f64> {
        self.as_thornton_ning().map(ThorntonNing::compute_yield_radius)
    }

    fn law(&self) -> &dyn ContactLaw {
        match self {
            Self::SpringDashpot(law) => law,
            Self::HertzMindlin(law) => law,
            Self::ThorntonNing(law) => law,
        }
    }

    fn law_mut(&mut self) -> &mut dyn ContactLaw {
        match self {
            Self::SpringDashpot(law) => law,
            Self::HertzMindlin(law) => law,
            Self::ThorntonNing(law) => law,
        }
    }
}

impl From<SpringDashpot> for ContactLawModel {
    fn from(law: SpringDashpot) -> Self {
        Self::SpringDashpot(law)
    }
}

impl From<HertzMindlin> for ContactLawModel {
    fn from(law: HertzMindlin) -> Self {
        Self::HertzMindlin(law)
    }
}

impl From<ThorntonNing> for ContactLawModel {
    fn from(law: ThorntonNing) -> Self {
        Self::ThorntonNing(law)
    }
}

impl ContactLaw for ContactLawModel {
    fn kind(&self) -> ContactLawKind {
        self.law().kind()
    }

    fn material(&self) -> &MaterialParameters {
        self.law().material()
    }

    fn particle(&self) -> &Particle {
        self.law().particle()
    }

    fn stiffness(&self, overlap: f64) -> f64 {
        self.law().stiffness(overlap)
    }

    fn damping_coefficient(&self, overlap: f64) -> f64 {
        self.law().damping_coefficient(overlap)
    }

    fn elastic_force(&self, overlap: f64) -> f64 {
        self.law().elastic_force(overlap)
    }

    fn dissipative_force(&self, overlap: f64, overlap_rate: f64) -> f64 {
        self.law().dissipative_force(overlap, overlap_rate)
    }

    fn cohesive_force(&self, overlap: f64) -> f64 {
        self.law().cohesive_force(overlap)
    }

    fn normal_force(&self, overlap: f64, overlap_rate: f64) -> f64 {
        self.law().normal_force(overlap, overlap_rate)
    }

    fn tangential_force(&self, overlap: f64, overlap_rate: f64) -> Result<f64> {
        self.law().tangential_force(overlap, overlap_rate)
    }

    fn contact_time(&self) -> f64 {
        self.law().contact_time()
    }

    fn limit_force(&self) -> bool {
        self.law().limit_force()
    }

    fn separation_overlap(&self) -> f64 {
        self.law().separation_overlap()
    }

    fn begin_collision(&mut self) {
        self.law_mut().begin_collision();
    }

    fn observe(&mut self, overlap: f64, force: f64) {
        self.law_mut().observe(overlap, force);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use sim_types::SimError;

    fn inputs() -> (MaterialParameters, Particle) {
        let material = MaterialParameters::default().with_yield_press(1e5);
        (material, Particle::from_density(0.02, material.density))
    }

    #[test]
    fn test_every_kind_builds() {
        let (material, particle) = inputs();
        for kind in ContactLawKind::ALL {
            let model = ContactLawModel::new(kind, material, particle).unwrap();
            assert_eq!(model.kind(), kind);
            assert_eq!(model.limit_force(), kind.limits_force_by_default());
            assert!(model.normal_force(1e-5, 0.0) > 0.0);
        }
    }

    #[test]
    fn test_contact_time_shared_across_laws() {
        let (material, particle) = inputs();
        let times: Vec<f64> = ContactLawKind::ALL
            .iter()
            .map(|&kind| ContactLawModel::new(kind, material, particle).unwrap().contact_time())
            .collect();
        assert_eq!(times[0], times[1]);
        assert_eq!(times[1], times[2]);
    }

    #[test]
    fn test_configuration_errors_fail_fast() {
        let (_, particle) = inputs();
        let bare = MaterialParameters::new(1e7, 0.25, 1000.0);
        for kind in ContactLawKind::ALL {
            let err = ContactLawModel::new(kind, bare, particle).unwrap_err();
            assert!(err.is_config_error());
        }

        let (material, _) = inputs();
        let err = ContactLawModel::new(
            ContactLawKind::SpringDashpot,
            material,
            Particle::new(-0.02, 1.0),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidParticle { .. }));
    }

    #[test]
    fn test_yield_accessors() {
        let (material, particle) = inputs();
        let thornton = ContactLawModel::new(ContactLawKind::ThorntonNing, material, particle).unwrap();
        assert!(thornton.yield_velocity().is_some());
        assert_eq!(
            thornton.compute_yield_radius(),
            thornton.as_thornton_ning().map(ThorntonNing::yield_radius)
        );

        let hertz = ContactLawModel::new(ContactLawKind::HertzMindlin, material, particle).unwrap();
        assert!(hertz.yield_velocity().is_none());
        assert!(hertz.compute_yield_radius().is_none());
    }

    #[test]
    fn test_limit_force_override() {
        let (material, particle) = inputs();
        let model = ContactLawModel::new(ContactLawKind::ThorntonNing, material, particle)
            .unwrap()
            .with_limit_force(true);
        assert!(model.limit_force());
    }

    #[test]
    fn test_tangential_reports_law() {
        let (material, particle) = inputs();
        let model = ContactLawModel::new(ContactLawKind::ThorntonNing, material, particle).unwrap();
        let err = model.tangential_force(1e-5, 0.0).unwrap_err();
        assert_eq!(err, SimError::not_implemented("Thornton-Ning", "tangential"));
    }
}
