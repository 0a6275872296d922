//! Normal contact laws for a sphere colliding with a rigid wall.
//!
//! This crate provides the force side of a particle-wall collision: given
//! the overlap `δ` and overlap rate `δ̇`, each law returns the normal force
//! the wall exerts on the particle.
//!
//! - [`SpringDashpot`] - Linear spring and dashpot, calibrated to the
//!   Hertzian contact time. Has a closed-form trajectory.
//! - [`HertzMindlin`] - Hertzian spring (`F ∝ δ^(3/2)`) with viscous damping
//! - [`ThorntonNing`] - Elasto-plastic loading with elastic unloading about
//!   a flattened contact. Carries hysteresis state across a collision.
//!
//! All laws share the [`ContactLaw`] interface, and [`ContactLawModel`]
//! selects one of them from a [`ContactLawKind`] tag.
//!
//! # Contact Radius
//!
//! Hertzian laws compute the contact-patch radius through
//! [`ContactRadiusSolver`]. With cohesion present the solver switches to the
//! adhesive (JKR) relation and falls back to the Hertzian radius whenever
//! the closed-form root is not real.
//!
//! # Example
//!
//! ```
//! use sim_contact::{ContactLaw, ContactLawKind, ContactLawModel};
//! use sim_types::{MaterialParameters, Particle};
//!
//! let material = MaterialParameters::default();
//! let particle = Particle::from_density(0.02, material.density);
//! let law = ContactLawModel::new(ContactLawKind::SpringDashpot, material, particle).unwrap();
//!
//! // Approaching contact: repulsive force
//! assert!(law.normal_force(1e-5, 0.1) > 0.0);
//!
//! // Contact duration estimate, shared by every law
//! let tc = law.contact_time();
//! assert!(tc > 0.0 && tc < 0.01);
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no engine dependencies. It can be used in:
//!
//! - Collision integrators
//! - Calibration of DEM material parameters
//! - Analysis tools

#![doc(html_root_url = "https://docs.rs/sim-contact/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]

mod hertz_mindlin;
mod law;
mod model;
mod radius;
mod spring_dashpot;
mod thornton_ning;

pub use hertz_mindlin::HertzMindlin;
pub use law::{
    ContactLaw, ContactLawKind, contact_time, spring_dashpot_damping, spring_dashpot_stiffness,
};
pub use model::ContactLawModel;
pub use radius::{Adhesion, ContactRadiusSolver, fallback_approx, solve_real};
pub use spring_dashpot::SpringDashpot;
pub use thornton_ning::{HysteresisPhase, ThorntonNing, UnloadingState};

// Re-export types needed to build a contact law
pub use sim_types::{MaterialParameters, Particle};
