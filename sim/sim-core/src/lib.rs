//! Collision integration for a sphere hitting a rigid wall.
//!
//! This crate drives the contact laws of [`sim_contact`] through time. A
//! collision is the initial value problem
//!
//! ```text
//! m·δ̈ = -F_n(δ, δ̇),    δ(0) = 0,    δ̇(0) = v₀
//! ```
//!
//! solved with an adaptive embedded Runge-Kutta scheme and reported on a
//! fixed output grid.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CollisionBatch                           │
//! │  Independent cases, parallel via rayon                       │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   CollisionIntegrator                        │
//! │  Output grid, separation test, hysteresis updates, trimming │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Integrators                             │
//! │  Dormand-Prince 5(4) with PI step-size control              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no engine dependencies. It can be used in:
//!
//! - DEM parameter calibration
//! - Headless parameter sweeps
//! - Analysis tools
//!
//! # Quick Start
//!
//! ```
//! use sim_core::{CollisionIntegrator, ContactLawKind, ContactLawModel};
//! use sim_types::{IntegratorConfig, MaterialParameters, Particle, Termination};
//!
//! let material = MaterialParameters::default().with_yield_press(1e5);
//! let particle = Particle::from_density(0.02, material.density);
//! let mut law = ContactLawModel::new(ContactLawKind::ThorntonNing, material, particle).unwrap();
//!
//! let integrator = CollisionIntegrator::new(IntegratorConfig::default()).unwrap();
//! let record = integrator.run(&mut law).unwrap();
//!
//! assert_eq!(record.termination, Termination::Separated);
//!
//! // Plastic dissipation: the particle leaves slower than it arrived
//! let rebound = record.rebound_velocity().unwrap();
//! assert!(rebound < material.characteristic_velocity());
//! ```
//!
//! # Streaming
//!
//! [`CollisionIntegrator::collide`] returns a lazy iterator, so a caller can
//! stop early or inspect samples as they are produced:
//!
//! ```
//! use sim_core::{CollisionIntegrator, ContactLawKind, ContactLawModel};
//! use sim_types::{MaterialParameters, Particle};
//!
//! let material = MaterialParameters::default();
//! let particle = Particle::from_density(0.02, material.density);
//! let mut law = ContactLawModel::new(ContactLawKind::HertzMindlin, material, particle).unwrap();
//!
//! let integrator = CollisionIntegrator::default();
//! let peak = integrator
//!     .collide(&mut law)
//!     .unwrap()
//!     .map(|sample| sample.overlap)
//!     .fold(0.0, f64::max);
//! assert!(peak > 0.0);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-core/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]

mod batch;
mod collision;
pub mod integrators;

pub use batch::{CollisionBatch, CollisionCase};
pub use collision::{Collision, CollisionIntegrator, displacement};
pub use integrators::{DormandPrince, IntegratorStats};

// Re-export key types from the lower layers for convenience
pub use sim_contact::{ContactLaw, ContactLawKind, ContactLawModel};
pub use sim_types::{
    CollisionRecord, CollisionSample, IntegratorConfig, MaterialParameters, Particle, Result,
    SimError, StepError, Termination,
};
