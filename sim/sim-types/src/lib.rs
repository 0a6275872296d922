//! Core types for particle-wall contact simulation.
//!
//! This crate provides the data shared by the contact laws and the collision
//! integrator:
//!
//! - [`MaterialParameters`] - Physical constants of one particle species
//! - [`Particle`] - Sphere radius and mass
//! - [`IntegratorConfig`] - Output grid and step-size control settings
//! - [`CollisionRecord`] - Time, overlap state, and force history of a collision
//! - [`SimError`] / [`StepError`] - Configuration and integration failures
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no force laws and no
//! integration. Species records deserialize directly from the DEM
//! configuration layer (enable the `serde` feature), and collision records
//! serialize for logging and replay.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with no engine dependencies.
//!
//! # Sign Convention
//!
//! - Overlap δ is positive while the sphere penetrates the wall
//! - Overlap rate δ̇ is positive while approaching
//! - Normal force is positive when repulsive
//!
//! # Example
//!
//! ```
//! use sim_types::{MaterialParameters, Particle};
//!
//! let material = MaterialParameters::new(1e7, 0.25, 1000.0).with_restitution(0.9);
//! let particle = Particle::from_density(0.02, material.density);
//!
//! assert!(material.validate().is_ok());
//! assert!(particle.validate().is_ok());
//! assert_eq!(material.characteristic_velocity(), 0.1);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-types/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,       // usize to f64 is fine for counts
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod config;
mod error;
mod material;
mod particle;
mod record;

pub use config::IntegratorConfig;
pub use error::{SimError, StepError};
pub use material::{DEFAULT_CHARACTERISTIC_VELOCITY, DEFAULT_RESTITUTION, MaterialParameters};
pub use particle::Particle;
pub use record::{CollisionRecord, CollisionSample, Termination};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
