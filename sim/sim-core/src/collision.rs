//! Particle-wall collision integration.
//!
//! A collision starts at first contact with zero overlap and the
//! characteristic impact velocity, and follows
//!
//! ```text
//! δ̈ = -F_n(δ, δ̇) / m
//! ```
//!
//! on a fixed output grid `t_k = k·dt` until the overlap drops to the law's
//! separation threshold, the horizon is exhausted, or the integrator fails.
//!
//! [`Collision`] is a lazy iterator over output samples. The contact law
//! observes each sample before it is yielded, so hysteretic laws update their
//! branch exactly once per output interval. [`CollisionIntegrator::run`]
//! drains the iterator into a [`CollisionRecord`] and applies the
//! limit-force trim.

use nalgebra::Vector2;
use sim_contact::ContactLaw;
use sim_types::{
    CollisionRecord, CollisionSample, IntegratorConfig, Result, SimError, Termination,
};
use tracing::{debug, warn};

use crate::integrators::{DormandPrince, IntegratorStats};

/// Runs particle-wall collisions with a fixed configuration.
///
/// # Example
///
/// ```
/// use sim_contact::{ContactLawKind, ContactLawModel};
/// use sim_core::CollisionIntegrator;
/// use sim_types::{IntegratorConfig, MaterialParameters, Particle};
///
/// let material = MaterialParameters::default();
/// let particle = Particle::from_density(0.02, material.density);
/// let mut law = ContactLawModel::new(ContactLawKind::SpringDashpot, material, particle).unwrap();
///
/// let integrator = CollisionIntegrator::new(IntegratorConfig::default()).unwrap();
/// let record = integrator.run(&mut law).unwrap();
///
/// assert!(record.is_complete());
/// assert!(record.forces().iter().all(|&f| f >= 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionIntegrator {
    config: IntegratorConfig,
}

impl CollisionIntegrator {
    /// Create an integrator, validating the configuration.
    pub fn new(config: IntegratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Start a collision of `law`.
    ///
    /// Resets the law's collision history. Nothing is integrated until the
    /// returned iterator is advanced.
    pub fn collide<'a, L>(&self, law: &'a mut L) -> Result<Collision<'a, L>>
    where
        L: ContactLaw + ?Sized,
    {
        let contact_time = law.contact_time();
        if !contact_time.is_finite() || contact_time <= 0.0 {
            return Err(SimError::invalid_config(format!(
                "contact time must be positive and finite, got {contact_time}"
            )));
        }

        let timestep = self.config.output_timestep(contact_time);
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(SimError::InvalidTimestep(timestep));
        }
        let horizon = self.config.horizon(contact_time);
        let limit_force = self.config.limit_force.unwrap_or_else(|| law.limit_force());
        let velocity = law.material().characteristic_velocity();
        let mass = law.particle().mass;

        law.begin_collision();
        debug!(
            law = %law.kind(),
            contact_time,
            timestep,
            horizon,
            limit_force,
            "collision started"
        );

        Ok(Collision {
            stepper: DormandPrince::new(0.0, Vector2::new(0.0, velocity), &self.config),
            law,
            mass,
            timestep,
            horizon,
            contact_time,
            limit_force,
            steps: 0,
            termination: None,
        })
    }

    /// Run a collision of `law` to completion.
    ///
    /// Integrator failure is not an error here: the samples produced before
    /// the failure are returned with [`Termination::Failed`].
    pub fn run<L>(&self, law: &mut L) -> Result<CollisionRecord>
    where
        L: ContactLaw + ?Sized,
    {
        Ok(self.collide(law)?.into_record())
    }
}

/// Run a collision of `law` with default settings.
///
/// `timestep` fixes the output spacing; by default it is 1/1000 of the
/// horizon, which is twice the contact time.
pub fn displacement<L>(law: &mut L, timestep: Option<f64>) -> Result<CollisionRecord>
where
    L: ContactLaw + ?Sized,
{
    let mut config = IntegratorConfig::default();
    config.timestep = timestep;
    CollisionIntegrator::new(config)?.run(law)
}

/// A collision in progress: a lazy sequence of output samples.
///
/// The sequence is single-pass. Once it ends, [`termination`](Self::termination)
/// says why.
#[derive(Debug)]
pub struct Collision<'a, L: ?Sized> {
    law: &'a mut L,
    stepper: DormandPrince<2>,
    mass: f64,
    timestep: f64,
    horizon: f64,
    contact_time: f64,
    limit_force: bool,
    steps: usize,
    termination: Option<Termination>,
}

impl<L: ContactLaw + ?Sized> Collision<'_, L> {
    /// Output spacing.
    #[must_use]
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Time after which no new output interval is started.
    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Why the sequence ended, or `None` while it is still running.
    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Integrator work counters.
    #[must_use]
    pub fn stats(&self) -> IntegratorStats {
        self.stepper.stats()
    }

    /// The contact law driving this collision.
    #[must_use]
    pub fn law(&self) -> &L {
        self.law
    }

    /// Drain the remaining samples into a record and apply the limit-force
    /// trim.
    #[must_use]
    pub fn into_record(mut self) -> CollisionRecord {
        let mut record = CollisionRecord::new(self.timestep, self.contact_time);
        record.samples = self.by_ref().collect();
        record.termination = self.termination.unwrap_or(Termination::HorizonReached);

        if self.limit_force {
            let removed = record.limit_force();
            if removed > 0 {
                debug!(removed, kept = record.len(), "trimmed attractive tail");
            }
        }

        debug!(
            termination = %record.termination,
            samples = record.len(),
            accepted = self.stepper.stats().accepted,
            rejected = self.stepper.stats().rejected,
            "collision finished"
        );
        record
    }

    fn finish(&mut self, termination: Termination) {
        self.termination = Some(termination);
    }
}

impl<L: ContactLaw + ?Sized> Iterator for Collision<'_, L> {
    type Item = CollisionSample;

    fn next(&mut self) -> Option<CollisionSample> {
        if self.termination.is_some() {
            return None;
        }
        if self.stepper.time() > self.horizon {
            self.finish(Termination::HorizonReached);
            return None;
        }

        let target = (self.steps + 1) as f64 * self.timestep;
        let law = &*self.law;
        let mass = self.mass;
        let advanced = self.stepper.integrate_to(target, |_, y| {
            Vector2::new(y[1], -law.normal_force(y[0], y[1]) / mass)
        });
        if let Err(err) = advanced {
            warn!(error = %err, samples = self.steps, "collision integration failed");
            self.finish(Termination::Failed(err));
            return None;
        }
        self.steps += 1;

        let state = self.stepper.state();
        let (overlap, overlap_rate) = (state[0], state[1]);
        let force = self.law.normal_force(overlap, overlap_rate);

        if overlap <= self.law.separation_overlap() {
            self.finish(Termination::Separated);
            return None;
        }

        self.law.observe(overlap, force);
        Some(CollisionSample::new(target, overlap, overlap_rate, force))
    }
}

impl<L: ContactLaw + ?Sized> std::iter::FusedIterator for Collision<'_, L> {}
