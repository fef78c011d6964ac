//! Randomized, retrying inverse kinematics sampling.
//!
//! The sampling search asks for batches of joint configurations reaching a
//! target pose. Each requested solution slot is attempted from freshly drawn
//! random seed configurations, bounded by a retry budget; slots whose budget
//! runs out simply produce nothing, so the returned batch may be shorter
//! than requested. The search engine must tolerate partial batches.

use crate::kinematic_traits::{Joints, KinematicModel, Pose, JOINTS_COUNT};
use crate::planner_error::PlannerError;
use crate::state::{CandidateState, ConfigurationSaver};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// How many times a single solution slot will re-seed and re-solve before
/// giving up on that slot.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Randomized IK sampler over the shared kinematic model.
///
/// The random stream is supplied by the caller, so a fixed seed gives
/// reproducible sampling while separate samplers stay independent.
pub struct IkSampler<M: KinematicModel + ?Sized, R: Rng> {
    model: Rc<RefCell<M>>,
    rng: R,
    seed_distributions: [Uniform<f64>; JOINTS_COUNT],

    /// Retry budget per solution slot.
    pub max_retries: usize,
}

impl<M: KinematicModel + ?Sized, R: Rng> IkSampler<M, R> {
    /// Build a sampler whose seed distribution spans the model's joint
    /// limits. Limits that cannot form a distribution (non finite values,
    /// lower above upper) are a configuration error and fail fast here
    /// rather than looping forever during sampling.
    pub fn new(model: &Rc<RefCell<M>>, rng: R) -> Result<Self, PlannerError> {
        let (lower, upper) = model.borrow().joint_limits();

        for i in 0..JOINTS_COUNT {
            if !lower[i].is_finite() || !upper[i].is_finite() {
                return Err(PlannerError::JointLimits(format!(
                    "joint {}: non finite limit range {} .. {}",
                    i, lower[i], upper[i]
                )));
            }
            if lower[i] > upper[i] {
                return Err(PlannerError::JointLimits(format!(
                    "joint {}: lower limit {} above upper limit {}",
                    i, lower[i], upper[i]
                )));
            }
        }

        let seed_distributions =
            std::array::from_fn(|i| Uniform::new_inclusive(lower[i], upper[i]));

        Ok(IkSampler {
            model: Rc::clone(model),
            rng,
            seed_distributions,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    fn random_seed(&mut self) -> Joints {
        let distributions = &self.seed_distributions;
        let rng = &mut self.rng;
        std::array::from_fn(|i| distributions[i].sample(rng))
    }

    /// Produce up to `count` joint configurations reaching `target`.
    ///
    /// Each candidate is captured into a [`CandidateState`] the moment its
    /// solve succeeds; later mutation of the shared model cannot corrupt it.
    /// The model configuration is restored before returning on every path,
    /// including a model error (surfaced as [`PlannerError::Callback`]).
    pub fn sample_solutions(
        &mut self,
        target: &Pose,
        count: usize,
    ) -> Result<Vec<CandidateState>, PlannerError> {
        let _saver = ConfigurationSaver::new(&self.model);

        let mut solutions = Vec::with_capacity(count);
        for slot in 0..count {
            let mut solved = false;
            for attempt in 0..self.max_retries {
                let seed = self.random_seed();

                let mut model = self.model.borrow_mut();
                model.set_configuration(&seed);
                match model.solve_ik(target) {
                    Ok(true) => {
                        // Capture eagerly, not lazily.
                        let captured = model.configuration();
                        drop(model);
                        solutions.push(CandidateState::new(captured));
                        solved = true;
                    }
                    Ok(false) => {
                        debug!(slot, attempt, "IK found no solution from this seed");
                        continue;
                    }
                    Err(msg) => return Err(PlannerError::Callback(msg)),
                }
                break;
            }
            if !solved {
                debug!(slot, "retry budget exhausted, slot yields no candidate");
            }
        }

        Ok(solutions)
    }
}
