//! Planning a joint space trajectory that follows an end effector path.
//!
//! The planner itself contains no search loop. It wires the distance metric,
//! the randomized IK sampler and the state guarded FK evaluator into an
//! injected sampling search ([`PathSearch`]) together with the reference
//! path and the tuning parameters, and hands back whatever trajectory the
//! search produces. An empty trajectory is the normal "no solution found"
//! outcome; callers must check for it before executing.

use crate::distance::{se3_distance, DistanceWeights};
use crate::fk_evaluator::FkEvaluator;
use crate::ik_sampler::IkSampler;
use crate::kinematic_traits::{Joints, KinematicModel, Pose};
use crate::planner_error::PlannerError;
use crate::state::{CandidateState, ConfigurationSaver};
use crate::trajectory::Trajectory;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// Tuning parameters passed through, unchanged, to the sampling search.
#[derive(Clone, Copy, Debug)]
pub struct FollowerParams {
    /// How many poses along the reference path the search treats as hard
    /// waypoints.
    pub num_waypoints: usize,

    /// How many IK candidates the search requests per waypoint query.
    pub ik_multiplier: usize,

    /// Neighbor fan-out bound used internally by the search.
    pub nearest_neighbors: usize,

    /// Interpolation density between consecutive waypoints.
    pub discretization: usize,

    /// If set, interpolated configurations are included in the output.
    /// Otherwise they are discarded, many robots can blend between
    /// waypoints better on their own.
    pub include_interpolated: bool,
}

impl Default for FollowerParams {
    fn default() -> Self {
        FollowerParams {
            num_waypoints: 5,
            ik_multiplier: 10,
            nearest_neighbors: 10,
            discretization: 3,
            include_interpolated: true,
        }
    }
}

/// The problem statement handed to the sampling search.
pub struct SearchRequest<'a> {
    /// Ordered task space curve to track.
    pub reference: &'a [Pose],
    pub params: &'a FollowerParams,
}

/// Callbacks the sampling search explores the configuration space through.
/// The search owns no kinematics of its own; everything it learns about the
/// arm goes through these.
pub struct SearchCallbacks<'a> {
    /// Task space dissimilarity between two poses.
    pub distance: Box<dyn Fn(&Pose, &Pose) -> f64 + 'a>,

    /// Up to `count` joint configurations reaching a target pose. Partial
    /// batches are expected; the search must tolerate them.
    pub ik: Box<dyn FnMut(&Pose, usize) -> Result<Vec<CandidateState>, PlannerError> + 'a>,

    /// End effector pose of a candidate, without observable model mutation.
    pub fk: Box<dyn FnMut(&CandidateState) -> Result<Pose, PlannerError> + 'a>,

    /// Externally supplied collision feasibility of a configuration.
    pub feasible: Box<dyn Fn(&Joints) -> bool + 'a>,
}

/// The externally supplied nearest neighbor guided sampling search.
///
/// Implementations explore the space of joint configurations through the
/// callbacks and select a sequence whose FK evaluated poses approximate the
/// reference path. Exhausting the search budget without a feasible solution
/// is signaled by returning an empty trajectory, not an error; errors are
/// reserved for failures inside the callbacks.
pub trait PathSearch {
    fn search(
        &self,
        request: &SearchRequest<'_>,
        callbacks: &mut SearchCallbacks<'_>,
    ) -> Result<Trajectory, PlannerError>;
}

/// Orchestrates metric, IK and FK into a configured sampling search.
pub struct PathFollower<M: KinematicModel + ?Sized, S: PathSearch> {
    pub model: Rc<RefCell<M>>,
    pub search: S,

    /// Collision feasibility of a joint configuration, supplied by the
    /// surrounding system (this crate does not represent collision
    /// geometry).
    pub collision_free: Box<dyn Fn(&Joints) -> bool>,

    /// Print a timing summary after each plan attempt.
    pub debug: bool,
}

impl<M: KinematicModel + ?Sized, S: PathSearch> PathFollower<M, S> {
    pub fn new(
        model: &Rc<RefCell<M>>,
        search: S,
        collision_free: Box<dyn Fn(&Joints) -> bool>,
    ) -> Self {
        PathFollower {
            model: Rc::clone(model),
            search,
            collision_free,
            debug: false,
        }
    }

    /// Plan a trajectory whose end effector path stays close to `reference`
    /// under the weighted SE(3) metric.
    ///
    /// The caller owns the reference path and the weights; neither is
    /// retained beyond this call. The random stream drives IK seeding, so a
    /// fixed seed makes the attempt reproducible. The model configuration is
    /// snapshot for the whole call and restored on every exit path, also
    /// when a callback fails mid search.
    ///
    /// Returns an empty trajectory when the search exhausts its budget
    /// without a feasible solution; callback failures surface as
    /// [`PlannerError::Callback`].
    pub fn plan<'a, R: Rng + 'a>(
        &'a self,
        rng: R,
        reference: &[Pose],
        weights: &DistanceWeights,
        params: &FollowerParams,
    ) -> Result<Trajectory, PlannerError> {
        if reference.is_empty() {
            return Err(PlannerError::EmptyReferencePath);
        }

        let _saver = ConfigurationSaver::new(&self.model);

        let mut sampler = IkSampler::new(&self.model, rng)?;
        let evaluator = FkEvaluator::new(&self.model);
        let weights = *weights;

        let mut callbacks = SearchCallbacks {
            distance: Box::new(move |first, second| se3_distance(first, second, &weights)),
            ik: Box::new(move |target, count| sampler.sample_solutions(target, count)),
            fk: Box::new(move |state| evaluator.evaluate(state)),
            feasible: Box::new(|joints| (self.collision_free)(joints)),
        };

        let request = SearchRequest { reference, params };

        let started = Instant::now();
        let trajectory = self.search.search(&request, &mut callbacks)?;
        if self.debug {
            println!(
                "Path following search took {:?}, {} points",
                started.elapsed(),
                trajectory.len()
            );
        }
        Ok(trajectory)
    }
}
