//! Rust implementation of reference-path constrained trajectory planning for
//! six axis robotic arms.
//!
//! Given a recorded sequence of target end effector poses (a reference path
//! in task space), the planner searches for a joint space trajectory whose
//! forward-kinematics path stays close to the reference under a weighted
//! SE(3) distance, subject to joint limits and an externally supplied
//! collision feasibility check. The heavy lifting is split between small,
//! separately testable pieces:
//!
//! - a pose path codec for the recorded 12-value-per-row file format
//!   ([`path_io`]),
//! - the weighted SE(3) metric with circularly wrapped Euler rotation error
//!   ([`distance`]),
//! - a retrying, randomized-seed inverse kinematics sampler
//!   ([`ik_sampler`]),
//! - a forward kinematics evaluator that never leaves a trace on the shared
//!   kinematic model ([`fk_evaluator`], [`state`]),
//! - the orchestrating planner with its injectable sampling search seam
//!   ([`follow`]) and a default nearest neighbor guided search
//!   ([`nn_search`]),
//! - the pre-execution alignment step that relocates the arm to the
//!   trajectory start ([`alignment`]).
//!
//! The arm itself stays behind the [`kinematic_traits::KinematicModel`]
//! trait: the crate plans for any model exposing its current configuration,
//! joint limits, forward kinematics and a seeded IK solve. Planning is
//! single threaded and blocking; the shared model is only ever mutated under
//! a scoped save/restore guard, so a plan attempt, successful or not, leaves
//! the arm configuration untouched.
//!
//! "No solution found" is an empty trajectory and "could not align" is a
//! `false`, not errors; sampling based planning fails routinely and callers
//! are expected to branch on these outcomes.

pub mod kinematic_traits;
pub mod planner_error;

pub mod utils;

pub mod path_io;

pub mod distance;

pub mod state;
pub mod trajectory;

pub mod ik_sampler;
pub mod fk_evaluator;

#[path = "path_plan/follow.rs"]
pub mod follow;

#[path = "path_plan/nn_search.rs"]
pub mod nn_search;

pub mod alignment;

#[cfg(test)]
mod tests;
