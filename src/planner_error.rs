//! Error handling for the path following planner

use std::io;

/// Unified error for pose path parsing and planning.
///
/// "No solution found" and "alignment failed" are deliberately not here:
/// those are frequent, expected outcomes and are reported through return
/// values (an empty [`crate::trajectory::Trajectory`], a `false` from
/// [`crate::alignment::move_to_start`]).
#[derive(Debug)]
pub enum PlannerError {
    /// Pose record with the wrong field count or a non numeric token.
    /// The whole parse is aborted, no partial path is ever returned.
    MalformedRecord { line: usize, detail: String },
    Io(io::Error),
    /// The joint limits cannot form a sampling distribution
    /// (non finite, or lower above upper).
    JointLimits(String),
    /// The kinematic model failed inside an IK or FK callback during the
    /// search. The current plan attempt is aborted; the model configuration
    /// is guaranteed restored.
    Callback(String),
    /// `plan` was called with a reference path of zero poses.
    EmptyReferencePath,
    /// `move_to_start` was called with an empty trajectory. There is no
    /// start configuration to align to, and executing from an arbitrary
    /// configuration is unsafe, so this fails fast.
    EmptyTrajectory,
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            PlannerError::MalformedRecord { line, ref detail } =>
                write!(f, "Malformed pose record at line {}: {}", line, detail),
            PlannerError::Io(ref err) =>
                write!(f, "IO Error: {}", err),
            PlannerError::JointLimits(ref msg) =>
                write!(f, "Malformed joint limits: {}", msg),
            PlannerError::Callback(ref msg) =>
                write!(f, "Kinematic callback failed: {}", msg),
            PlannerError::EmptyReferencePath =>
                write!(f, "Reference path contains no poses"),
            PlannerError::EmptyTrajectory =>
                write!(f, "Trajectory contains no points, no start configuration to move to"),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<io::Error> for PlannerError {
    fn from(err: io::Error) -> Self {
        PlannerError::Io(err)
    }
}
