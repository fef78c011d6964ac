//! Planner-facing types and the seam to the externally owned kinematic model.

extern crate nalgebra as na;

use na::Isometry3;

/// Pose of the end effector. It contains both the Cartesian position and
/// the rotation quaternion.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Joint configuration of the arm, one value per joint, in the native joint
/// units of the arm (radians for revolute joints). No unit conversion is done
/// anywhere in this crate.
pub type Joints = [f64; 6];

/// Multiple joint configurations reaching the same pose.
pub type Solutions = Vec<Joints>;

/// Number of degrees of freedom this crate plans for.
pub const JOINTS_COUNT: usize = 6;

/// All joints at zero, a convenient starting configuration.
pub const JOINTS_AT_ZERO: Joints = [0.0; 6];

/// The shared kinematic model of the arm. The model owns the notion of the
/// "current configuration" that inverse kinematics solves from and forward
/// kinematics evaluates at. It is process wide mutable state; the planner
/// only ever touches it under the save/restore discipline of
/// [`crate::state::ConfigurationSaver`], so from the caller's perspective
/// planning never moves the arm.
///
/// Implementations report their own failures as `String`, the planner wraps
/// them into [`crate::planner_error::PlannerError::Callback`].
pub trait KinematicModel {
    /// Current joint configuration of the model.
    fn configuration(&self) -> Joints;

    /// Set the current joint configuration.
    fn set_configuration(&mut self, joints: &Joints);

    /// Pose of the end effector at the current configuration.
    fn end_effector(&self) -> Result<Pose, String>;

    /// Joint limits as (lower, upper) per joint. Used to bound the random
    /// seed distribution of the IK sampler and the RRT executor.
    fn joint_limits(&self) -> (Joints, Joints);

    /// Solve inverse kinematics for `target`, seeded from the current
    /// configuration. On success the model is left at the solution and
    /// `true` is returned; `false` means the solver found no acceptable
    /// solution from this seed (an expected outcome, not an error).
    fn solve_ik(&mut self, target: &Pose) -> Result<bool, String>;
}
