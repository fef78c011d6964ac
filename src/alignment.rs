//! Moving the arm to the start of a planned trajectory.
//!
//! A path following trajectory is only safe to execute from its own first
//! configuration. This module extracts that configuration and delegates the
//! relocation to a point to point motion executor; the boolean outcome must
//! be checked before the trajectory itself is executed.

use crate::kinematic_traits::{Joints, KinematicModel, JOINTS_COUNT};
use crate::planner_error::PlannerError;
use crate::trajectory::Trajectory;
use crate::utils::dump_joints;
use rand::Rng;
use rrt::dual_rrt_connect;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tracing::debug;

/// Collision aware point to point motion planner/executor, supplied by the
/// surrounding system. `move_to` returns `true` only if a feasible motion
/// was both found and executed; any internal failure is reported as `false`,
/// never as a hang or a panic out of this crate.
pub trait MotionExecutor {
    fn move_to(&mut self, goal: &Joints) -> bool;
}

/// Move the arm to the configuration at the trajectory's start time.
///
/// An empty trajectory has no start configuration and executing from an
/// arbitrary one is unsafe, so this fails fast with
/// [`PlannerError::EmptyTrajectory`] instead of guessing. `Ok(false)` means
/// the executor could not find or execute a feasible motion; the caller must
/// not proceed to execute `trajectory`.
pub fn move_to_start<E: MotionExecutor>(
    executor: &mut E,
    trajectory: &Trajectory,
) -> Result<bool, PlannerError> {
    let Some(start) = trajectory.start_configuration() else {
        return Err(PlannerError::EmptyTrajectory);
    };
    Ok(executor.move_to(start))
}

/// Default executor: joint space dual RRT-connect from the model's current
/// configuration, replaying the found path onto the model.
pub struct RrtExecutor<M: KinematicModel + ?Sized> {
    pub model: Rc<RefCell<M>>,

    /// Collision feasibility of a joint configuration, supplied externally.
    pub collision_free: Box<dyn Fn(&Joints) -> bool>,

    /// Step size in the joint space (value in Radians). This should be small
    /// enough to prevent the arm colliding with something while moving
    /// in a possibly less predictable way between the configurations.
    pub step_size_joint_space: f64,

    /// The "max try" parameter of the RRT algorithm, reasonable values
    /// are in order 1000 ... 4000
    pub max_try: usize,

    /// Flag to print extra diagnostics if required.
    pub debug: bool,
}

impl<M: KinematicModel + ?Sized> RrtExecutor<M> {
    pub fn new(model: &Rc<RefCell<M>>, collision_free: Box<dyn Fn(&Joints) -> bool>) -> Self {
        RrtExecutor {
            model: Rc::clone(model),
            collision_free,
            step_size_joint_space: 3_f64.to_radians(),
            max_try: 2000,
            debug: false,
        }
    }

    fn plan_path(&self, start: &Joints, goal: &Joints) -> Result<Vec<Vec<f64>>, String> {
        let (lower, upper) = self.model.borrow().joint_limits();
        for i in 0..JOINTS_COUNT {
            if !lower[i].is_finite() || !upper[i].is_finite() || lower[i] > upper[i] {
                return Err(format!(
                    "joint {}: cannot sample within limits {} .. {}",
                    i, lower[i], upper[i]
                ));
            }
        }

        let collision_free = |joint_angles: &[f64]| -> bool {
            let joints = <Joints>::try_from(joint_angles).expect("six joint values");
            (self.collision_free)(&joints)
        };

        // Random joint configurations within the limits.
        let random_joint_angles = || -> Vec<f64> {
            let mut rng = rand::thread_rng();
            (0..JOINTS_COUNT)
                .map(|i| rng.gen_range(lower[i]..=upper[i]))
                .collect()
        };

        dual_rrt_connect(
            start,
            goal,
            collision_free,
            random_joint_angles,
            self.step_size_joint_space,
            self.max_try,
        )
    }

    fn convert_result(&self, data: Result<Vec<Vec<f64>>, String>) -> Result<Vec<Joints>, String> {
        data.and_then(|vectors| {
            vectors
                .into_iter()
                .map(|vec| {
                    <Joints>::try_from(vec.as_slice())
                        .map_err(|_| "One of the path steps does not have 6 elements.".to_string())
                })
                .collect()
        })
    }
}

impl<M: KinematicModel + ?Sized> MotionExecutor for RrtExecutor<M> {
    fn move_to(&mut self, goal: &Joints) -> bool {
        let start = self.model.borrow().configuration();

        let started = Instant::now();
        let path = self.plan_path(&start, goal);
        let spent = started.elapsed();

        match self.convert_result(path) {
            Ok(path) => {
                if self.debug {
                    println!("RRT took {:?}, {} steps:", &spent, path.len());
                    for step in &path {
                        dump_joints(step);
                    }
                }
                // Execute: step the model through the found path.
                let mut model = self.model.borrow_mut();
                for step in &path {
                    model.set_configuration(step);
                }
                true
            }
            Err(error_message) => {
                debug!("point to point relocation failed: {}", error_message);
                if self.debug {
                    println!("RRT failed after {:?}: {}", &spent, error_message);
                }
                false
            }
        }
    }
}
