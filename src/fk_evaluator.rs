//! Forward kinematics evaluation that never leaves a trace on the model.

use crate::kinematic_traits::{KinematicModel, Pose};
use crate::planner_error::PlannerError;
use crate::state::{CandidateState, ConfigurationSaver};
use std::cell::RefCell;
use std::rc::Rc;

/// Maps a candidate state to the resulting end effector pose.
///
/// Evaluation applies the candidate's joint configuration to the shared
/// model and reads the end effector transform, under a
/// [`ConfigurationSaver`] that restores the pre-call configuration on every
/// exit path. Repeated calls with the same state return the same pose; from
/// the caller's perspective this is a pure function.
pub struct FkEvaluator<M: KinematicModel + ?Sized> {
    model: Rc<RefCell<M>>,
}

impl<M: KinematicModel + ?Sized> FkEvaluator<M> {
    pub fn new(model: &Rc<RefCell<M>>) -> Self {
        FkEvaluator {
            model: Rc::clone(model),
        }
    }

    pub fn evaluate(&self, state: &CandidateState) -> Result<Pose, PlannerError> {
        let _saver = ConfigurationSaver::new(&self.model);

        let mut model = self.model.borrow_mut();
        model.set_configuration(state.joints());
        let pose = model.end_effector().map_err(PlannerError::Callback)?;

        Ok(pose)
    }
}
