//! Planner internal state representation and the save/restore discipline
//! for the shared kinematic model.

use crate::kinematic_traits::{Joints, KinematicModel};
use std::cell::RefCell;
use std::rc::Rc;

/// Opaque state the sampling search passes between the IK and FK callbacks.
/// The search only creates, copies and hands these back; the planner converts
/// them to and from joint configurations at the callback boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateState {
    joints: Joints,
}

impl CandidateState {
    pub fn new(joints: Joints) -> Self {
        CandidateState { joints }
    }

    pub fn joints(&self) -> &Joints {
        &self.joints
    }
}

impl From<Joints> for CandidateState {
    fn from(joints: Joints) -> Self {
        CandidateState { joints }
    }
}

impl From<CandidateState> for Joints {
    fn from(state: CandidateState) -> Self {
        state.joints
    }
}

/// Scoped save/restore of the shared model's current configuration.
///
/// The kinematic model is process wide mutable state; IK seeding and FK
/// evaluation must mutate it to do their work but must not leave any
/// externally observable change behind. Creating a `ConfigurationSaver`
/// snapshots the configuration; dropping it writes the snapshot back. The
/// restore runs on every exit path out of the owning scope, including `?`
/// returns and unwinding, so an error inside a callback can never leave the
/// model in a corrupted configuration.
///
/// The guard must not be dropped while a borrow of the model is still held;
/// all planner code borrows the model only transiently inside a statement.
pub struct ConfigurationSaver<M: KinematicModel + ?Sized> {
    model: Rc<RefCell<M>>,
    saved: Joints,
}

impl<M: KinematicModel + ?Sized> ConfigurationSaver<M> {
    pub fn new(model: &Rc<RefCell<M>>) -> Self {
        let saved = model.borrow().configuration();
        ConfigurationSaver {
            model: Rc::clone(model),
            saved,
        }
    }

    /// The configuration that will be restored when this guard drops.
    pub fn saved(&self) -> &Joints {
        &self.saved
    }
}

impl<M: KinematicModel + ?Sized> Drop for ConfigurationSaver<M> {
    fn drop(&mut self) {
        self.model.borrow_mut().set_configuration(&self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_utils::LinearArm;

    #[test]
    fn test_candidate_state_round_trip() {
        let joints = [0.1, -0.2, 0.3, -0.4, 0.5, -0.6];
        let state = CandidateState::from(joints);
        let copy = state; // Copy, as the search engine requires
        assert_eq!(Joints::from(copy), joints);
        assert_eq!(state.joints(), &joints);
    }

    #[test]
    fn test_saver_restores_on_drop() {
        let arm = Rc::new(RefCell::new(LinearArm::new()));
        let before = [0.4, 0.3, 0.2, 0.1, 0.0, -0.1];
        arm.borrow_mut().set_configuration(&before);

        {
            let _saver = ConfigurationSaver::new(&arm);
            arm.borrow_mut().set_configuration(&[1.0; 6]);
        }

        assert_eq!(arm.borrow().configuration(), before);
    }

    #[test]
    fn test_saver_restores_on_early_return() {
        fn poke(arm: &Rc<RefCell<LinearArm>>) -> Result<(), String> {
            let _saver = ConfigurationSaver::new(arm);
            arm.borrow_mut().set_configuration(&[2.0; 6]);
            Err("simulated callback failure".to_string())
        }

        let arm = Rc::new(RefCell::new(LinearArm::new()));
        let before = arm.borrow().configuration();
        assert!(poke(&arm).is_err());
        assert_eq!(arm.borrow().configuration(), before);
    }
}
