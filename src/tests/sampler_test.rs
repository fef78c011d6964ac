//! Tests for the randomized IK sampler and the state guarded FK evaluator.

use crate::fk_evaluator::FkEvaluator;
use crate::ik_sampler::IkSampler;
use crate::kinematic_traits::{KinematicModel, Pose};
use crate::planner_error::PlannerError;
use crate::state::CandidateState;
use crate::tests::test_utils::{are_isometries_close, IkBehavior, LinearArm};
use nalgebra::{Translation3, UnitQuaternion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;

fn target_pose() -> Pose {
    Pose::from_parts(Translation3::new(0.5, 0.1, -0.3), UnitQuaternion::identity())
}

fn arm(behavior: IkBehavior) -> Rc<RefCell<LinearArm>> {
    let mut arm = LinearArm::new();
    arm.ik = behavior;
    Rc::new(RefCell::new(arm))
}

#[test]
fn test_never_more_candidates_than_requested() {
    let arm = arm(IkBehavior::Solve);
    let mut sampler = IkSampler::new(&arm, StdRng::seed_from_u64(7)).unwrap();

    let solutions = sampler.sample_solutions(&target_pose(), 5).unwrap();

    assert_eq!(solutions.len(), 5);
    let expected = LinearArm::analytic_ik(&target_pose());
    for candidate in &solutions {
        assert_eq!(candidate.joints(), &expected);
    }
}

#[test]
fn test_always_failing_solver_terminates_empty() {
    let arm = arm(IkBehavior::Fail);
    let before = arm.borrow().configuration();
    let mut sampler = IkSampler::new(&arm, StdRng::seed_from_u64(7)).unwrap();

    let solutions = sampler.sample_solutions(&target_pose(), 5).unwrap();

    assert!(solutions.is_empty());
    // Exactly count * max_retries attempts, no endless looping.
    assert_eq!(arm.borrow().ik_calls, 5 * sampler.max_retries);
    assert_eq!(arm.borrow().configuration(), before);
}

#[test]
fn test_retry_budget_recovers_flaky_solves() {
    let arm = arm(IkBehavior::Alternate);
    let mut sampler = IkSampler::new(&arm, StdRng::seed_from_u64(7)).unwrap();

    // Every slot fails once and solves on the second attempt.
    let solutions = sampler.sample_solutions(&target_pose(), 4).unwrap();

    assert_eq!(solutions.len(), 4);
    assert_eq!(arm.borrow().ik_calls, 8);
}

#[test]
fn test_sampling_is_reproducible_for_a_fixed_seed() {
    // With a solver that accepts the seed configuration as the solution,
    // the candidates mirror the random stream.
    let run = |seed: u64| -> Vec<CandidateState> {
        let arm = arm(IkBehavior::AcceptSeed);
        let mut sampler = IkSampler::new(&arm, StdRng::seed_from_u64(seed)).unwrap();
        sampler.sample_solutions(&target_pose(), 6).unwrap()
    };

    let first = run(42);
    let second = run(42);
    let other = run(43);

    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn test_candidates_are_captured_eagerly() {
    let arm = arm(IkBehavior::AcceptSeed);
    let mut sampler = IkSampler::new(&arm, StdRng::seed_from_u64(1)).unwrap();

    let solutions = sampler.sample_solutions(&target_pose(), 3).unwrap();
    assert_eq!(solutions.len(), 3);

    // Mutating the shared model after sampling must not corrupt candidates.
    let snapshot: Vec<CandidateState> = solutions.clone();
    arm.borrow_mut().set_configuration(&[9.0; 6]);
    assert_eq!(solutions, snapshot);
}

#[test]
fn test_inverted_limits_fail_fast() {
    let arm = Rc::new(RefCell::new(LinearArm::with_limits([1.0; 6], [-1.0; 6])));
    match IkSampler::new(&arm, StdRng::seed_from_u64(0)) {
        Err(PlannerError::JointLimits(_)) => {}
        other => panic!("expected JointLimits error, got {:?}", other.err()),
    }
}

#[test]
fn test_non_finite_limits_fail_fast() {
    let mut lower = [-1.0; 6];
    lower[2] = f64::NAN;
    let arm = Rc::new(RefCell::new(LinearArm::with_limits(lower, [1.0; 6])));
    assert!(matches!(
        IkSampler::new(&arm, StdRng::seed_from_u64(0)),
        Err(PlannerError::JointLimits(_))
    ));
}

#[test]
fn test_solver_error_propagates_and_restores() {
    let arm = arm(IkBehavior::Error);
    let before = [0.3, -0.1, 0.2, 0.0, 0.4, -0.5];
    arm.borrow_mut().set_configuration(&before);
    let mut sampler = IkSampler::new(&arm, StdRng::seed_from_u64(7)).unwrap();

    match sampler.sample_solutions(&target_pose(), 2) {
        Err(PlannerError::Callback(_)) => {}
        other => panic!("expected Callback error, got {:?}", other.err()),
    }
    assert_eq!(arm.borrow().configuration(), before);
}

#[test]
fn test_fk_evaluation_matches_model_and_restores() {
    let arm = arm(IkBehavior::Solve);
    let before = [0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
    arm.borrow_mut().set_configuration(&before);

    let evaluator = FkEvaluator::new(&arm);
    let joints = [0.4, -0.3, 0.2, 0.3, -0.2, 0.1];
    let pose = evaluator.evaluate(&CandidateState::new(joints)).unwrap();

    assert!(are_isometries_close(&pose, &LinearArm::fk(&joints), 1e-12, 1e-12));
    // Bit for bit equal to the pre-call configuration.
    assert_eq!(arm.borrow().configuration(), before);

    // Conceptually pure: the same state evaluates to the same pose.
    let again = evaluator.evaluate(&CandidateState::new(joints)).unwrap();
    assert!(are_isometries_close(&pose, &again, 0.0, 1e-15));
}

#[test]
fn test_fk_error_restores_configuration() {
    let arm = arm(IkBehavior::Solve);
    arm.borrow_mut().fk_error = true;
    let before = [0.7, 0.6, 0.5, 0.4, 0.3, 0.2];
    arm.borrow_mut().set_configuration(&before);

    let evaluator = FkEvaluator::new(&arm);
    match evaluator.evaluate(&CandidateState::new([0.0; 6])) {
        Err(PlannerError::Callback(_)) => {}
        other => panic!("expected Callback error, got {:?}", other.err()),
    }
    assert_eq!(arm.borrow().configuration(), before);
}
