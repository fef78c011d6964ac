//! Weighted SE(3) dissimilarity between end effector poses.
//!
//! The metric combines signed translation differences with per axis circular
//! rotation distances over an Euler XYZ decomposition, then takes the
//! elementwise weighted Euclidean norm of the 6 error components. This is the
//! task space distance the sampling search minimizes along the reference path.

use crate::kinematic_traits::Pose;
use nalgebra::UnitQuaternion;
use std::f64::consts::PI;

/// One weight per error component: 3 translation, then 3 rotation.
/// Allows reweighting rotation error relative to translation error.
pub type DistanceWeights = [f64; 6];

/// Default weights, all components count equally.
pub const UNIFORM_WEIGHTS: DistanceWeights = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0];

/// Shortest angular distance between two angles on a circle of period 2π.
/// The result is always in `[0, π]`; angles near +π and −π are judged close.
pub fn so2_distance(first: f64, second: f64) -> f64 {
    let raw_diff = if first > second {
        first - second
    } else {
        second - first
    };
    let mod_diff = raw_diff % (2.0 * PI);
    if mod_diff > PI {
        2.0 * PI - mod_diff
    } else {
        mod_diff
    }
}

/// Decompose a rotation into Euler XYZ angles `(a, b, c)` such that
/// `R = Rx(a) · Ry(b) · Rz(c)`.
///
/// Near gimbal lock (`|R₀₂| → 1`, i.e. `b → ±π/2`) the decomposition is
/// ambiguous and the extracted `a` and `c` can flip discontinuously. The per
/// axis circular wrap in [`se3_distance`] softens the worst sign flip
/// artifacts but does not remove the discontinuity; this is a known
/// limitation of the Euler based metric, kept as is because a quaternion
/// angle metric would change the numeric results.
pub fn euler_xyz(rotation: &UnitQuaternion<f64>) -> [f64; 3] {
    let m = rotation.to_rotation_matrix();

    // R = Rx(a)·Ry(b)·Rz(c) puts sin(b) at row 0, column 2.
    let b = m[(0, 2)].clamp(-1.0, 1.0).asin();
    let a = f64::atan2(-m[(1, 2)], m[(2, 2)]);
    let c = f64::atan2(-m[(0, 1)], m[(0, 0)]);

    [a, b, c]
}

/// Scalar dissimilarity between two poses: `‖ e ⊙ weights ‖₂` over the 6
/// error components (3 signed translation differences, 3 circular rotation
/// distances). Pure and deterministic; symmetric in its pose arguments since
/// translation error enters squared and rotation error is an absolute
/// circular distance.
pub fn se3_distance(first: &Pose, second: &Pose, weights: &DistanceWeights) -> f64 {
    let mut error = [0.0; 6];

    // Translational components.
    let first_trans = &first.translation.vector;
    let second_trans = &second.translation.vector;
    for i in 0..3 {
        error[i] = first_trans[i] - second_trans[i];
    }

    // And rotational components.
    let first_euler = euler_xyz(&first.rotation);
    let second_euler = euler_xyz(&second.rotation);
    for i in 0..3 {
        error[i + 3] = so2_distance(first_euler[i], second_euler[i]);
    }

    error
        .iter()
        .zip(weights.iter())
        .map(|(e, w)| (e * w) * (e * w))
        .sum::<f64>()
        .sqrt()
}
