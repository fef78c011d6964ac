//! Output trajectory of the path following planner.

use crate::kinematic_traits::Joints;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Flags that can be set on AnnotatedJoints in the output
    #[derive(Clone, Copy, PartialEq)]
    pub struct PathFlags: u32 {
        const NONE = 0b0000_0000;

        /// Position was selected for one of the hard waypoints taken from the
        /// reference path.
        const WAYPOINT =   0b0000_0001;

        /// Position is an interpolation between two waypoint configurations.
        /// These poses are not needed for robots with built-in joint space
        /// blending but matter for controllers that only step between the
        /// given joint positions.
        const LIN_INTERP = 0b0000_0010;
    }
}

/// Annotated joints specifying how the position entered the trajectory.
#[derive(Clone, Copy)]
pub struct AnnotatedJoints {
    pub joints: Joints,
    pub flags: PathFlags,
}

/// Ordered, untimed sequence of joint configurations produced by the planner.
///
/// An empty trajectory is the normal "no solution found" outcome, not an
/// error; callers must check [`Trajectory::is_empty`] before executing or
/// aligning to it. The planner holds no trajectory store, the value is
/// consumed once and discarded.
#[derive(Clone, Default)]
pub struct Trajectory {
    points: Vec<AnnotatedJoints>,
}

impl Trajectory {
    /// The "no solution found" value.
    pub fn empty() -> Self {
        Trajectory { points: Vec::new() }
    }

    pub fn from_points(points: Vec<AnnotatedJoints>) -> Self {
        Trajectory { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn push(&mut self, point: AnnotatedJoints) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[AnnotatedJoints] {
        &self.points
    }

    /// The configuration at the start time of the trajectory, `None` if the
    /// trajectory is empty.
    pub fn start_configuration(&self) -> Option<&Joints> {
        self.points.first().map(|p| &p.joints)
    }

    /// Joint configurations of the hard waypoints only, in order.
    pub fn waypoints(&self) -> Vec<Joints> {
        self.points
            .iter()
            .filter(|p| p.flags.contains(PathFlags::WAYPOINT))
            .map(|p| p.joints)
            .collect()
    }
}

fn flag_representation(flags: &PathFlags) -> String {
    const FLAG_MAP: &[(PathFlags, &str)] = &[
        (PathFlags::WAYPOINT, "WAYPOINT"),
        (PathFlags::LIN_INTERP, "LIN_INTERP"),
    ];

    FLAG_MAP
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" | ")
}

impl fmt::Debug for PathFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", flag_representation(self))
    }
}

impl fmt::Debug for AnnotatedJoints {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}: {:.2}, {:.2}, {:.2}, {:.2}, {:.2}, {:.2} ",
            flag_representation(&self.flags),
            self.joints[0].to_degrees(),
            self.joints[1].to_degrees(),
            self.joints[2].to_degrees(),
            self.joints[3].to_degrees(),
            self.joints[4].to_degrees(),
            self.joints[5].to_degrees(),
        )
    }
}

impl fmt::Debug for Trajectory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(formatter, "Trajectory (no solution)");
        }
        writeln!(formatter, "Trajectory, {} points:", self.len())?;
        for point in &self.points {
            writeln!(formatter, "  {:?}", point)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_no_solution() {
        let trajectory = Trajectory::empty();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.start_configuration(), None);
    }

    #[test]
    fn test_start_configuration_is_first_point() {
        let first = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let trajectory = Trajectory::from_points(vec![
            AnnotatedJoints { joints: first, flags: PathFlags::WAYPOINT },
            AnnotatedJoints { joints: [1.0; 6], flags: PathFlags::LIN_INTERP },
            AnnotatedJoints { joints: [2.0; 6], flags: PathFlags::WAYPOINT },
        ]);
        assert_eq!(trajectory.start_configuration(), Some(&first));
        assert_eq!(trajectory.waypoints().len(), 2);
    }
}
