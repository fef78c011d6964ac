//! Reading and writing recorded end effector paths.
//!
//! A path file is whitespace separated numeric rows, one pose per line,
//! 12 fields per row: 3 translation components followed by the 9 entries of
//! the rotation matrix in row major order. This is the format the reference
//! paths are recorded in from demonstrations.
//!
//! No normalization or orthonormality check is performed here; a rotation
//! matrix that is not orthonormal is a data error in the recording and the
//! downstream consumers trust the file.

use crate::kinematic_traits::Pose;
use crate::planner_error::PlannerError;
use nalgebra::{Matrix3, Rotation3, Translation3, UnitQuaternion};
#[cfg(feature = "allow_filesystem")]
use std::path::Path;

/// Number of fields in one pose record.
pub const RECORD_FIELDS: usize = 12;

/// Decode a single 12 value record into a pose.
pub fn record_to_pose(record: &[f64; RECORD_FIELDS]) -> Pose {
    let rot = Matrix3::new(
        record[3], record[4], record[5],
        record[6], record[7], record[8],
        record[9], record[10], record[11],
    );
    Pose::from_parts(
        Translation3::new(record[0], record[1], record[2]),
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rot)),
    )
}

/// Encode a pose back into the 12 value record layout.
pub fn pose_to_record(pose: &Pose) -> [f64; RECORD_FIELDS] {
    let t = pose.translation.vector;
    let m = pose.rotation.to_rotation_matrix();
    [
        t.x, t.y, t.z,
        m[(0, 0)], m[(0, 1)], m[(0, 2)],
        m[(1, 0)], m[(1, 1)], m[(1, 2)],
        m[(2, 0)], m[(2, 1)], m[(2, 2)],
    ]
}

/// Parse a recorded reference path from text. Blank lines are skipped.
/// Any row without exactly 12 parseable numeric fields aborts the whole
/// parse with [`PlannerError::MalformedRecord`], no partial path is returned.
pub fn parse_pose_path(text: &str) -> Result<Vec<Pose>, PlannerError> {
    let mut poses = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != RECORD_FIELDS {
            return Err(PlannerError::MalformedRecord {
                line: index + 1,
                detail: format!(
                    "expected {} numeric fields, found {}",
                    RECORD_FIELDS,
                    tokens.len()
                ),
            });
        }

        let mut record = [0.0; RECORD_FIELDS];
        for (field, token) in tokens.iter().enumerate() {
            record[field] = token.parse::<f64>().map_err(|_| PlannerError::MalformedRecord {
                line: index + 1,
                detail: format!("cannot parse numeric token '{}'", token),
            })?;
        }

        poses.push(record_to_pose(&record));
    }

    Ok(poses)
}

/// Read a recorded reference path from a file.
#[cfg(feature = "allow_filesystem")]
pub fn read_pose_path(path: impl AsRef<Path>) -> Result<Vec<Pose>, PlannerError> {
    let contents = std::fs::read_to_string(path)?;
    parse_pose_path(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Vector3};

    const IDENTITY_ROW: &str = "0.5 -0.25 1.0  1 0 0  0 1 0  0 0 1";

    #[test]
    fn test_decode_identity_rotation() {
        let path = parse_pose_path(IDENTITY_ROW).expect("row should parse");
        assert_eq!(path.len(), 1);
        let pose = &path[0];
        assert_eq!(pose.translation.vector.x, 0.5);
        assert_eq!(pose.translation.vector.y, -0.25);
        assert_eq!(pose.translation.vector.z, 1.0);
        assert!(pose.rotation.angle().abs() < 1e-12);
    }

    #[test]
    fn test_record_round_trip() {
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.7)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), -0.2);
        let pose = Pose::from_parts(
            Translation3::new(0.1, 0.2, 0.3),
            UnitQuaternion::from_rotation_matrix(&rotation),
        );

        let decoded = record_to_pose(&pose_to_record(&pose));

        let translation_error = (decoded.translation.vector - pose.translation.vector).norm();
        let angular_error = decoded.rotation.angle_to(&pose.rotation);
        assert!(translation_error < 1e-12);
        assert!(angular_error < 1e-12);
    }

    #[test]
    fn test_multi_line_with_blanks() {
        let text = format!("{}\n\n   \n{}\n", IDENTITY_ROW, IDENTITY_ROW);
        let path = parse_pose_path(&text).expect("blank lines are not records");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_short_row_rejected() {
        let text = "0 0 0  1 0 0  0 1 0  0 0"; // 11 fields
        match parse_pose_path(text) {
            Err(PlannerError::MalformedRecord { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_long_row_rejected() {
        let text = format!("{} 42.0", IDENTITY_ROW); // 13 fields
        assert!(matches!(
            parse_pose_path(&text),
            Err(PlannerError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_non_numeric_token_rejected() {
        let text = "0 0 zero  1 0 0  0 1 0  0 0 1";
        match parse_pose_path(text) {
            Err(PlannerError::MalformedRecord { line, detail }) => {
                assert_eq!(line, 1);
                assert!(detail.contains("zero"));
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_row_aborts_whole_parse() {
        let text = format!("{}\nnot a pose at all\n{}", IDENTITY_ROW, IDENTITY_ROW);
        assert!(parse_pose_path(&text).is_err());
    }

    #[cfg(feature = "allow_filesystem")]
    #[test]
    fn test_read_from_file() {
        let mut file = std::env::temp_dir();
        file.push("rs_path_follow_pose_path_test.txt");
        std::fs::write(&file, format!("{}\n{}\n", IDENTITY_ROW, IDENTITY_ROW))
            .expect("temp file should be writable");
        let path = read_pose_path(&file).expect("file should parse");
        assert_eq!(path.len(), 2);
        let _ = std::fs::remove_file(&file);
    }
}
