//! Extrinsic calibration resolution.
//!
//! Camera-to-body and wheel-to-body transforms come from the settings file
//! in one of three modes selected by `estimate_extrinsic`. Every rotation
//! read here is projected to the nearest proper orientation before storage;
//! malformed or missing transform fields degrade to the identity default
//! with a warning instead of aborting.

use nalgebra::{Matrix3, Vector3};

use crate::geometry::Extrinsic;

use super::document::{Document, MatrixField};
use super::error::FieldError;

/// How camera-to-body extrinsics are treated by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrinsicMode {
    /// Extrinsics trusted exactly as configured.
    Fixed,
    /// Configured extrinsics used as an initial guess and refined online.
    RefineAroundPrior,
    /// No prior at all: start from identity and calibrate online.
    EstimateFromScratch,
}

impl ExtrinsicMode {
    /// Decode the `estimate_extrinsic` integer.
    ///
    /// Unknown codes fall back to `Fixed`, which reads the configured
    /// transforms like the original pipeline did for any non-2 value.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::EstimateFromScratch,
            1 => Self::RefineAroundPrior,
            _ => Self::Fixed,
        }
    }

    /// Integer code used by the settings schema.
    pub fn code(self) -> i64 {
        match self {
            Self::Fixed => 0,
            Self::RefineAroundPrior => 1,
            Self::EstimateFromScratch => 2,
        }
    }

    /// Whether an extrinsic-calibration output file should be prepared.
    pub fn wants_calibration_output(self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

/// Read the `estimate_extrinsic` mode and log the choice.
pub(crate) fn mode_from_document(doc: &Document) -> ExtrinsicMode {
    let mode = ExtrinsicMode::from_code(doc.i64("estimate_extrinsic").unwrap_or(0));
    match mode {
        ExtrinsicMode::EstimateFromScratch => {
            log::warn!("no prior on camera extrinsics, calibrating from scratch");
        }
        ExtrinsicMode::RefineAroundPrior => {
            log::warn!("optimizing camera extrinsics around the configured guess");
        }
        ExtrinsicMode::Fixed => log::info!("camera extrinsics fixed"),
    }
    mode
}

/// Resolve the first camera's camera-to-body transform.
pub(crate) fn camera_from_document(doc: &Document, mode: ExtrinsicMode) -> Extrinsic {
    match mode {
        ExtrinsicMode::EstimateFromScratch => Extrinsic::identity(),
        _ => read_extrinsic(doc, "extrinsicRotation_ic", "extrinsicTranslation_ic"),
    }
}

/// Resolve the wheel-to-body transform.
pub(crate) fn wheel_from_document(doc: &Document, mode: ExtrinsicMode) -> Extrinsic {
    match mode {
        ExtrinsicMode::EstimateFromScratch => Extrinsic::identity(),
        _ => read_extrinsic(doc, "extrinsicRotation_io", "extrinsicTranslation_io"),
    }
}

/// Resolve the second camera's transform from the combined `body_T_cam1`
/// field. Stereo rigs are assumed hand-eye-calibrated, so this is read
/// regardless of the `estimate_extrinsic` mode.
pub(crate) fn stereo_camera_from_document(doc: &Document) -> Extrinsic {
    match doc
        .matrix("body_T_cam1")
        .and_then(|field| split_transform("body_T_cam1", &field))
    {
        Ok((rotation, translation)) => Extrinsic::from_raw(rotation, translation),
        Err(e) => {
            log::warn!("{}; using identity for the second camera", e);
            Extrinsic::identity()
        }
    }
}

fn read_extrinsic(doc: &Document, rotation_key: &str, translation_key: &str) -> Extrinsic {
    let rotation = match doc
        .matrix(rotation_key)
        .and_then(|field| to_matrix3(rotation_key, &field))
    {
        Ok(rotation) => rotation,
        Err(e) => {
            log::warn!("{}; using identity rotation", e);
            Matrix3::identity()
        }
    };
    let translation = match doc
        .matrix(translation_key)
        .and_then(|field| to_vector3(translation_key, &field))
    {
        Ok(translation) => translation,
        Err(e) => {
            log::warn!("{}; using zero translation", e);
            Vector3::zeros()
        }
    };
    Extrinsic::from_raw(rotation, translation)
}

fn to_matrix3(key: &str, field: &MatrixField) -> Result<Matrix3<f64>, FieldError> {
    if field.rows != 3 || field.cols != 3 {
        return Err(bad_shape(key, field, "3x3"));
    }
    Ok(Matrix3::from_row_slice(&field.data))
}

fn to_vector3(key: &str, field: &MatrixField) -> Result<Vector3<f64>, FieldError> {
    // Translations appear as 3x1 columns or 1x3 rows depending on the tool
    // that wrote the file
    if field.data.len() != 3 || (field.rows != 1 && field.cols != 1) {
        return Err(bad_shape(key, field, "3x1"));
    }
    Ok(Vector3::from_column_slice(&field.data))
}

/// Split a 4x4 homogeneous transform into rotation and translation blocks.
fn split_transform(
    key: &str,
    field: &MatrixField,
) -> Result<(Matrix3<f64>, Vector3<f64>), FieldError> {
    if field.rows != 4 || field.cols != 4 {
        return Err(bad_shape(key, field, "4x4"));
    }
    let rotation = Matrix3::from_fn(|r, c| field.get(r, c));
    let translation = Vector3::new(field.get(0, 3), field.get(1, 3), field.get(2, 3));
    Ok((rotation, translation))
}

fn bad_shape(key: &str, field: &MatrixField, expected: &'static str) -> FieldError {
    FieldError::BadShape {
        key: key.to_string(),
        rows: field.rows,
        cols: field.cols,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mode_codes_round_trip() {
        for code in 0..=2 {
            assert_eq!(ExtrinsicMode::from_code(code).code(), code);
        }
        assert_eq!(ExtrinsicMode::from_code(7), ExtrinsicMode::Fixed);
    }

    #[test]
    fn test_calibration_output_gating() {
        assert!(!ExtrinsicMode::Fixed.wants_calibration_output());
        assert!(ExtrinsicMode::RefineAroundPrior.wants_calibration_output());
        assert!(ExtrinsicMode::EstimateFromScratch.wants_calibration_output());
    }

    #[test]
    fn test_scratch_mode_yields_identity() {
        let doc = Document::empty();
        let e = camera_from_document(&doc, ExtrinsicMode::EstimateFromScratch);
        assert_eq!(e, Extrinsic::identity());
    }

    #[test]
    fn test_fixed_mode_reads_and_normalizes() {
        let doc = Document::parse(
            "extrinsicRotation_ic: !!opencv-matrix\n\
             \x20  rows: 3\n\
             \x20  cols: 3\n\
             \x20  dt: d\n\
             \x20  data: [0.0, -1.0001, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.9999]\n\
             extrinsicTranslation_ic: [0.02, -0.01, 0.0]\n",
        )
        .unwrap();

        let e = camera_from_document(&doc, ExtrinsicMode::Fixed);
        assert_relative_eq!(
            e.rotation.transpose() * e.rotation,
            Matrix3::identity(),
            epsilon = 1e-9
        );
        assert_relative_eq!(e.rotation[(0, 1)], -1.0, epsilon = 1e-3);
        assert_eq!(e.translation, Vector3::new(0.02, -0.01, 0.0));
    }

    #[test]
    fn test_missing_fields_degrade_to_identity() {
        let doc = Document::empty();
        let e = wheel_from_document(&doc, ExtrinsicMode::Fixed);
        assert_eq!(e, Extrinsic::identity());
    }

    #[test]
    fn test_stereo_transform_split() {
        let doc = Document::parse(
            "body_T_cam1: [[1.0, 0.0, 0.0, 0.1], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, -0.02], [0.0, 0.0, 0.0, 1.0]]\n",
        )
        .unwrap();

        let e = stereo_camera_from_document(&doc);
        assert_relative_eq!(e.rotation, Matrix3::identity(), epsilon = 1e-12);
        assert_eq!(e.translation, Vector3::new(0.1, 0.0, -0.02));
    }

    #[test]
    fn test_stereo_transform_wrong_shape_degrades() {
        let doc = Document::parse("body_T_cam1: [[1.0, 0.0], [0.0, 1.0]]\n").unwrap();
        assert_eq!(stereo_camera_from_document(&doc), Extrinsic::identity());
    }
}
