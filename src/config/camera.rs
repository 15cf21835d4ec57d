//! Camera and feature-tracker settings.

use super::document::Document;
use super::error::ConfigError;

/// Camera topics, image geometry, and feature-tracker tuning.
///
/// Always present: the estimator cannot run without at least one camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    /// First camera image topic
    pub image0_topic: String,
    /// Second camera image topic (meaningful only for stereo)
    pub image1_topic: String,
    /// Image width in pixels
    pub image_width: i32,
    /// Image height in pixels
    pub image_height: i32,
    /// Maximum number of tracked features
    pub max_features: i32,
    /// Minimum pixel spacing between tracked features
    pub min_distance: i32,
    /// RANSAC rejection threshold for the fundamental-matrix check (pixels)
    pub fundamental_threshold: f64,
    /// Publish the annotated tracking image
    pub show_track: bool,
    /// Run reverse optical flow to reject bad tracks
    pub flow_back: bool,
    /// Number of cameras, 1 or 2
    pub num_cameras: usize,
    /// Two cameras configured
    pub stereo: bool,
    /// Calibration file names as configured (relative to the settings file)
    pub calib_files: Vec<String>,
}

impl CameraSettings {
    /// Read the camera section.
    ///
    /// The camera count is the one field the loader refuses to default:
    /// anything outside {1, 2} is a fatal [`ConfigError::CameraCount`].
    pub(crate) fn from_document(doc: &Document) -> Result<Self, ConfigError> {
        let num_cameras = doc.i64("num_of_cam").unwrap_or(0);
        if num_cameras != 1 && num_cameras != 2 {
            return Err(ConfigError::CameraCount(num_cameras));
        }
        let stereo = num_cameras == 2;

        let mut calib_files = vec![doc.string("cam0_calib").unwrap_or_default()];
        if stereo {
            calib_files.push(doc.string("cam1_calib").unwrap_or_default());
        }

        let settings = Self {
            image0_topic: doc.string("image0_topic").unwrap_or_default(),
            image1_topic: doc.string("image1_topic").unwrap_or_default(),
            image_width: doc.i64("image_width").unwrap_or(0) as i32,
            image_height: doc.i64("image_height").unwrap_or(0) as i32,
            max_features: doc.i64("max_cnt").unwrap_or(0) as i32,
            min_distance: doc.i64("min_dist").unwrap_or(0) as i32,
            fundamental_threshold: doc.f64("F_threshold").unwrap_or(0.0),
            show_track: doc.flag("show_track").unwrap_or(false),
            flow_back: doc.flag("flow_back").unwrap_or(false),
            num_cameras: num_cameras as usize,
            stereo,
            calib_files,
        };

        log::info!(
            "{} camera(s), {}x{} images",
            settings.num_cameras,
            settings.image_width,
            settings.image_height
        );
        Ok(settings)
    }
}
