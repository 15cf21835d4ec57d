//! Top-level parameter set and the load pipeline.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use nalgebra::{Matrix3, Vector3};
use serde_yaml::{Mapping, Value};

use crate::geometry::Extrinsic;

use super::camera::CameraSettings;
use super::document::Document;
use super::error::ConfigError;
use super::extrinsics::{self, ExtrinsicMode};
use super::imu::ImuSettings;
use super::wheel::WheelSettings;

/// Virtual focal length (pixels) used to express the keyframe parallax
/// threshold as an angle-equivalent value.
pub const FOCAL_LENGTH: f64 = 460.0;

/// Depth prior for newly triangulated features (meters).
const INIT_DEPTH: f64 = 5.0;
/// Accelerometer bias reset threshold.
const BIAS_ACC_THRESHOLD: f64 = 0.1;
/// Gyroscope bias reset threshold.
const BIAS_GYR_THRESHOLD: f64 = 0.1;
/// Result log file name under the output directory.
const RESULT_FILE: &str = "vio.csv";
/// Extrinsic calibration log file name under the output directory.
const EXTRINSIC_CALIB_FILE: &str = "extrinsic_parameter.csv";

/// The complete, validated parameter set for one estimator run.
///
/// Produced once by [`VioConfig::load`] at startup and never mutated
/// afterwards; consumers hold it by reference for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct VioConfig {
    /// Camera topics, image geometry, tracker tuning
    pub camera: CameraSettings,
    /// Resolved calibration file paths, one per camera, colocated with the
    /// settings file
    pub calib_paths: Vec<PathBuf>,
    /// Camera-to-body transforms, one per camera
    pub camera_extrinsics: Vec<Extrinsic>,
    /// Inertial section, absent when `imu: 0`
    pub imu: Option<ImuSettings>,
    /// Wheel section, absent when `wheel: 0`
    pub wheel: Option<WheelSettings>,

    /// Camera/IMU time offset (seconds)
    pub time_offset: f64,
    /// Estimate the camera/IMU time offset online
    pub estimate_time_offset: bool,
    /// Camera/wheel time offset, seeded from the same `td` key
    pub wheel_time_offset: f64,
    /// Estimate the camera/wheel time offset online
    pub estimate_wheel_time_offset: bool,

    /// Solver time budget per frame (seconds)
    pub solver_time_budget: f64,
    /// Maximum solver iterations per frame
    pub max_iterations: i32,
    /// Depth prior for newly triangulated features (meters)
    pub init_depth: f64,
    /// Keyframe parallax threshold, normalized by [`FOCAL_LENGTH`]
    pub min_parallax: f64,
    /// Accelerometer bias reset threshold (fixed)
    pub bias_acc_threshold: f64,
    /// Gyroscope bias reset threshold (fixed)
    pub bias_gyr_threshold: f64,
    /// How camera-to-body extrinsics are treated
    pub extrinsic_mode: ExtrinsicMode,
    /// Run the tracker and optimizer on separate threads
    pub multiple_thread: bool,
    /// Rolling-shutter camera model; stays at the global-shutter default
    /// (the settings schema carries no key for it)
    pub rolling_shutter: bool,

    /// Output directory as configured
    pub output_dir: PathBuf,
    /// Result log path (`<output_path>/vio.csv`)
    pub result_path: PathBuf,
    /// Extrinsic calibration log path, set when extrinsics are refined or
    /// estimated
    pub extrinsic_calib_path: Option<PathBuf>,
}

impl VioConfig {
    /// Load and validate the settings file at `path`.
    ///
    /// Runs the whole pipeline: existence check, document parse, sensor
    /// sections, extrinsic resolution, derived fields, and result-log
    /// preparation. Returns a fatal [`ConfigError`] only for an unreadable
    /// file or a camera count outside {1, 2}; everything else degrades to
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // The rest of the pipeline has no meaningful defaults without the
        // file, so readability is the one hard precondition
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let doc = match Document::parse(&text) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!(
                    "settings file {} is not a structured document: {}; continuing on defaults",
                    path.display(),
                    e
                );
                Document::empty()
            }
        };

        Self::from_document(&doc, path)
    }

    fn from_document(doc: &Document, settings_path: &Path) -> Result<Self, ConfigError> {
        let camera = CameraSettings::from_document(doc)?;
        let imu = ImuSettings::from_document(doc);
        let mut wheel = WheelSettings::from_document(doc);

        let multiple_thread = doc.flag("multiple_thread").unwrap_or(false);
        let solver_time_budget = doc.f64("max_solver_time").unwrap_or(0.0);
        let max_iterations = doc.i64("max_num_iterations").unwrap_or(0) as i32;
        let min_parallax = doc.f64("keyframe_parallax").unwrap_or(0.0) / FOCAL_LENGTH;

        let mut extrinsic_mode = extrinsics::mode_from_document(doc);
        let mut camera_extrinsics = vec![extrinsics::camera_from_document(doc, extrinsic_mode)];
        if camera.stereo {
            camera_extrinsics.push(extrinsics::stereo_camera_from_document(doc));
        }
        if let Some(wheel) = wheel.as_mut() {
            wheel.extrinsic = extrinsics::wheel_from_document(doc, extrinsic_mode);
        }

        let time_offset = doc.f64("td").unwrap_or(0.0);
        let mut estimate_time_offset = doc.flag("estimate_td").unwrap_or(false);
        let wheel_time_offset = doc.f64("td").unwrap_or(0.0);
        let estimate_wheel_time_offset = doc.flag("estimate_td_wheel").unwrap_or(false);
        if estimate_time_offset {
            log::info!(
                "unsynchronized sensors: estimating time offset online, initial td {}",
                time_offset
            );
        } else {
            log::info!("synchronized sensors: fixed time offset {}", time_offset);
        }

        let output_dir = PathBuf::from(doc.string("output_path").unwrap_or_default());
        let result_path = output_dir.join(RESULT_FILE);
        let extrinsic_calib_path = extrinsic_mode
            .wants_calibration_output()
            .then(|| output_dir.join(EXTRINSIC_CALIB_FILE));

        // Calibration files are always colocated with the settings file
        let settings_dir = settings_path.parent().unwrap_or_else(|| Path::new(""));
        let calib_paths = camera
            .calib_files
            .iter()
            .map(|name| settings_dir.join(name))
            .collect();

        // An unobservable calibration cannot be estimated without inertial
        // reference
        if imu.is_none() {
            extrinsic_mode = ExtrinsicMode::Fixed;
            estimate_time_offset = false;
            log::info!("no IMU: extrinsics fixed, time-offset estimation disabled");
        }

        let config = Self {
            camera,
            calib_paths,
            camera_extrinsics,
            imu,
            wheel,
            time_offset,
            estimate_time_offset,
            wheel_time_offset,
            estimate_wheel_time_offset,
            solver_time_budget,
            max_iterations,
            init_depth: INIT_DEPTH,
            min_parallax,
            bias_acc_threshold: BIAS_ACC_THRESHOLD,
            bias_gyr_threshold: BIAS_GYR_THRESHOLD,
            extrinsic_mode,
            multiple_thread,
            rolling_shutter: false,
            output_dir,
            result_path,
            extrinsic_calib_path,
        };

        log::info!("result path: {}", config.result_path.display());
        config.prepare_result_log();
        Ok(config)
    }

    /// Truncate-create the result log so the estimator appends to an empty
    /// file. Best-effort: a failure is logged, never fatal.
    fn prepare_result_log(&self) {
        if let Err(e) = File::create(&self.result_path) {
            log::warn!(
                "cannot prepare result log {}: {}",
                self.result_path.display(),
                e
            );
        }
    }

    /// Write the resolved parameters back into the settings key schema.
    ///
    /// Reloading the emitted document from the same directory yields an
    /// equal parameter set; the forced-default corrections are idempotent.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        let mut map = Mapping::new();
        let mut put = |key: &str, value: Value| {
            map.insert(Value::from(key), value);
        };

        put("image0_topic", Value::from(self.camera.image0_topic.as_str()));
        put("image1_topic", Value::from(self.camera.image1_topic.as_str()));
        put("image_width", Value::from(i64::from(self.camera.image_width)));
        put("image_height", Value::from(i64::from(self.camera.image_height)));
        put("max_cnt", Value::from(i64::from(self.camera.max_features)));
        put("min_dist", Value::from(i64::from(self.camera.min_distance)));
        put("F_threshold", Value::from(self.camera.fundamental_threshold));
        put("show_track", flag(self.camera.show_track));
        put("flow_back", flag(self.camera.flow_back));
        put("multiple_thread", flag(self.multiple_thread));

        put("imu", flag(self.imu.is_some()));
        if let Some(imu) = &self.imu {
            put("imu_topic", Value::from(imu.topic.as_str()));
            put("acc_n", Value::from(imu.acc_noise));
            put("acc_w", Value::from(imu.acc_bias_walk));
            put("gyr_n", Value::from(imu.gyr_noise));
            put("gyr_w", Value::from(imu.gyr_bias_walk));
            put("g_norm", Value::from(imu.gravity.z));
        }

        put("wheel", flag(self.wheel.is_some()));
        if let Some(wheel) = &self.wheel {
            put("encoder_topic", Value::from(wheel.topic.as_str()));
            put("encode_resolution", Value::from(wheel.encoder_resolution));
            put("left_wheel_diameter", Value::from(wheel.left_wheel_diameter));
            put("right_wheel_diameter", Value::from(wheel.right_wheel_diameter));
            put("wheelbase", Value::from(wheel.wheelbase));
            put("enc_n", Value::from(wheel.encoder_noise));
            put("wheel_velocity_noise_sigma", Value::from(wheel.velocity_noise_sigma));
            put("wheel_gyro_noise_sigma", Value::from(wheel.gyro_noise_sigma));
            put("sx", Value::from(wheel.scale_x));
            put("sy", Value::from(wheel.scale_y));
            put("sw", Value::from(wheel.scale_w));
            put("estimate_wheel_extrinsic", flag(wheel.estimate_extrinsic));
            put("estimate_wheel_intrinsic", flag(wheel.estimate_intrinsic));
        }

        put("max_solver_time", Value::from(self.solver_time_budget));
        put("max_num_iterations", Value::from(i64::from(self.max_iterations)));
        put("keyframe_parallax", Value::from(self.min_parallax * FOCAL_LENGTH));
        put("output_path", Value::from(self.output_dir.display().to_string()));

        put("estimate_extrinsic", Value::from(self.extrinsic_mode.code()));
        if self.extrinsic_mode != ExtrinsicMode::EstimateFromScratch {
            let camera = &self.camera_extrinsics[0];
            put("extrinsicRotation_ic", matrix3_value(&camera.rotation));
            put("extrinsicTranslation_ic", vector3_value(&camera.translation));
            if let Some(wheel) = &self.wheel {
                put("extrinsicRotation_io", matrix3_value(&wheel.extrinsic.rotation));
                put("extrinsicTranslation_io", vector3_value(&wheel.extrinsic.translation));
            }
        }

        put("num_of_cam", Value::from(self.camera.num_cameras as i64));
        put("cam0_calib", Value::from(self.camera.calib_files[0].as_str()));
        if self.camera.stereo {
            put("cam1_calib", Value::from(self.camera.calib_files[1].as_str()));
            put("body_T_cam1", transform_value(&self.camera_extrinsics[1]));
        }

        put("td", Value::from(self.time_offset));
        put("estimate_td", flag(self.estimate_time_offset));
        put("estimate_td_wheel", flag(self.estimate_wheel_time_offset));

        serde_yaml::to_string(&map)
    }
}

fn flag(value: bool) -> Value {
    Value::from(i64::from(value))
}

fn matrix3_value(m: &Matrix3<f64>) -> Value {
    Value::Sequence(
        (0..3)
            .map(|r| Value::Sequence((0..3).map(|c| Value::from(m[(r, c)])).collect()))
            .collect(),
    )
}

fn vector3_value(v: &Vector3<f64>) -> Value {
    Value::Sequence(v.iter().map(|x| Value::from(*x)).collect())
}

fn transform_value(e: &Extrinsic) -> Value {
    let mut rows: Vec<Value> = (0..3)
        .map(|r| {
            let mut row: Vec<Value> = (0..3).map(|c| Value::from(e.rotation[(r, c)])).collect();
            row.push(Value::from(e.translation[r]));
            Value::Sequence(row)
        })
        .collect();
    rows.push(Value::Sequence(
        [0.0, 0.0, 0.0, 1.0].iter().map(|x| Value::from(*x)).collect(),
    ));
    Value::Sequence(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_settings(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    fn minimal_settings(output_dir: &Path) -> String {
        format!(
            "%YAML:1.0\n\
             ---\n\
             num_of_cam: 1\n\
             cam0_calib: \"cam0.yaml\"\n\
             image0_topic: \"/cam0/image_raw\"\n\
             keyframe_parallax: 10.0\n\
             estimate_extrinsic: 2\n\
             imu: 1\n\
             imu_topic: \"/imu0\"\n\
             estimate_td: 1\n\
             td: 0.003\n\
             output_path: \"{}\"\n",
            output_dir.display()
        )
    }

    #[test]
    fn test_parallax_normalized_by_focal_length() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "settings.yaml", &minimal_settings(dir.path()));

        let config = VioConfig::load(&path).unwrap();
        assert_eq!(config.min_parallax, 10.0 / FOCAL_LENGTH);
    }

    #[test]
    fn test_fixed_constants() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "settings.yaml", &minimal_settings(dir.path()));

        let config = VioConfig::load(&path).unwrap();
        assert_eq!(config.init_depth, 5.0);
        assert_eq!(config.bias_acc_threshold, 0.1);
        assert_eq!(config.bias_gyr_threshold, 0.1);
        assert!(!config.rolling_shutter);
    }

    #[test]
    fn test_scratch_mode_prepares_calibration_output() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "settings.yaml", &minimal_settings(dir.path()));

        let config = VioConfig::load(&path).unwrap();
        assert_eq!(config.extrinsic_mode, ExtrinsicMode::EstimateFromScratch);
        assert_eq!(config.camera_extrinsics, vec![Extrinsic::identity()]);
        assert_eq!(
            config.extrinsic_calib_path,
            Some(dir.path().join("extrinsic_parameter.csv"))
        );
    }

    #[test]
    fn test_result_log_created_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "settings.yaml", &minimal_settings(dir.path()));

        let config = VioConfig::load(&path).unwrap();
        assert_eq!(config.result_path, dir.path().join("vio.csv"));
        assert_eq!(fs::metadata(&config.result_path).unwrap().len(), 0);
    }

    #[test]
    fn test_result_log_truncates_previous_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("vio.csv"), "stale estimate rows\n").unwrap();
        let path = write_settings(&dir, "settings.yaml", &minimal_settings(dir.path()));

        let config = VioConfig::load(&path).unwrap();
        assert_eq!(fs::metadata(&config.result_path).unwrap().len(), 0);
    }

    #[test]
    fn test_calib_paths_joined_with_settings_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "settings.yaml", &minimal_settings(dir.path()));

        let config = VioConfig::load(&path).unwrap();
        assert_eq!(config.calib_paths, vec![dir.path().join("cam0.yaml")]);
    }

    #[test]
    fn test_no_imu_forces_flags_off() {
        let dir = TempDir::new().unwrap();
        let body = minimal_settings(dir.path()).replace("imu: 1", "imu: 0");
        let path = write_settings(&dir, "settings.yaml", &body);

        let config = VioConfig::load(&path).unwrap();
        assert!(config.imu.is_none());
        // Configured estimate_extrinsic: 2 and estimate_td: 1 are overridden
        assert_eq!(config.extrinsic_mode, ExtrinsicMode::Fixed);
        assert!(!config.estimate_time_offset);
        // The wheel-side flag is not tied to the IMU
        assert!(!config.estimate_wheel_time_offset);
    }

    #[test]
    fn test_td_seeds_both_offsets() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "settings.yaml", &minimal_settings(dir.path()));

        let config = VioConfig::load(&path).unwrap();
        assert_eq!(config.time_offset, 0.003);
        assert_eq!(config.wheel_time_offset, 0.003);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            VioConfig::load(&missing),
            Err(ConfigError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_unparseable_document_degrades_then_fails_count() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "settings.yaml", "{{{not yaml at all");

        // Every lookup misses, so the camera count defaults to zero and the
        // validation rejects it
        assert!(matches!(
            VioConfig::load(&path),
            Err(ConfigError::CameraCount(0))
        ));
    }
}
