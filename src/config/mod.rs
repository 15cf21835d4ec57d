//! Settings loading for the Drishti estimator.
//!
//! Loads all parameters from a single OpenCV-FileStorage-style YAML file
//! into one immutable [`VioConfig`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use drishti_config::config::VioConfig;
//!
//! let config = VioConfig::load(Path::new("configs/realsense_d435i.yaml"))?;
//!
//! // Sections for disabled sensors are simply absent
//! if let Some(wheel) = &config.wheel {
//!     println!("wheelbase: {} m", wheel.wheelbase);
//! }
//! ```
//!
//! ## Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`CameraSettings`] | Topics, tracker tuning, image dimensions, camera count |
//! | [`ImuSettings`] | Noise processes and gravity (present when `imu: 1`) |
//! | [`WheelSettings`] | Geometry, noise sigmas, scale corrections (present when `wheel: 1`) |
//! | [`VioConfig`] | Everything above plus time offsets, optimizer scalars, output paths |
//!
//! ## Example settings file
//!
//! ```yaml
//! %YAML:1.0
//! ---
//! image0_topic: "/cam0/image_raw"
//! num_of_cam: 1
//! cam0_calib: "cam0_pinhole.yaml"
//! image_width: 752
//! image_height: 480
//!
//! imu: 1
//! imu_topic: "/imu0"
//! acc_n: 0.08
//!
//! estimate_extrinsic: 0
//! extrinsicRotation_ic: !!opencv-matrix
//!    rows: 3
//!    cols: 3
//!    dt: d
//!    data: [0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]
//!
//! output_path: "/tmp/drishti"
//! ```

mod camera;
mod document;
mod error;
mod extrinsics;
mod imu;
mod vio;
mod wheel;

// Re-export main types
pub use error::{ConfigError, FieldError};
pub use vio::{VioConfig, FOCAL_LENGTH};

// Re-export section types
pub use camera::CameraSettings;
pub use document::{Document, MatrixField};
pub use extrinsics::ExtrinsicMode;
pub use imu::ImuSettings;
pub use wheel::WheelSettings;
