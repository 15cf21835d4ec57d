//! # drishti-config
//!
//! Settings loading and validation for the Drishti visual-inertial-wheel
//! odometry estimator.
//!
//! ## Overview
//!
//! The estimator fuses up to three sensor streams:
//!
//! - **Camera(s)** - one or two image streams feeding the feature tracker
//! - **IMU** - accelerometer and gyroscope with modeled noise processes
//! - **Wheel odometer** - differential drive encoders with scale corrections
//!
//! All static parameters for these sensors, the feature tracker, and the
//! sliding-window optimizer come from a single OpenCV-FileStorage-style YAML
//! settings file. This crate reads that file exactly once at startup and
//! produces one immutable [`VioConfig`] that every other component consumes
//! by reference. Nothing here runs after initialization; there is no
//! reconfiguration, reload, or concurrent access.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use drishti_config::VioConfig;
//!
//! let config = VioConfig::load(Path::new("configs/euroc_stereo_imu_wheel.yaml"))?;
//!
//! println!("{} camera(s), stereo: {}", config.camera.num_cameras, config.camera.stereo);
//! if let Some(imu) = &config.imu {
//!     println!("IMU on {} (acc_n = {})", imu.topic, imu.acc_noise);
//! }
//! ```
//!
//! ## Failure model
//!
//! Only two conditions are fatal: an unreadable settings file and a camera
//! count outside {1, 2}. Everything else degrades: an unparseable document
//! or an absent key resolves to a zero/default value and loading continues.
//! See [`config::document`] for the full policy.

#![warn(missing_docs)]

pub mod config;
pub mod geometry;

pub use config::{
    CameraSettings, ConfigError, Document, ExtrinsicMode, FieldError, ImuSettings, VioConfig,
    WheelSettings,
};
pub use geometry::Extrinsic;
