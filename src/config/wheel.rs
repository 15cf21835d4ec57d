//! Wheel odometer settings.

use crate::geometry::Extrinsic;

use super::document::Document;

/// Differential-drive odometer geometry, noise model, and calibration flags.
///
/// Present only when the settings file enables the sensor (`wheel: 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct WheelSettings {
    /// Encoder measurement topic
    pub topic: String,
    /// Encoder ticks per wheel revolution
    pub encoder_resolution: f64,
    /// Left wheel diameter (meters)
    pub left_wheel_diameter: f64,
    /// Right wheel diameter (meters)
    pub right_wheel_diameter: f64,
    /// Distance between wheel centers (meters)
    pub wheelbase: f64,
    /// Encoder tick noise variance
    pub encoder_noise: f64,
    /// Linear velocity noise sigma
    pub velocity_noise_sigma: f64,
    /// Angular velocity noise sigma
    pub gyro_noise_sigma: f64,
    /// Longitudinal scale correction
    pub scale_x: f64,
    /// Lateral scale correction
    pub scale_y: f64,
    /// Angular scale correction
    pub scale_w: f64,
    /// Estimate the wheel-to-body extrinsic online
    pub estimate_extrinsic: bool,
    /// Estimate the wheel intrinsics (diameters, wheelbase) online
    pub estimate_intrinsic: bool,
    /// Wheel-to-body transform, filled in by extrinsic resolution
    pub extrinsic: Extrinsic,
}

impl WheelSettings {
    /// Read the wheel section behind its enable flag.
    ///
    /// The scale corrections default to unity (no correction) when absent;
    /// everything else follows the zero-default policy.
    pub(crate) fn from_document(doc: &Document) -> Option<Self> {
        if !doc.flag("wheel").unwrap_or(false) {
            return None;
        }

        let settings = Self {
            topic: doc.string("encoder_topic").unwrap_or_default(),
            encoder_resolution: doc.f64("encode_resolution").unwrap_or(0.0),
            left_wheel_diameter: doc.f64("left_wheel_diameter").unwrap_or(0.0),
            right_wheel_diameter: doc.f64("right_wheel_diameter").unwrap_or(0.0),
            wheelbase: doc.f64("wheelbase").unwrap_or(0.0),
            encoder_noise: doc.f64("enc_n").unwrap_or(0.0),
            velocity_noise_sigma: doc.f64("wheel_velocity_noise_sigma").unwrap_or(0.0),
            gyro_noise_sigma: doc.f64("wheel_gyro_noise_sigma").unwrap_or(0.0),
            scale_x: doc.f64("sx").unwrap_or(1.0),
            scale_y: doc.f64("sy").unwrap_or(1.0),
            scale_w: doc.f64("sw").unwrap_or(1.0),
            estimate_extrinsic: doc.flag("estimate_wheel_extrinsic").unwrap_or(false),
            estimate_intrinsic: doc.flag("estimate_wheel_intrinsic").unwrap_or(false),
            extrinsic: Extrinsic::default(),
        };
        log::info!("wheel topic: {}", settings.topic);
        Some(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_section() {
        let doc = Document::parse(
            "wheel: 1\n\
             encoder_topic: \"/encoder\"\n\
             encode_resolution: 4096.0\n\
             left_wheel_diameter: 0.125\n\
             right_wheel_diameter: 0.126\n\
             wheelbase: 0.36\n\
             enc_n: 0.01\n\
             wheel_velocity_noise_sigma: 0.05\n\
             wheel_gyro_noise_sigma: 0.02\n\
             sx: 1.002\n\
             sy: 0.998\n\
             sw: 1.01\n\
             estimate_wheel_extrinsic: 1\n\
             estimate_wheel_intrinsic: 0\n",
        )
        .unwrap();

        let wheel = WheelSettings::from_document(&doc).unwrap();
        assert_eq!(wheel.topic, "/encoder");
        assert_eq!(wheel.wheelbase, 0.36);
        assert_eq!(wheel.scale_x, 1.002);
        assert!(wheel.estimate_extrinsic);
        assert!(!wheel.estimate_intrinsic);
        assert_eq!(wheel.extrinsic, Extrinsic::default());
    }

    #[test]
    fn test_scale_corrections_default_to_unity() {
        let doc = Document::parse("wheel: 1\nencoder_topic: \"/encoder\"\n").unwrap();
        let wheel = WheelSettings::from_document(&doc).unwrap();
        assert_eq!((wheel.scale_x, wheel.scale_y, wheel.scale_w), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_disabled_section_is_absent() {
        let doc = Document::parse("wheel: 0\nwheelbase: 0.36\n").unwrap();
        assert!(WheelSettings::from_document(&doc).is_none());
    }
}
