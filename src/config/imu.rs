//! Inertial sensor settings.

use nalgebra::Vector3;

use super::document::Document;

/// IMU topic, noise processes, and gravity.
///
/// Present only when the settings file enables the sensor (`imu: 1`).
/// When absent, nothing downstream references these values.
#[derive(Debug, Clone, PartialEq)]
pub struct ImuSettings {
    /// IMU measurement topic
    pub topic: String,
    /// Accelerometer noise density
    pub acc_noise: f64,
    /// Accelerometer bias random walk
    pub acc_bias_walk: f64,
    /// Gyroscope noise density
    pub gyr_noise: f64,
    /// Gyroscope bias random walk
    pub gyr_bias_walk: f64,
    /// Gravity in the world frame, z set from `g_norm`
    pub gravity: Vector3<f64>,
}

impl ImuSettings {
    /// Read the inertial section behind its enable flag.
    pub(crate) fn from_document(doc: &Document) -> Option<Self> {
        let enabled = doc.flag("imu").unwrap_or(false);
        log::info!("IMU enabled: {}", enabled);
        if !enabled {
            return None;
        }

        let settings = Self {
            topic: doc.string("imu_topic").unwrap_or_default(),
            acc_noise: doc.f64("acc_n").unwrap_or(0.0),
            acc_bias_walk: doc.f64("acc_w").unwrap_or(0.0),
            gyr_noise: doc.f64("gyr_n").unwrap_or(0.0),
            gyr_bias_walk: doc.f64("gyr_w").unwrap_or(0.0),
            gravity: Vector3::new(0.0, 0.0, doc.f64("g_norm").unwrap_or(0.0)),
        };
        log::info!("IMU topic: {}", settings.topic);
        Some(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_section() {
        let doc = Document::parse(
            "imu: 1\n\
             imu_topic: \"/imu0\"\n\
             acc_n: 0.08\n\
             acc_w: 0.00004\n\
             gyr_n: 0.004\n\
             gyr_w: 0.000002\n\
             g_norm: 9.81007\n",
        )
        .unwrap();

        let imu = ImuSettings::from_document(&doc).unwrap();
        assert_eq!(imu.topic, "/imu0");
        assert_eq!(imu.acc_noise, 0.08);
        assert_eq!(imu.gyr_bias_walk, 0.000002);
        assert_eq!(imu.gravity, Vector3::new(0.0, 0.0, 9.81007));
    }

    #[test]
    fn test_disabled_section_is_absent() {
        let doc = Document::parse("imu: 0\nacc_n: 0.08\n").unwrap();
        assert!(ImuSettings::from_document(&doc).is_none());
    }

    #[test]
    fn test_missing_flag_means_disabled() {
        let doc = Document::empty();
        assert!(ImuSettings::from_document(&doc).is_none());
    }
}
