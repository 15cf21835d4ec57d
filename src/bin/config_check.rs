//! Validate a settings file and print the resolved parameter set.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin drishti-config-check -- configs/euroc_stereo_imu_wheel.yaml
//! ```
//!
//! Exits nonzero on a fatal configuration error (unreadable file, bad
//! camera count), which makes it usable as a pre-flight check in launch
//! scripts.

use std::path::Path;

use clap::Parser;

use drishti_config::{ConfigError, VioConfig};

#[derive(Parser)]
#[command(name = "drishti-config-check")]
#[command(about = "Validate a Drishti settings file and print the resolved parameters")]
struct Args {
    /// Settings file to validate
    settings: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let config = VioConfig::load(Path::new(&args.settings))?;

    println!("settings: {}", args.settings);
    println!(
        "cameras: {} ({}x{}, stereo: {})",
        config.camera.num_cameras,
        config.camera.image_width,
        config.camera.image_height,
        config.camera.stereo
    );
    for path in &config.calib_paths {
        println!("  calib: {}", path.display());
    }
    match &config.imu {
        Some(imu) => println!(
            "imu: {} (acc_n {}, acc_w {}, gyr_n {}, gyr_w {})",
            imu.topic, imu.acc_noise, imu.acc_bias_walk, imu.gyr_noise, imu.gyr_bias_walk
        ),
        None => println!("imu: disabled"),
    }
    match &config.wheel {
        Some(wheel) => println!(
            "wheel: {} (wheelbase {} m, scale [{}, {}, {}])",
            wheel.topic, wheel.wheelbase, wheel.scale_x, wheel.scale_y, wheel.scale_w
        ),
        None => println!("wheel: disabled"),
    }
    println!("extrinsic mode: {:?}", config.extrinsic_mode);
    println!(
        "td: {} (estimate: {}), wheel td: {} (estimate: {})",
        config.time_offset,
        config.estimate_time_offset,
        config.wheel_time_offset,
        config.estimate_wheel_time_offset
    );
    println!("result log: {}", config.result_path.display());
    if let Some(path) = &config.extrinsic_calib_path {
        println!("extrinsic calibration log: {}", path.display());
    }

    Ok(())
}
