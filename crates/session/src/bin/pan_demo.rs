//! Synthetic panning demo.
//!
//! Drives a full view session without any hardware: a noisy synthetic
//! sensor producer sweeps the device heading across a small Lake District
//! summit catalog, performs the scripted two-tap field-of-view calibration,
//! then logs which labels each pass places.
//!
//! Usage:
//!   cargo run -p peaksight-session --bin pan_demo -- [OPTIONS]
//!
//! Options:
//!   --seed <N>    RNG seed for the sensor noise (default: 7)
//!   --steps <N>   Sweep steps after calibration (default: 240)

use std::env;
use std::process;

use log::info;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use peaksight_core::geo::GeoPosition;
use peaksight_core::layout::HeuristicTextMetrics;
use peaksight_core::orientation::{SensorChannel, SensorSample};
use peaksight_session::{
    CatalogFeatureSource, MemorySettingsStore, PositionFix, RecordingSink, RenderSink,
    SummitRecord, TapAction, ViewSession,
};

const SCREEN_W: f32 = 800.0;
const SCREEN_H: f32 = 480.0;

struct Args {
    seed: u64,
    steps: u32,
}

fn parse_args() -> Args {
    let mut args = Args {
        seed: 7,
        steps: 240,
    };
    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "--seed" => {
                i += 1;
                args.seed = parse_num(&raw, i, "seed");
            }
            "--steps" => {
                i += 1;
                args.steps = parse_num(&raw, i, "steps") as u32;
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }
    args
}

fn parse_num(raw: &[String], i: usize, name: &str) -> u64 {
    raw.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("Invalid value for --{}", name);
            process::exit(1);
        })
}

fn print_usage() {
    eprintln!("Usage: pan_demo [--seed <N>] [--steps <N>]");
}

/// Gravity/magnetic pair for an upright device looking at `heading_deg`,
/// with per-axis noise.
fn sensor_pair(heading_deg: f32, rng: &mut StdRng) -> (Vector3<f32>, Vector3<f32>) {
    let h = heading_deg.to_radians();
    let mut n = |scale: f32| rng.random_range(-scale..scale);
    let gravity = Vector3::new(n(0.05), 9.81 + n(0.05), n(0.05));
    let geomagnetic = Vector3::new(
        -22.0 * h.sin() + n(0.4),
        -42.0 + n(0.4),
        -22.0 * h.cos() + n(0.4),
    );
    (gravity, geomagnetic)
}

/// Feed one noisy sample pair and return whether layout refreshed.
fn feed(session: &mut ViewSession, heading_deg: f32, rng: &mut StdRng) -> bool {
    let (gravity, geomagnetic) = sensor_pair(heading_deg, rng);
    session.handle_sensor_sample(SensorSample {
        channel: SensorChannel::Gravity,
        vector: gravity,
        reliable: true,
    });
    session
        .handle_sensor_sample(SensorSample {
            channel: SensorChannel::MagneticField,
            vector: geomagnetic,
            reliable: true,
        })
        .is_some()
}

/// Hold a heading long enough for the smoothing window to settle.
fn settle(session: &mut ViewSession, heading_deg: f32, rng: &mut StdRng) {
    for _ in 0..60 {
        feed(session, heading_deg, rng);
    }
}

fn lake_district() -> CatalogFeatureSource {
    CatalogFeatureSource::new(vec![
        SummitRecord::new(1, "Scafell Pike", 54.4542, -3.2116, 978.0),
        SummitRecord::new(2, "Helvellyn", 54.5270, -3.0163, 950.0),
        SummitRecord::new(3, "Skiddaw", 54.6516, -3.1464, 931.0),
        SummitRecord::new(4, "Blencathra", 54.6397, -3.0500, 868.0),
        SummitRecord::new(5, "Catbells", 54.5686, -3.1708, 451.0),
        SummitRecord::new(6, "Grisedale Pike", 54.5917, -3.2421, 791.0),
    ])
}

fn main() {
    env_logger::init();
    let args = parse_args();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut session = ViewSession::new(
        SCREEN_W,
        SCREEN_H,
        Box::new(MemorySettingsStore::default()),
        Box::new(HeuristicTextMetrics),
    );

    // Observer near Keswick
    session.update_fix(PositionFix {
        position: GeoPosition::with_altitude(54.6013, -3.1347, 80.0),
        accuracy_m: 25.0,
    });
    let catalog = lake_district();
    let count = session
        .refresh_features(&catalog)
        .expect("catalog filter cannot fail");
    info!("catalog loaded, {} features in range", count);

    // Scripted two-tap calibration: sight at 115 deg, pan right to 65 deg
    settle(&mut session, 115.0, &mut rng);
    assert_eq!(session.handle_tap(0.0, 0.0), TapAction::CalibrationFirstPoint);
    settle(&mut session, 65.0, &mut rng);
    match session.handle_tap(0.0, 0.0) {
        TapAction::CalibrationComplete { fov_deg } => {
            info!("calibrated: fov {:.1} deg", fov_deg)
        }
        other => {
            eprintln!("Calibration did not complete: {:?}", other);
            process::exit(1);
        }
    }

    // Sweep from SSW around through north, crossing the 0/360 boundary
    let mut sink = RecordingSink::new();
    let mut total_placements = 0usize;
    for step in 0..args.steps {
        let heading = 200.0 + step as f32 * (320.0 / args.steps as f32);
        if !feed(&mut session, heading, &mut rng) {
            continue;
        }
        let status = session.status_readout();
        let output = session.last_output();
        sink.submit(&output.primitives);
        total_placements += output.labels.len();
        if step % 20 == 0 {
            info!(
                "heading {:6.1} deg  sd {:3}  labels {}",
                status.heading_deg,
                status.variance_score,
                output.labels.len()
            );
            for label in output.labels.iter() {
                let name = session
                    .features()
                    .iter()
                    .find(|f| f.id == label.feature_id)
                    .map(|f| f.name.as_str())
                    .unwrap_or("?");
                info!(
                    "  {:<16} ratio {:+.2}  font {:.0}",
                    name, label.screen_ratio, label.font_size
                );
            }
        }
    }

    println!(
        "swept {} steps, {} frames, {} label placements, final fov {:.1} deg",
        args.steps,
        sink.frames().len(),
        total_placements,
        session.status_readout().fov_deg
    );
}
