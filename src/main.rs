use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::channel::{self, Receiver};
use ds_motion::config::{CONTROLLER_PRODUCT_ID, SONY_VENDOR_ID};
use ds_motion::error::status_of;
use ds_motion::report::SensorReport;
use ds_motion::{
    DeviceAddress, DeviceId, MotionConfig, MotionError, MotionHub, MotionService,
    OrientationMethod, TransportEvent, HISTORY_LEN,
};
use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Tilt swing of the simulated controller, radians
const SWING: f32 = PI / 6.0;
/// Seconds per full swing
const SWING_PERIOD: f32 = 4.0;

#[derive(Parser, Debug)]
#[command(name = "ds_motion_sim")]
#[command(about = "Simulated wireless controller feeding the motion core", long_about = None)]
struct Args {
    /// Duration in seconds (0 = continuous)
    #[arg(value_name = "SECONDS", default_value = "5")]
    seconds: u64,

    /// Controller report rate in Hz
    #[arg(long, default_value = "250")]
    report_hz: u32,

    /// Consumer poll rate in Hz
    #[arg(long, default_value = "60")]
    poll_hz: u32,

    /// Orientation method (cross_product, euler_angles); overrides the config
    #[arg(long)]
    orientation: Option<OrientationMethod>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sensor records to dump before shutdown
    #[arg(long, default_value = "4")]
    history: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MotionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MotionConfig::default(),
    };
    if let Some(method) = args.orientation {
        config.orientation = method;
    }

    log::info!("DS Motion simulator starting");
    log::info!("  Duration: {} seconds (0=continuous)", args.seconds);
    log::info!("  Reports: {} Hz, polls: {} Hz", args.report_hz, args.poll_hz);
    log::info!("  Orientation: {}", config.orientation);

    let hub: Arc<MotionHub<HISTORY_LEN>> = Arc::new(MotionHub::with_system_clock(&config));
    let service = MotionService::new(Arc::clone(&hub));

    let (stop_tx, stop_rx) = channel::bounded::<()>(0);
    let producer = {
        let hub = Arc::clone(&hub);
        let report_hz = args.report_hz.max(1);
        thread::Builder::new()
            .name("controller".to_string())
            .spawn(move || run_controller(&hub, report_hz, stop_rx))
            .context("spawning controller thread")?
    };

    service.start_sampling()?;

    let ticker = channel::tick(Duration::from_secs_f64(1.0 / f64::from(args.poll_hz.max(1))));
    let deadline = if args.seconds > 0 {
        channel::after(Duration::from_secs(args.seconds))
    } else {
        channel::never()
    };

    let mut polls = 0u64;
    loop {
        crossbeam::select! {
            recv(ticker) -> _ => {
                polls += 1;
                let result = service.motion_state();
                match &result {
                    Ok(state) if polls % u64::from(args.poll_hz.max(1)) == 0 => {
                        log::info!(
                            "t={:>8}us seq={:>6} accel=({:+.3}, {:+.3}, {:+.3}) q=({:+.3}, {:+.3}, {:+.3}, {:+.3}) down={:?}",
                            state.timestamp,
                            state.sequence,
                            state.acceleration[0],
                            state.acceleration[1],
                            state.acceleration[2],
                            state.orientation[0],
                            state.orientation[1],
                            state.orientation[2],
                            state.orientation[3],
                            state.basic_orientation,
                        );
                    }
                    Ok(_) => {}
                    Err(MotionError::NotConnected) => {
                        let status = status_of(&result);
                        log::debug!("Poll {}: no controller (status {})", polls, status);
                    }
                    Err(e) => log::warn!("Poll {} failed: {}", polls, e),
                }
            }
            recv(deadline) -> _ => {
                log::info!("Duration reached, stopping...");
                break;
            }
        }
    }

    let records = service.sensor_states(args.history)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    if let Some(session) = service.stop_sampling()? {
        log::info!("Session {} ran {} polls", session.session_id, polls);
    }

    drop(stop_tx);
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("controller thread panicked"))?;

    Ok(())
}

/// Transport side: pair, stream tagged reports until told to stop, unpair
fn run_controller(hub: &MotionHub<HISTORY_LEN>, report_hz: u32, stop: Receiver<()>) {
    let address = DeviceAddress::new(0x0011_2233, 0x0000_4455);
    let device = DeviceId::new(SONY_VENDOR_ID, CONTROLLER_PRODUCT_ID);
    let dt = 1.0 / report_hz as f32;

    deliver(hub, &TransportEvent::connect(address, device));

    let ticker = channel::tick(Duration::from_secs_f32(dt));
    let mut n = 0u64;
    loop {
        crossbeam::select! {
            recv(ticker) -> _ => {
                let t = n as f32 * dt;
                let buf = simulated_report(t).to_bytes();
                deliver(hub, &TransportEvent::report(address, &buf));

                // Occasional non-sensor traffic the gate has to skip
                if n % 100 == 99 {
                    let mut other = buf;
                    other[0] = 0x01;
                    deliver(hub, &TransportEvent::report(address, &other));
                    deliver(hub, &TransportEvent::consumed(address));
                }
                n += 1;
            }
            recv(stop) -> _ => break,
        }
    }

    deliver(hub, &TransportEvent::disconnect(address));
}

fn deliver(hub: &MotionHub<HISTORY_LEN>, event: &TransportEvent<'_>) {
    if let Err(e) = hub.handle_event(event) {
        log::warn!("Transport event dropped: {}", e);
    }
}

/// Controller rolling back and forth about the console x axis
fn simulated_report(t: f32) -> SensorReport {
    let phase = 2.0 * PI * t / SWING_PERIOD;
    let roll = SWING * phase.sin();
    let roll_rate = SWING * (2.0 * PI / SWING_PERIOD) * phase.cos();

    let scale = 8192.0;
    // Console gravity (0, -sin r, -cos r) expressed on controller axes
    let accel = [0, (roll.cos() * scale) as i16, (roll.sin() * scale) as i16];
    let gyro = [(roll_rate * scale / PI) as i16, 0, 0];
    SensorReport { accel, gyro }
}
