use camwatch::prelude::v1::{Result, *};
use camwatch_cv::{CvBorderFlash, CvFrameSource, CvPreprocessor, CvPreview};
use clap::*;
use log::*;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

mod control;
mod worker;

use control::{spawn_stdin_reader, Command as ControlCommand, ControlSurface, HELP};
use worker::MonitorWorker;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("camwatch")
        .version(crate_version!())
        .about("Flashes the screen when the camera sees motion")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("device")
                .long("device")
                .short('d')
                .takes_value(true)
                .help("Camera index"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .short('t')
                .takes_value(true)
                .help("Motion score that triggers an alert"),
        )
        .arg(
            Arg::new("position-file")
                .long("position-file")
                .takes_value(true)
                .help("Where the preview position is stored"),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Log alerts instead of drawing them"),
        )
        .get_matches();

    let mut config = match matches.value_of("config") {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };

    if let Some(device) = matches.value_of("device") {
        config.device_index = device.parse()?;
    }

    if let Some(threshold) = matches.value_of("threshold") {
        config.detection.threshold = threshold.parse()?;
    }

    let store = match matches.value_of("position-file") {
        Some(path) => PositionStore::new(path),
        None => PositionStore::user_default()?,
    };

    let handle = MonitorHandle::new(store.load());

    let coordinator = if matches.is_present("headless") {
        AlertCoordinator::headless(config.alert)
    } else {
        AlertCoordinator::new(
            config.alert,
            Box::new(CvBorderFlash::new(config.display)),
            Box::new(CvPreview::new(&config.display)),
        )
    };

    let monitor = MonitorLoop::new(
        &config,
        Box::new(CvPreprocessor::try_new(config.detection.blur_kernel)?),
        MotionDetector::new(&config.detection),
        coordinator,
        handle.clone(),
    )?;
    let worker = MonitorWorker::spawn(monitor, CvFrameSource::open);

    println!("{}", HELP);

    let commands = spawn_stdin_reader();
    let mut surface = ControlSurface::new(handle, store);

    while !worker.is_finished() {
        match commands.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => {
                match line.parse::<ControlCommand>().and_then(|c| {
                    let quit = c == ControlCommand::Quit;
                    surface.apply(c).map(|reply| (reply, quit))
                }) {
                    Ok((reply, quit)) => {
                        println!("{}", reply);
                        if quit {
                            break;
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // No console attached, keep monitoring until the loop ends on its own.
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    worker.join().map_err(|e| {
        if let Some(MonitorError::DeviceUnavailable { index }) = e.downcast_ref() {
            error!("Camera {} not detected!", index);
        }
        e
    })
}
