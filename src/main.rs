mod batch;
mod config;
mod device;
mod dump;
mod edge;
mod engine;
mod error;
mod gesture;
mod input;
mod mode;
mod region;

use std::process::ExitCode;
use std::thread;

use clap::Parser;

use config::{Cli, Command, Config};
use device::{TouchSource, UinputSink};
use edge::EdgeZone;
use engine::{Engine, EngineSettings};
use error::{Error, Result};
use input::Layout;
use mode::OutputMode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = Config::load(&cli);

    let verbose = loaded.as_ref().map_or(cli.verbose, |c| c.verbose);
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let result = match (&cli.command, loaded) {
        (Some(Command::Dump { device, by_name }), loaded) => {
            if let Err(e) = loaded {
                log::warn!("Ignoring config: {}", e);
            }
            dump(device, *by_name)
        }
        (None, Ok(config)) => {
            if let Some(path) = &config.file {
                log::debug!("Loaded config from {}", path.display());
            }
            run(&config)
        }
        (None, Err(e)) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::SourceRead(e)) => {
            log::info!("Touchscreen stream ended: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn dump(device: &str, by_name: bool) -> Result<()> {
    let mut source = TouchSource::open(device, by_name)?;
    log::info!("Dumping events from {}", source.path().display());

    let stdout = std::io::stdout();
    match dump::run_dump(&mut source, Layout::native(), &mut stdout.lock()) {
        Err(Error::SourceRead(e)) => {
            log::info!("Stream ended: {}", e);
            Ok(())
        }
        other => other,
    }
}

fn run(config: &Config) -> Result<()> {
    config.validate()?;

    let mut source = TouchSource::open(config.device()?, config.by_name)?;
    if config.grab {
        source.grab();
    }

    let rect = region::compute_rectangle(&source.bounds, &config.area)?;
    log::info!(
        "trackscreen starting (device={}, area={}, rect={}, mode={})",
        source.path().display(),
        config.area,
        rect,
        config.mode
    );

    let sink = match config.mode {
        OutputMode::Passthrough => device::create_trackpad(&source, &rect)?,
        OutputMode::Relative => device::create_pointer()?,
    };

    let side: Option<(EdgeZone, UinputSink)> = match (config.side_key, config.mode) {
        (Some(keycode), OutputMode::Passthrough) => Some((
            EdgeZone::new(keycode),
            device::create_side_keyboard(keycode)?,
        )),
        (Some(keycode), OutputMode::Relative) => {
            log::warn!("Side key {} ignored in relative mode", keycode);
            None
        }
        (None, _) => None,
    };

    thread::sleep(device::SETTLE_DELAY);

    let settings = EngineSettings {
        mode: config.mode,
        rect,
        scale: config.scale,
        batch_capacity: config.batch_capacity,
    };
    let mut engine = Engine::new(settings, source.model, sink, side);
    let result = engine.run(&mut source, Layout::native());
    log::debug!("Engine stopped ({:?})", engine.state());
    result
}
