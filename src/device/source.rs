use std::fs::{self, File};
use std::io::{self, Read};
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};

use evdevil::event::Abs;
use evdevil::{AbsInfo, Evdev};

use crate::error::{Error, Result};
use crate::input::PointerModel;
use crate::region::{AxisBounds, SourceBounds};

const INPUT_DIR: &str = "/dev/input";

/// Optional contact-shape axes mirrored onto the trackpad when present.
const MIRRORED_AXES: [Abs; 3] = [Abs::MT_TOUCH_MAJOR, Abs::MT_TOUCH_MINOR, Abs::MT_PRESSURE];

/// An opened touchscreen and its static properties.
pub struct TouchSource {
    path: PathBuf,
    evdev: Evdev,
    stream: File,
    pub bounds: SourceBounds,
    pub model: PointerModel,
    /// Extra axes to register on the trackpad, with the source's ranges.
    pub mirrored_axes: Vec<(Abs, AbsInfo)>,
}

impl TouchSource {
    /// Open a touchscreen by device path, or by device name when `by_name` is set.
    pub fn open(device: &str, by_name: bool) -> Result<Self> {
        let (path, evdev) = if by_name {
            find_by_name(device)?
        } else {
            let evdev = Evdev::open(device).map_err(Error::setup("open touchscreen"))?;
            (PathBuf::from(device), evdev)
        };

        let axes = evdev
            .supported_abs_axes()
            .map_err(Error::setup("query absolute axes"))?;

        let bounds = SourceBounds {
            x: axis_bounds(&evdev, Abs::X, "query X axis")?,
            y: axis_bounds(&evdev, Abs::Y, "query Y axis")?,
            pressure: if axes.contains(Abs::PRESSURE) {
                Some(axis_bounds(&evdev, Abs::PRESSURE, "query pressure axis")?)
            } else {
                None
            },
        };

        let model = if axes.contains(Abs::MT_SLOT) {
            PointerModel::MultiTouch
        } else {
            PointerModel::Single
        };

        let mut mirrored_axes = Vec::new();
        for abs in MIRRORED_AXES {
            if axes.contains(abs) {
                let info = evdev.abs_info(abs).map_err(Error::setup("query contact axes"))?;
                mirrored_axes.push((abs, info));
            }
        }

        // Reads go through a duplicate of the evdev descriptor so an exclusive
        // grab on `evdev` also covers the stream.
        let stream = evdev
            .as_fd()
            .try_clone_to_owned()
            .map(File::from)
            .map_err(Error::setup("duplicate touchscreen descriptor"))?;

        log::info!(
            "Touchscreen {}: X [{} - {}], Y [{} - {}], pressure {}, {:?}",
            path.display(),
            bounds.x.min,
            bounds.x.max,
            bounds.y.min,
            bounds.y.max,
            bounds
                .pressure
                .map(|p| format!("[{} - {}]", p.min, p.max))
                .unwrap_or_else(|| "none".into()),
            model,
        );

        Ok(Self {
            path,
            evdev,
            stream,
            bounds,
            model,
            mirrored_axes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Request exclusive access. Failure only means the desktop also sees the touches.
    pub fn grab(&mut self) {
        match self.evdev.grab() {
            Ok(()) => log::info!("Grabbed {} exclusively", self.path.display()),
            Err(e) => log::warn!("Failed to grab {} exclusively: {}", self.path.display(), e),
        }
    }
}

impl Read for TouchSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

fn axis_bounds(evdev: &Evdev, abs: Abs, step: &'static str) -> Result<AxisBounds> {
    let info = evdev.abs_info(abs).map_err(Error::setup(step))?;
    Ok(AxisBounds::new(info.minimum(), info.maximum(), info.resolution()))
}

/// Scan `/dev/input/event*` for a multi-touch device with the given name.
fn find_by_name(name: &str) -> Result<(PathBuf, Evdev)> {
    let mut paths: Vec<PathBuf> = fs::read_dir(INPUT_DIR)
        .map_err(Error::setup("list /dev/input"))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with("event"))
        })
        .collect();
    paths.sort();

    for path in paths {
        let evdev = match Evdev::open(&path) {
            Ok(evdev) => evdev,
            Err(e) => {
                log::debug!("Cannot open {}: {}", path.display(), e);
                continue;
            }
        };

        let device_name = match evdev.name() {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Could not get name for {}: {}", path.display(), e);
                continue;
            }
        };
        if device_name != name {
            log::debug!("Skip '{}' != '{}'", device_name, name);
            continue;
        }

        let has_mt = evdev
            .supported_abs_axes()
            .map(|axes| axes.contains(Abs::MT_POSITION_Y))
            .unwrap_or(false);
        if !has_mt {
            log::debug!("Skip {}, missing ABS_MT_POSITION_Y", path.display());
            continue;
        }

        log::info!("Found {} matching '{}'", path.display(), name);
        return Ok((path, evdev));
    }

    Err(Error::DeviceSetup {
        step: "find touchscreen by name",
        source: io::Error::new(io::ErrorKind::NotFound, format!("no device named '{}'", name)),
    })
}
