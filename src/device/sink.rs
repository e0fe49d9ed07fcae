use std::io;
use std::os::fd::AsRawFd;
use std::time::Duration;

use evdevil::event::{Abs, InputEvent, Key, Rel};
use evdevil::uinput::{AbsSetup, UinputDevice};
use evdevil::{AbsInfo, Bus, InputId, InputProp};

use crate::batch::EventSink;
use crate::error::{Error, Result};
use crate::input::{Event, MAX_SLOTS};
use crate::mode::OutputMode;
use crate::region::Rectangle;

use super::TouchSource;

const BUS_VIRTUAL: u16 = 0x06;
const VENDOR_ID: u16 = 0x0650;
const PRODUCT_TRACKPAD: u16 = 0x0911;
const PRODUCT_POINTER: u16 = 0x0912;
const PRODUCT_SIDE_KEY: u16 = 0x0913;

/// Time given to udev/libinput to attach before the first event is sent.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// A created uinput device accepting engine events.
pub struct UinputSink {
    device: UinputDevice,
}

impl UinputSink {
    fn new(device: UinputDevice, role: &str) -> Result<Self> {
        // A stalled consumer must fail the write, not block the read loop.
        set_nonblocking(&device).map_err(Error::setup("set uinput non-blocking"))?;
        if let Ok(name) = device.sysname() {
            log::info!(
                "{} device ready: /sys/devices/virtual/input/{}",
                role,
                name.to_string_lossy()
            );
        }
        Ok(Self { device })
    }
}

fn set_nonblocking(fd: &impl AsRawFd) -> io::Result<()> {
    let raw_fd = fd.as_raw_fd();

    let current = unsafe { libc::fcntl(raw_fd, libc::F_GETFL) };
    if current < 0 {
        return Err(io::Error::last_os_error());
    }
    let rc = unsafe { libc::fcntl(raw_fd, libc::F_SETFL, current | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl EventSink for UinputSink {
    fn write(&mut self, events: &[Event]) -> io::Result<()> {
        let events: Vec<InputEvent> = events.iter().map(Event::to_input_event).collect();
        self.device.write(&events)?;
        Ok(())
    }
}

fn input_id(product: u16) -> InputId {
    InputId::new(Bus::from_raw(BUS_VIRTUAL), VENDOR_ID, product, 0)
}

/// Multi-touch trackpad whose axes span the mapped area.
pub fn create_trackpad(source: &TouchSource, rect: &Rectangle) -> Result<UinputSink> {
    let bounds = &source.bounds;
    let width = || AbsInfo::new(0, rect.x.len() - 1).with_resolution(bounds.x.resolution);
    let height = || AbsInfo::new(0, rect.y.len() - 1).with_resolution(bounds.y.resolution);

    let mut axes = vec![
        AbsSetup::new(Abs::X, width()),
        AbsSetup::new(Abs::Y, height()),
        AbsSetup::new(Abs::MT_SLOT, AbsInfo::new(0, (MAX_SLOTS - 1) as i32)),
        AbsSetup::new(Abs::MT_TRACKING_ID, AbsInfo::new(-1, i32::MAX)),
        AbsSetup::new(Abs::MT_POSITION_X, width()),
        AbsSetup::new(Abs::MT_POSITION_Y, height()),
    ];
    if let Some(pressure) = bounds.pressure {
        axes.push(AbsSetup::new(
            Abs::PRESSURE,
            AbsInfo::new(pressure.min, pressure.max),
        ));
    }
    for (abs, info) in &source.mirrored_axes {
        axes.push(AbsSetup::new(*abs, info.clone()));
    }

    let device = UinputDevice::builder()
        .map_err(Error::setup("open /dev/uinput"))?
        .with_input_id(input_id(PRODUCT_TRACKPAD))
        .map_err(Error::setup("set trackpad id"))?
        .with_props([InputProp::POINTER, InputProp::BUTTONPAD])
        .map_err(Error::setup("set trackpad properties"))?
        .with_abs_axes(axes)
        .map_err(Error::setup("register trackpad axes"))?
        .with_keys([
            Key::BTN_LEFT,
            Key::BTN_TOUCH,
            Key::BTN_TOOL_FINGER,
            Key::BTN_TOOL_DOUBLETAP,
            Key::BTN_TOOL_TRIPLETAP,
            Key::BTN_TOOL_QUADTAP,
            Key::BTN_TOOL_QUINTTAP,
        ])
        .map_err(Error::setup("register trackpad keys"))?
        .build(OutputMode::Passthrough.device_name())
        .map_err(Error::setup("create trackpad"))?;

    UinputSink::new(device, "Trackpad")
}

/// Relative pointer with a single button.
pub fn create_pointer() -> Result<UinputSink> {
    let device = UinputDevice::builder()
        .map_err(Error::setup("open /dev/uinput"))?
        .with_input_id(input_id(PRODUCT_POINTER))
        .map_err(Error::setup("set pointer id"))?
        .with_props([InputProp::POINTER])
        .map_err(Error::setup("set pointer properties"))?
        .with_rel_axes([Rel::X, Rel::Y])
        .map_err(Error::setup("register pointer axes"))?
        .with_keys([Key::BTN_LEFT])
        .map_err(Error::setup("register pointer keys"))?
        .build(OutputMode::Relative.device_name())
        .map_err(Error::setup("create pointer"))?;

    UinputSink::new(device, "Pointer")
}

/// Keyboard carrying only the side-touch key.
pub fn create_side_keyboard(keycode: u16) -> Result<UinputSink> {
    let device = UinputDevice::builder()
        .map_err(Error::setup("open /dev/uinput"))?
        .with_input_id(input_id(PRODUCT_SIDE_KEY))
        .map_err(Error::setup("set side key id"))?
        .with_keys([Key::from_raw(keycode)])
        .map_err(Error::setup("register side key"))?
        .build("Trackscreen Side Key")
        .map_err(Error::setup("create side key device"))?;

    UinputSink::new(device, "Side key")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_set_nonblocking_keeps_other_flags() {
        let file = File::options().write(true).open("/dev/null").unwrap();
        let before = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_GETFL) };
        assert_eq!(before & libc::O_NONBLOCK, 0);

        set_nonblocking(&file).unwrap();
        let after = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_GETFL) };
        assert_eq!(after, before | libc::O_NONBLOCK);
    }
}
