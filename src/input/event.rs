use evdevil::event::{EventType, InputEvent};

pub const INPUT_EVENT_SIZE_32: usize = 16;
pub const INPUT_EVENT_SIZE_64: usize = 24;

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const SYN_REPORT: u16 = 0;

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;

pub const BTN_TOUCH: u16 = 0x14a;

/// Memory layout of `struct input_event`, which depends on the width of `timeval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 32-bit `timeval` (16 bytes per event).
    Compact,
    /// 64-bit `timeval` (24 bytes per event).
    Wide,
}

impl Layout {
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            Layout::Wide
        } else {
            Layout::Compact
        }
    }

    pub const fn size(self) -> usize {
        match self {
            Layout::Compact => INPUT_EVENT_SIZE_32,
            Layout::Wide => INPUT_EVENT_SIZE_64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// The (type, code) pairs the engine cares about, resolved once at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `SYN_REPORT`: everything since the previous marker is one sample.
    Report,
    Slot(i32),
    TrackingId(i32),
    /// `ABS_X`/`ABS_Y` (`multitouch == false`) or `ABS_MT_POSITION_*`.
    Position {
        axis: Axis,
        multitouch: bool,
        value: i32,
    },
    Key {
        code: u16,
        value: i32,
    },
    Relative {
        axis: Axis,
        value: i32,
    },
    Other {
        ty: u16,
        code: u16,
        value: i32,
    },
}

impl Event {
    pub fn from_raw(ty: u16, code: u16, value: i32) -> Self {
        match (ty, code) {
            (EV_SYN, SYN_REPORT) => Event::Report,
            (EV_ABS, ABS_MT_SLOT) => Event::Slot(value),
            (EV_ABS, ABS_MT_TRACKING_ID) => Event::TrackingId(value),
            (EV_ABS, ABS_X) => Event::position(Axis::X, false, value),
            (EV_ABS, ABS_Y) => Event::position(Axis::Y, false, value),
            (EV_ABS, ABS_MT_POSITION_X) => Event::position(Axis::X, true, value),
            (EV_ABS, ABS_MT_POSITION_Y) => Event::position(Axis::Y, true, value),
            (EV_KEY, code) => Event::Key { code, value },
            (EV_REL, REL_X) => Event::Relative { axis: Axis::X, value },
            (EV_REL, REL_Y) => Event::Relative { axis: Axis::Y, value },
            (ty, code) => Event::Other { ty, code, value },
        }
    }

    fn position(axis: Axis, multitouch: bool, value: i32) -> Self {
        Event::Position {
            axis,
            multitouch,
            value,
        }
    }

    pub fn key(code: u16, pressed: bool) -> Self {
        Event::Key {
            code,
            value: i32::from(pressed),
        }
    }

    pub fn raw(&self) -> (u16, u16, i32) {
        match *self {
            Event::Report => (EV_SYN, SYN_REPORT, 0),
            Event::Slot(value) => (EV_ABS, ABS_MT_SLOT, value),
            Event::TrackingId(value) => (EV_ABS, ABS_MT_TRACKING_ID, value),
            Event::Position {
                axis,
                multitouch,
                value,
            } => {
                let code = match (axis, multitouch) {
                    (Axis::X, false) => ABS_X,
                    (Axis::Y, false) => ABS_Y,
                    (Axis::X, true) => ABS_MT_POSITION_X,
                    (Axis::Y, true) => ABS_MT_POSITION_Y,
                };
                (EV_ABS, code, value)
            }
            Event::Key { code, value } => (EV_KEY, code, value),
            Event::Relative { axis, value } => {
                let code = match axis {
                    Axis::X => REL_X,
                    Axis::Y => REL_Y,
                };
                (EV_REL, code, value)
            }
            Event::Other { ty, code, value } => (ty, code, value),
        }
    }

    pub fn to_input_event(&self) -> InputEvent {
        let (ty, code, value) = self.raw();
        InputEvent::new(EventType::from_raw(ty), code, value)
    }
}

/// One decoded `input_event` with its kernel timestamp in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub time_us: i64,
    pub event: Event,
}

impl EventRecord {
    pub fn new(time_us: i64, event: Event) -> Self {
        Self { time_us, event }
    }
}

/// Parse a Linux input_event from raw bytes in the given layout.
/// Returns None if the buffer is too short.
pub fn parse_input_event(buf: &[u8], layout: Layout) -> Option<EventRecord> {
    if buf.len() < layout.size() {
        return None;
    }

    let (sec, usec, rest) = match layout {
        Layout::Compact => (
            i64::from(i32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]])),
            i64::from(i32::from_ne_bytes([buf[4], buf[5], buf[6], buf[7]])),
            &buf[8..16],
        ),
        Layout::Wide => (
            i64::from_ne_bytes(buf[0..8].try_into().ok()?),
            i64::from_ne_bytes(buf[8..16].try_into().ok()?),
            &buf[16..24],
        ),
    };

    let ty = u16::from_ne_bytes([rest[0], rest[1]]);
    let code = u16::from_ne_bytes([rest[2], rest[3]]);
    let value = i32::from_ne_bytes([rest[4], rest[5], rest[6], rest[7]]);

    Some(EventRecord::new(
        sec.saturating_mul(1_000_000).saturating_add(usec),
        Event::from_raw(ty, code, value),
    ))
}

/// Serialize a record back into `struct input_event` bytes.
#[cfg(test)]
pub fn encode_input_event(record: &EventRecord, layout: Layout) -> Vec<u8> {
    let sec = record.time_us.div_euclid(1_000_000);
    let usec = record.time_us.rem_euclid(1_000_000);
    let (ty, code, value) = record.event.raw();

    let mut out = Vec::with_capacity(layout.size());
    match layout {
        Layout::Compact => {
            out.extend_from_slice(&(sec as i32).to_ne_bytes());
            out.extend_from_slice(&(usec as i32).to_ne_bytes());
        }
        Layout::Wide => {
            out.extend_from_slice(&sec.to_ne_bytes());
            out.extend_from_slice(&usec.to_ne_bytes());
        }
    }
    out.extend_from_slice(&ty.to_ne_bytes());
    out.extend_from_slice(&code.to_ne_bytes());
    out.extend_from_slice(&value.to_ne_bytes());
    out
}
