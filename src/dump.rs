//! Dump decoded touchscreen events for debugging.
//! Run: trackscreen dump /dev/input/eventN  (or -n "Device Name").

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::input::{parse_input_event, Axis, Event, Layout, BTN_TOUCH, EV_ABS};

fn event_name(event: &Event) -> String {
    match *event {
        Event::Report => "SYN_REPORT".into(),
        Event::Slot(_) => "ABS_MT_SLOT".into(),
        Event::TrackingId(_) => "ABS_MT_TRACKING_ID".into(),
        Event::Position {
            axis, multitouch, ..
        } => {
            let axis = match axis {
                Axis::X => "X",
                Axis::Y => "Y",
            };
            if multitouch {
                format!("ABS_MT_POSITION_{}", axis)
            } else {
                format!("ABS_{}", axis)
            }
        }
        Event::Key {
            code: BTN_TOUCH, ..
        } => "BTN_TOUCH".into(),
        Event::Key { code, .. } => format!("KEY/{}", code),
        Event::Relative { axis, .. } => format!("REL_{:?}", axis),
        Event::Other {
            ty: EV_ABS, code, ..
        } => {
            let abs = match code {
                0x18 => "PRESSURE",
                0x30 => "MT_TOUCH_MAJOR",
                0x31 => "MT_TOUCH_MINOR",
                0x34 => "MT_ORIENTATION",
                0x37 => "MT_TOOL_TYPE",
                0x3a => "MT_PRESSURE",
                _ => "?",
            };
            format!("ABS_{}({})", abs, code)
        }
        Event::Other { ty, code, .. } => format!("type{} code{}", ty, code),
    }
}

/// Print every event from `source` until it ends.
pub fn run_dump<R: Read, W: Write>(source: &mut R, layout: Layout, out: &mut W) -> Result<()> {
    let mut buf = vec![0u8; layout.size()];
    let mut n = 0u64;
    loop {
        source.read_exact(&mut buf).map_err(Error::SourceRead)?;
        let Some(record) = parse_input_event(&buf, layout) else {
            continue;
        };

        n += 1;
        let (_, _, value) = record.event.raw();
        let line = writeln!(
            out,
            "{:6}  {}.{:06}  {}  value={}",
            n,
            record.time_us.div_euclid(1_000_000),
            record.time_us.rem_euclid(1_000_000),
            event_name(&record.event),
            value
        );
        // stdout closed (e.g. piped into `head`): stop quietly.
        if line.is_err() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{encode_input_event, EventRecord};

    #[test]
    fn test_event_names() {
        assert_eq!(event_name(&Event::Report), "SYN_REPORT");
        assert_eq!(
            event_name(&Event::Position {
                axis: Axis::Y,
                multitouch: true,
                value: 0
            }),
            "ABS_MT_POSITION_Y"
        );
        assert_eq!(
            event_name(&Event::Other {
                ty: 3,
                code: 0x3a,
                value: 0
            }),
            "ABS_MT_PRESSURE(58)"
        );
        assert_eq!(event_name(&Event::key(BTN_TOUCH, true)), "BTN_TOUCH");
        assert_eq!(event_name(&Event::key(272, true)), "KEY/272");
        assert_eq!(
            event_name(&Event::Other {
                ty: 4,
                code: 5,
                value: 0
            }),
            "type4 code5"
        );
    }

    #[test]
    fn test_dump_prints_until_end() {
        let layout = Layout::Wide;
        let mut bytes = encode_input_event(&EventRecord::new(2_000_042, Event::Slot(1)), layout);
        bytes.extend(encode_input_event(&EventRecord::new(2_000_050, Event::Report), layout));

        let mut out = Vec::new();
        let result = run_dump(&mut bytes.as_slice(), layout, &mut out);
        assert!(matches!(result, Err(Error::SourceRead(_))));

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "     1  2.000042  ABS_MT_SLOT  value=1");
        assert_eq!(lines[1], "     2  2.000050  SYN_REPORT  value=0");
    }
}
