//! Report-boundary gesture classification: finger counts, taps and drags.

use evdevil::event::Key;

use crate::input::{Axis, Event, SlotTracker};
use crate::region::Rectangle;

/// Longest contact that still counts as a tap.
pub const TAP_THRESHOLD_US: i64 = 100_000;

fn tool_key(finger_count: usize) -> Option<Key> {
    match finger_count {
        1 => Some(Key::BTN_TOOL_FINGER),
        2 => Some(Key::BTN_TOOL_DOUBLETAP),
        3 => Some(Key::BTN_TOOL_TRIPLETAP),
        4 => Some(Key::BTN_TOOL_QUADTAP),
        5 => Some(Key::BTN_TOOL_QUINTTAP),
        _ => None,
    }
}

/// Tool-key events for a finger-count change: release the old count's key,
/// then press the new one. Empty when the count is unchanged.
pub fn finger_transition(old: usize, new: usize) -> Vec<Event> {
    if old == new {
        return Vec::new();
    }

    let mut events = Vec::with_capacity(2);
    if let Some(key) = tool_key(old) {
        log::debug!("Fingers {}: released", old);
        events.push(Event::key(key.raw(), false));
    }
    if let Some(key) = tool_key(new) {
        log::debug!("Fingers {}: pressed", new);
        events.push(Event::key(key.raw(), true));
    }
    events
}

/// Pointer movement and tap state derived from one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Motion {
    pub dx: i32,
    pub dy: i32,
    pub click: bool,
}

/// Classify the current report for relative output and advance every slot's
/// previous-report snapshot.
///
/// A contact latches whether it started inside `rect` on touch-down; contacts
/// that started outside never contribute movement. Deltas of all qualifying
/// contacts are summed, so a two-finger drag moves twice as far.
pub fn classify_relative(tracker: &mut SlotTracker, rect: &Rectangle) -> Motion {
    let mut motion = Motion::default();

    for (index, slot) in tracker.slots_mut().iter_mut().enumerate() {
        if slot.touched_down() {
            slot.started_in_bounds = rect.contains(slot.x, slot.y);
            log::trace!(
                "Slot {} down at ({}, {}), in bounds: {}",
                index,
                slot.x,
                slot.y,
                slot.started_in_bounds
            );
        }

        if slot.lifted() {
            if let Some(elapsed) = slot.contact_duration_us() {
                if elapsed <= TAP_THRESHOLD_US {
                    log::debug!("Slot {} tap ({}us)", index, elapsed);
                    motion.click = true;
                }
            }
        }

        if slot.held() && slot.started_in_bounds {
            motion.dx = motion.dx.saturating_add(slot.x - slot.prev_x);
            motion.dy = motion.dy.saturating_add(slot.y - slot.prev_y);
        }
    }

    tracker.commit();
    motion
}

/// Relative motion events for `motion` scaled by `scale`.
///
/// An axis is only emitted when its scaled delta rounds to a non-zero value.
pub fn scaled_motion(motion: &Motion, scale: f64) -> Vec<Event> {
    [(Axis::X, motion.dx), (Axis::Y, motion.dy)]
        .into_iter()
        .filter_map(|(axis, delta)| {
            let value = (f64::from(delta) * scale).round() as i32;
            (value != 0).then_some(Event::Relative { axis, value })
        })
        .collect()
}
