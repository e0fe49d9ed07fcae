//! Side-touch detection: a contact level with the trackpad but beside it
//! holds down an auxiliary key.

use crate::input::{Axis, Event};
use crate::region::Rectangle;

#[derive(Debug, Clone)]
pub struct EdgeZone {
    keycode: u16,
    active: bool,
    last_x: Option<i32>,
    last_y: Option<i32>,
}

impl EdgeZone {
    pub fn new(keycode: u16) -> Self {
        Self {
            keycode,
            active: false,
            last_x: None,
            last_y: None,
        }
    }

    /// Re-evaluate side-touch state from one report's events.
    /// Returns the new state when it changed.
    pub fn update(&mut self, report: &[Event], finger_count: usize, rect: &Rectangle) -> Option<bool> {
        if let Some(x) = latest_position(report, Axis::X) {
            self.last_x = Some(x);
        }
        if let Some(y) = latest_position(report, Axis::Y) {
            self.last_y = Some(y);
        }

        let side = if finger_count == 0 {
            false
        } else {
            let (x, y) = self.last_x.zip(self.last_y)?;
            rect.y.contains(y) && !rect.x.contains(x)
        };

        if side == self.active {
            return None;
        }
        self.active = side;
        Some(side)
    }

    /// The auxiliary key event for `pressed`, as a complete report.
    pub fn key_report(&self, pressed: bool) -> [Event; 2] {
        [Event::key(self.keycode, pressed), Event::Report]
    }
}

/// Most recent position on `axis` in the report, preferring multi-touch codes.
fn latest_position(report: &[Event], axis: Axis) -> Option<i32> {
    let latest = |want_mt: bool| {
        report.iter().rev().find_map(|event| match *event {
            Event::Position {
                axis: a,
                multitouch,
                value,
            } if a == axis && multitouch == want_mt => Some(value),
            _ => None,
        })
    };
    latest(true).or_else(|| latest(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Span;

    const KEY_F13: u16 = 183;

    fn rect() -> Rectangle {
        Rectangle {
            x: Span { min: 330, max: 660 },
            y: Span { min: 670, max: 1000 },
        }
    }

    fn pos(axis: Axis, multitouch: bool, value: i32) -> Event {
        Event::Position {
            axis,
            multitouch,
            value,
        }
    }

    #[test]
    fn test_side_touch_detected() {
        let mut zone = EdgeZone::new(KEY_F13);
        let report = [pos(Axis::X, true, 100), pos(Axis::Y, true, 800)];
        assert_eq!(zone.update(&report, 1, &rect()), Some(true));
        assert!(zone.active);

        // Unchanged state emits nothing.
        assert_eq!(zone.update(&report, 1, &rect()), None);

        let inside = [pos(Axis::X, true, 400)];
        assert_eq!(zone.update(&inside, 1, &rect()), Some(false));
    }

    #[test]
    fn test_above_trackpad_is_not_side() {
        let mut zone = EdgeZone::new(KEY_F13);
        let report = [pos(Axis::X, true, 100), pos(Axis::Y, true, 100)];
        assert_eq!(zone.update(&report, 1, &rect()), None);
        assert!(!zone.active);
    }

    #[test]
    fn test_lifting_all_fingers_forces_release() {
        let mut zone = EdgeZone::new(KEY_F13);
        zone.update(&[pos(Axis::X, true, 900), pos(Axis::Y, true, 900)], 1, &rect());
        assert!(zone.active);
        assert_eq!(zone.update(&[], 0, &rect()), Some(false));
    }

    #[test]
    fn test_needs_both_axes() {
        let mut zone = EdgeZone::new(KEY_F13);
        assert_eq!(zone.update(&[pos(Axis::X, true, 100)], 1, &rect()), None);
        // Y arrives in a later report; X is carried over.
        assert_eq!(zone.update(&[pos(Axis::Y, true, 800)], 1, &rect()), Some(true));
    }

    #[test]
    fn test_multitouch_code_preferred() {
        let report = [
            pos(Axis::X, true, 100),
            pos(Axis::X, false, 400),
            pos(Axis::Y, false, 800),
        ];
        assert_eq!(latest_position(&report, Axis::X), Some(100));
        assert_eq!(latest_position(&report, Axis::Y), Some(800));
    }

    #[test]
    fn test_key_report() {
        let zone = EdgeZone::new(KEY_F13);
        assert_eq!(
            zone.key_report(true),
            [Event::Key { code: KEY_F13, value: 1 }, Event::Report]
        );
    }
}
