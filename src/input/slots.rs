use super::event::{Axis, Event, EventRecord, BTN_TOUCH};

pub const MAX_SLOTS: usize = 10;

/// How the source reports contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerModel {
    /// Slotted multi-touch (protocol B): `ABS_MT_SLOT` selects the slot.
    MultiTouch,
    /// Single contact: device-level and MT position codes both address slot 0.
    Single,
}

/// One hardware contact slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot {
    pub tracking_id: Option<i32>,
    pub x: i32,
    pub y: i32,
    pub prev_x: i32,
    pub prev_y: i32,
    pub prev_on: bool,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub started_in_bounds: bool,
}

impl Slot {
    pub fn is_on(&self) -> bool {
        self.tracking_id.is_some()
    }

    /// Contact began during the current report.
    pub fn touched_down(&self) -> bool {
        self.is_on() && !self.prev_on
    }

    /// Contact ended during the current report.
    pub fn lifted(&self) -> bool {
        !self.is_on() && self.prev_on
    }

    /// On both in this report and the previous one.
    pub fn held(&self) -> bool {
        self.is_on() && self.prev_on
    }

    pub fn contact_duration_us(&self) -> Option<i64> {
        self.start_time
            .zip(self.end_time)
            .map(|(start, end)| end - start)
    }

    fn set_tracking_id(&mut self, value: i32, time_us: i64) {
        let was_on = self.is_on();
        if value > 0 {
            if !was_on {
                self.start_time = Some(time_us);
                self.end_time = None;
            }
            self.tracking_id = Some(value);
        } else {
            if was_on {
                self.end_time = Some(time_us);
            }
            self.tracking_id = None;
        }
    }

    fn set_position(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    fn commit(&mut self) {
        self.prev_x = self.x;
        self.prev_y = self.y;
        self.prev_on = self.is_on();
    }
}

/// Per-slot contact state, updated event by event between report markers.
#[derive(Debug, Clone)]
pub struct SlotTracker {
    slots: [Slot; MAX_SLOTS],
    current: Option<usize>,
    model: PointerModel,
}

impl SlotTracker {
    pub fn new(model: PointerModel) -> Self {
        Self {
            slots: [Slot::default(); MAX_SLOTS],
            current: Some(0),
            model,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_on()).count()
    }

    /// Apply one source event. Report markers are ignored here.
    pub fn apply(&mut self, record: &EventRecord) {
        match (self.model, record.event) {
            (PointerModel::MultiTouch, Event::Slot(value)) => {
                self.current = usize::try_from(value).ok().filter(|&s| s < MAX_SLOTS);
                if self.current.is_none() {
                    log::trace!("Slot {} out of range, dropping its events", value);
                }
            }
            (_, Event::TrackingId(value)) => {
                if let Some(slot) = self.current_slot_mut() {
                    slot.set_tracking_id(value, record.time_us);
                }
            }
            (PointerModel::MultiTouch, Event::Position { axis, multitouch: true, value })
            | (PointerModel::Single, Event::Position { axis, value, .. }) => {
                if let Some(slot) = self.current_slot_mut() {
                    slot.set_position(axis, value);
                }
            }
            (PointerModel::Single, Event::Key { code: BTN_TOUCH, value }) => {
                let slot = &mut self.slots[0];
                match (value != 0, slot.is_on()) {
                    (true, false) => slot.set_tracking_id(1, record.time_us),
                    (false, true) => slot.set_tracking_id(-1, record.time_us),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    /// Snapshot current positions and contact state as the "previous report".
    pub fn commit(&mut self) {
        for slot in &mut self.slots {
            slot.commit();
        }
    }

    fn current_slot_mut(&mut self) -> Option<&mut Slot> {
        let index = match self.model {
            PointerModel::MultiTouch => self.current?,
            PointerModel::Single => 0,
        };
        self.slots.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(time_us: i64, event: Event) -> EventRecord {
        EventRecord::new(time_us, event)
    }

    fn mt(axis: Axis, value: i32) -> Event {
        Event::Position {
            axis,
            multitouch: true,
            value,
        }
    }

    #[test]
    fn test_tracking_id_lifecycle() {
        let mut tracker = SlotTracker::new(PointerModel::MultiTouch);
        tracker.apply(&rec(1_000, Event::Slot(2)));
        tracker.apply(&rec(1_000, Event::TrackingId(17)));
        tracker.apply(&rec(1_000, mt(Axis::X, 400)));
        tracker.apply(&rec(1_000, mt(Axis::Y, 700)));

        let slot = tracker.slots()[2];
        assert!(slot.is_on());
        assert!(slot.touched_down());
        assert_eq!((slot.x, slot.y), (400, 700));
        assert_eq!(slot.start_time, Some(1_000));
        assert_eq!(tracker.active_count(), 1);

        tracker.commit();
        tracker.apply(&rec(81_000, Event::TrackingId(-1)));
        let slot = tracker.slots()[2];
        assert!(slot.lifted());
        assert_eq!(slot.contact_duration_us(), Some(80_000));
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_nonpositive_tracking_id_is_absent() {
        let mut tracker = SlotTracker::new(PointerModel::MultiTouch);
        tracker.apply(&rec(5, Event::TrackingId(0)));
        assert!(!tracker.slots()[0].is_on());
        assert_eq!(tracker.slots()[0].end_time, None);
    }

    #[test]
    fn test_out_of_range_slot_dropped() {
        let mut tracker = SlotTracker::new(PointerModel::MultiTouch);
        tracker.apply(&rec(0, Event::Slot(MAX_SLOTS as i32)));
        tracker.apply(&rec(0, Event::TrackingId(3)));
        tracker.apply(&rec(0, mt(Axis::X, 123)));
        assert_eq!(tracker.active_count(), 0);
        assert!(tracker.slots().iter().all(|s| s.x == 0));

        tracker.apply(&rec(0, Event::Slot(-1)));
        tracker.apply(&rec(0, Event::TrackingId(3)));
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_multitouch_ignores_device_level_position() {
        let mut tracker = SlotTracker::new(PointerModel::MultiTouch);
        tracker.apply(&rec(
            0,
            Event::Position {
                axis: Axis::X,
                multitouch: false,
                value: 900,
            },
        ));
        assert_eq!(tracker.slots()[0].x, 0);
    }

    #[test]
    fn test_single_pointer_aliases() {
        let mut tracker = SlotTracker::new(PointerModel::Single);
        tracker.apply(&rec(0, Event::Slot(4)));
        tracker.apply(&rec(
            0,
            Event::Position {
                axis: Axis::X,
                multitouch: false,
                value: 11,
            },
        ));
        tracker.apply(&rec(0, mt(Axis::Y, 22)));
        assert_eq!((tracker.slots()[0].x, tracker.slots()[0].y), (11, 22));

        tracker.apply(&rec(10, Event::key(BTN_TOUCH, true)));
        assert!(tracker.slots()[0].is_on());
        tracker.apply(&rec(60, Event::key(BTN_TOUCH, false)));
        assert_eq!(tracker.slots()[0].contact_duration_us(), Some(50));
    }

    #[test]
    fn test_reassigned_tracking_id_keeps_start_time() {
        let mut tracker = SlotTracker::new(PointerModel::MultiTouch);
        tracker.apply(&rec(100, Event::TrackingId(1)));
        tracker.apply(&rec(200, Event::TrackingId(2)));
        assert_eq!(tracker.slots()[0].start_time, Some(100));
        assert_eq!(tracker.slots()[0].tracking_id, Some(2));
    }
}
