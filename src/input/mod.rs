mod event;
mod slots;

#[cfg(test)]
pub use event::encode_input_event;
pub use event::{parse_input_event, Axis, Event, EventRecord, Layout, BTN_TOUCH, EV_ABS};
pub use slots::{PointerModel, SlotTracker, MAX_SLOTS};
