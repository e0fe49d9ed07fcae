//! Touchscreen source and uinput sinks.

mod sink;
mod source;

pub use sink::{create_pointer, create_side_keyboard, create_trackpad, UinputSink, SETTLE_DELAY};
pub use source::TouchSource;
