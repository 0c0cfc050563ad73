//! Global keyboard and mouse hook feeding a [`SignalBus`].

use crate::libs::events::{ActivitySignal, SignalBus};
use crate::libs::messages::Message;
use crate::msg_error;
use rdev::{listen, Event, EventType};
use std::time::Duration;

pub struct InputListener;

impl InputListener {
    /// Spawns a detached thread that forwards OS input events to `bus`.
    ///
    /// `rdev::listen` blocks for the life of the process; if it fails the
    /// listener retries every second.
    pub fn spawn(bus: SignalBus) {
        std::thread::spawn(move || loop {
            let sink = bus.clone();
            if let Err(e) = listen(move |event: Event| {
                if let Some(signal) = Self::translate(&event.event_type) {
                    sink.emit(signal);
                }
            }) {
                msg_error!(Message::ErrorInRdevListener(format!("{:?}", e)));
                std::thread::sleep(Duration::from_secs(1));
            } else {
                break;
            }
        });
    }

    pub fn translate(event_type: &EventType) -> Option<ActivitySignal> {
        match event_type {
            EventType::KeyPress(_) => Some(ActivitySignal::KeyPress),
            EventType::ButtonPress(_) => Some(ActivitySignal::PointerDown),
            EventType::MouseMove { .. } => Some(ActivitySignal::PointerMove),
            EventType::Wheel { .. } => Some(ActivitySignal::Scroll),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::{Button, Key};

    #[test]
    fn translates_input_events() {
        assert_eq!(InputListener::translate(&EventType::KeyPress(Key::KeyA)), Some(ActivitySignal::KeyPress));
        assert_eq!(InputListener::translate(&EventType::ButtonPress(Button::Left)), Some(ActivitySignal::PointerDown));
        assert_eq!(InputListener::translate(&EventType::Wheel { delta_x: 0, delta_y: -1 }), Some(ActivitySignal::Scroll));
        assert_eq!(InputListener::translate(&EventType::KeyRelease(Key::KeyA)), None);
    }
}
