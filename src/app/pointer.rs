use super::event::AppEvent;

/// Pairs a pointer press on the record control with its release.
///
/// Every press is matched by exactly one release, whatever the pointer did in
/// between, and the release carries the click a pointer release produces.
#[derive(Debug, Default)]
pub struct PointerHold {
    pressed: bool,
}

impl PointerHold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn press(&mut self) -> Vec<AppEvent> {
        if self.pressed {
            return Vec::new();
        }
        self.pressed = true;
        vec![AppEvent::PointerDown]
    }

    pub fn release(&mut self) -> Vec<AppEvent> {
        if !self.pressed {
            return Vec::new();
        }
        self.pressed = false;
        vec![AppEvent::PointerUp, AppEvent::Click]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Controller, Phase};
    use crate::config::Config;
    use crate::random::SeededRandom;
    use crate::scheduler::ManualScheduler;
    use crate::speech::MemorySpeech;
    use std::time::Duration;

    #[test]
    fn release_follows_press() {
        let mut hold = PointerHold::new();
        assert_eq!(hold.press(), vec![AppEvent::PointerDown]);
        assert!(hold.is_pressed());
        assert_eq!(hold.release(), vec![AppEvent::PointerUp, AppEvent::Click]);
        assert!(!hold.is_pressed());
    }

    #[test]
    fn unpaired_signals_post_nothing() {
        let mut hold = PointerHold::new();
        assert!(hold.release().is_empty());
        hold.press();
        assert!(hold.press().is_empty());
        hold.release();
        assert!(hold.release().is_empty());
    }

    #[test]
    fn long_hold_ends_on_release() {
        let sched = ManualScheduler::new();
        let mut ctl = Controller::new(
            &Config::default(),
            Box::new(sched.clone()),
            Box::new(SeededRandom::new(11)),
            Box::new(MemorySpeech::new(false)),
        );
        let mut hold = PointerHold::new();

        for event in hold.press() {
            ctl.handle_event(event);
        }
        sched.advance(Duration::from_millis(900), |fired| {
            ctl.handle_event(AppEvent::Timer(fired));
        });
        for event in hold.release() {
            ctl.handle_event(event);
        }

        assert_eq!(ctl.phase(), Phase::Analyzing);
        assert!(!ctl.state().hold_active());
    }
}
