use crate::config::{Config, Timings};
use crate::random::RandomSource;
use crate::scheduler::{Scheduler, TimerFired, TimerId, TimerKind};
use crate::speech::{SpeechSink, Utterance, SPEECH_PITCH, SPEECH_RATE};

use super::event::AppEvent;
use super::state::{Effect, Input, Phase, SessionState};

/// Live timer handles. Each slot is only filled while its phase lasts.
#[derive(Debug, Default)]
struct Timers {
    ticker: Option<TimerId>,
    rotator: Option<TimerId>,
    completion: Option<TimerId>,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::RecordingTick => &mut self.ticker,
            TimerKind::StatusRotate => &mut self.rotator,
            TimerKind::AnalysisDone => &mut self.completion,
        }
    }
}

/// Owns the session state and every timer it depends on.
pub struct Controller {
    state: SessionState,
    timings: Timings,
    scheduler: Box<dyn Scheduler>,
    rng: Box<dyn RandomSource>,
    speech: Box<dyn SpeechSink>,
    timers: Timers,
    torn_down: bool,
}

impl Controller {
    pub fn new(
        config: &Config,
        scheduler: Box<dyn Scheduler>,
        rng: Box<dyn RandomSource>,
        speech: Box<dyn SpeechSink>,
    ) -> Self {
        Self {
            state: SessionState::new(),
            timings: config.timings.clone(),
            scheduler,
            rng,
            speech,
            timers: Timers::default(),
            torn_down: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Handle an event. Returns true when the visible state changed.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        if self.torn_down {
            log::debug!("Ignoring {event:?} after teardown");
            return false;
        }

        let input = match event {
            AppEvent::PointerDown => Input::Press,
            AppEvent::PointerUp => Input::Release,
            AppEvent::Click => Input::Click,
            AppEvent::StopClicked => Input::StopClicked,
            AppEvent::SpeakClicked => Input::Speak,
            AppEvent::GenerateNew => Input::Regenerate,
            AppEvent::Timer(fired) => match self.accept_timer(fired) {
                Some(input) => input,
                None => return false,
            },
            AppEvent::Shutdown => {
                self.teardown();
                return false;
            }
        };

        let before = self.state.clone();
        let effects = self.state.transition(input, &self.timings, self.rng.as_mut());
        for effect in effects {
            self.apply(effect);
        }

        let (from, to) = (before.phase(), self.state.phase());
        if from != to {
            log::info!("{from:?} -> {to:?}");
        }
        if to == Phase::Result && before.translation() != self.state.translation() {
            log::info!(
                "Translation: {:?} ({})",
                self.state.translation().unwrap_or_default(),
                self.state.personality().unwrap_or_default()
            );
        }
        before != self.state
    }

    /// Cancel every live timer. Later events are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        for kind in [
            TimerKind::RecordingTick,
            TimerKind::StatusRotate,
            TimerKind::AnalysisDone,
        ] {
            self.cancel(kind);
        }
        self.torn_down = true;
        log::debug!("Controller torn down");
    }

    /// Map a timer firing to an input, dropping firings from cancelled timers.
    fn accept_timer(&mut self, fired: TimerFired) -> Option<Input> {
        let slot = self.timers.slot(fired.kind);
        if *slot != Some(fired.id) {
            log::debug!("Dropping stale timer {fired:?}");
            return None;
        }
        Some(match fired.kind {
            TimerKind::RecordingTick => Input::Tick,
            TimerKind::StatusRotate => Input::RotateStatus,
            TimerKind::AnalysisDone => {
                // One-shot: release the handle before acting on it.
                slot.take();
                self.scheduler.cancel(fired.id);
                Input::AnalysisDone
            }
        })
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::StartTicker => {
                self.cancel(TimerKind::RecordingTick);
                let id = self
                    .scheduler
                    .schedule_repeating(TimerKind::RecordingTick, self.timings.tick());
                self.timers.ticker = Some(id);
            }
            Effect::StopTicker => self.cancel(TimerKind::RecordingTick),
            Effect::BeginAnalysis => {
                self.cancel(TimerKind::AnalysisDone);
                self.cancel(TimerKind::StatusRotate);
                let done = self
                    .scheduler
                    .schedule_once(TimerKind::AnalysisDone, self.timings.analysis_delay());
                let rotate = self
                    .scheduler
                    .schedule_repeating(TimerKind::StatusRotate, self.timings.status_rotate());
                self.timers.completion = Some(done);
                self.timers.rotator = Some(rotate);
            }
            Effect::EndAnalysis => self.cancel(TimerKind::StatusRotate),
            Effect::Speak(text) => self.speak(text),
        }
    }

    fn speak(&mut self, text: &str) {
        if !self.speech.is_available() {
            log::debug!("Speech unavailable, skipping");
            return;
        }
        let utterance = Utterance {
            text: text.to_string(),
            rate: SPEECH_RATE,
            pitch: SPEECH_PITCH,
        };
        if let Err(e) = self.speech.speak(utterance) {
            log::debug!("Speech failed: {e}");
        }
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(id) = self.timers.slot(kind).take() {
            self.scheduler.cancel(id);
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PERSONALITIES, PHRASES, STATUS_MESSAGES};
    use crate::random::ScriptedRandom;
    use crate::scheduler::ManualScheduler;
    use crate::speech::{MemorySpeech, SPEECH_PITCH, SPEECH_RATE};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller(script: Vec<usize>, speech: MemorySpeech) -> (Controller, ManualScheduler) {
        let sched = ManualScheduler::new();
        let ctl = Controller::new(
            &Config::default(),
            Box::new(sched.clone()),
            Box::new(ScriptedRandom::new(script)),
            Box::new(speech),
        );
        (ctl, sched)
    }

    fn run(ctl: &mut Controller, sched: &ManualScheduler, by: Duration) {
        sched.advance(by, |fired| {
            ctl.handle_event(AppEvent::Timer(fired));
        });
    }

    #[test]
    fn ticker_only_lives_while_recording() {
        let (mut ctl, sched) = controller(vec![0], MemorySpeech::new(true));
        ctl.handle_event(AppEvent::Click);
        assert!(sched.has_live(TimerKind::RecordingTick));
        run(&mut ctl, &sched, ms(700));
        assert_eq!(ctl.state().elapsed(), ms(700));
        ctl.handle_event(AppEvent::Click);
        assert!(!sched.has_live(TimerKind::RecordingTick));
        assert!(sched.has_live(TimerKind::StatusRotate));
        assert!(sched.has_live(TimerKind::AnalysisDone));
    }

    #[test]
    fn analysis_rotates_then_reveals() {
        // rotator picks twice (800ms, 1600ms), then phrase and personality
        let (mut ctl, sched) = controller(vec![1, 2, 7, 3], MemorySpeech::new(true));
        ctl.handle_event(AppEvent::Click);
        run(&mut ctl, &sched, ms(500));
        ctl.handle_event(AppEvent::Click);
        assert_eq!(ctl.phase(), Phase::Analyzing);

        run(&mut ctl, &sched, ms(800));
        assert_eq!(ctl.state().status_message(), STATUS_MESSAGES[1]);
        run(&mut ctl, &sched, ms(800));
        assert_eq!(ctl.state().status_message(), STATUS_MESSAGES[2]);
        run(&mut ctl, &sched, ms(400));

        assert_eq!(ctl.phase(), Phase::Result);
        assert_eq!(ctl.state().translation(), Some(PHRASES[7]));
        assert_eq!(ctl.state().personality(), Some(PERSONALITIES[3]));
        assert_eq!(sched.live_timers(), 0);
    }

    #[test]
    fn stale_timer_event_is_dropped() {
        let (mut ctl, sched) = controller(vec![0], MemorySpeech::new(true));
        ctl.handle_event(AppEvent::Click);
        run(&mut ctl, &sched, ms(600));
        ctl.handle_event(AppEvent::Click);
        // a tick that was already queued when the ticker was cancelled
        let stale = TimerFired {
            id: TimerId(1),
            kind: TimerKind::RecordingTick,
        };
        assert!(!ctl.handle_event(AppEvent::Timer(stale)));
        let forged = TimerFired {
            id: TimerId(999),
            kind: TimerKind::AnalysisDone,
        };
        assert!(!ctl.handle_event(AppEvent::Timer(forged)));
        assert_eq!(ctl.phase(), Phase::Analyzing);
    }

    #[test]
    fn speak_hands_off_with_delivery_params() {
        let speech = MemorySpeech::new(true);
        let (mut ctl, sched) = controller(vec![0, 0, 0, 4, 5], speech.clone());
        ctl.handle_event(AppEvent::SpeakClicked);
        assert!(speech.spoken().is_empty());

        ctl.handle_event(AppEvent::Click);
        run(&mut ctl, &sched, ms(1000));
        ctl.handle_event(AppEvent::Click);
        run(&mut ctl, &sched, ms(2000));
        ctl.handle_event(AppEvent::SpeakClicked);

        let spoken = speech.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].text, ctl.state().translation().unwrap());
        assert_eq!(spoken[0].rate, SPEECH_RATE);
        assert_eq!(spoken[0].pitch, SPEECH_PITCH);
    }

    #[test]
    fn unavailable_speech_is_skipped() {
        let speech = MemorySpeech::new(false);
        let (mut ctl, sched) = controller(vec![0], speech.clone());
        ctl.handle_event(AppEvent::Click);
        run(&mut ctl, &sched, ms(500));
        ctl.handle_event(AppEvent::Click);
        run(&mut ctl, &sched, ms(2000));
        assert_eq!(ctl.phase(), Phase::Result);
        ctl.handle_event(AppEvent::SpeakClicked);
        assert!(speech.spoken().is_empty());
    }

    #[test]
    fn shutdown_releases_every_timer() {
        let (mut ctl, sched) = controller(vec![0], MemorySpeech::new(true));
        ctl.handle_event(AppEvent::Click);
        run(&mut ctl, &sched, ms(500));
        ctl.handle_event(AppEvent::Click);
        assert_eq!(sched.live_timers(), 2);
        ctl.handle_event(AppEvent::Shutdown);
        assert_eq!(sched.live_timers(), 0);
        assert!(!ctl.handle_event(AppEvent::Click));
        assert_eq!(ctl.phase(), Phase::Analyzing);
    }

    #[test]
    fn drop_releases_timers() {
        let (mut ctl, sched) = controller(vec![0], MemorySpeech::new(true));
        ctl.handle_event(AppEvent::PointerDown);
        assert_eq!(sched.live_timers(), 1);
        drop(ctl);
        assert_eq!(sched.live_timers(), 0);
    }
}
