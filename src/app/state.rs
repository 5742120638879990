use std::time::Duration;

use crate::catalog::{PERSONALITIES, PHRASES, STATUS_MESSAGES};
use crate::config::Timings;
use crate::random::{pick, RandomSource};

/// Where the session is in the record/analyze/reveal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recording,
    Analyzing,
    Result,
}

/// Inputs to the pure transition function. Timer inputs are only produced for live timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Press,
    Release,
    Click,
    StopClicked,
    Speak,
    Regenerate,
    Tick,
    RotateStatus,
    AnalysisDone,
}

/// Side effects requested by a transition, carried out by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTicker,
    StopTicker,
    /// Schedule the completion delay and the status rotator.
    BeginAnalysis,
    /// Cancel the status rotator.
    EndAnalysis,
    Speak(&'static str),
}

/// Session state for one mounted translator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    recording: bool,
    analyzing: bool,
    translation: Option<&'static str>,
    personality: Option<&'static str>,
    status_message: &'static str,
    elapsed: Duration,
    hold_active: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.recording {
            Phase::Recording
        } else if self.analyzing {
            Phase::Analyzing
        } else if self.translation.is_some() {
            Phase::Result
        } else {
            Phase::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn translation(&self) -> Option<&'static str> {
        self.translation
    }

    pub fn personality(&self) -> Option<&'static str> {
        self.personality
    }

    /// Empty until the first rotation of the first analysis.
    pub fn status_message(&self) -> &'static str {
        self.status_message
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn hold_active(&self) -> bool {
        self.hold_active
    }

    /// Caption under the record control.
    pub fn recording_caption(&self) -> String {
        if self.recording {
            format!("Recording... {:.1}s", self.elapsed_seconds())
        } else {
            "Click to start or hold to record".to_string()
        }
    }

    /// Apply one input. Returns the effects the controller must perform.
    pub fn transition(
        &mut self,
        input: Input,
        timings: &Timings,
        rng: &mut dyn RandomSource,
    ) -> Vec<Effect> {
        match input {
            Input::Press => {
                // The control is disabled while analyzing.
                if self.analyzing {
                    return Vec::new();
                }
                self.hold_active = true;
                if self.recording {
                    Vec::new()
                } else {
                    self.start_recording()
                }
            }
            Input::Release => {
                if self.hold_active && self.recording {
                    self.stop_recording(timings.min_recording())
                } else {
                    Vec::new()
                }
            }
            Input::Click => {
                // A hold session owns its own termination.
                if self.analyzing || self.hold_active {
                    Vec::new()
                } else if self.recording {
                    self.stop_recording(timings.min_recording())
                } else {
                    self.start_recording()
                }
            }
            Input::StopClicked => {
                if self.recording {
                    self.stop_recording(timings.min_recording())
                } else {
                    Vec::new()
                }
            }
            Input::Speak => match self.translation {
                Some(text) => vec![Effect::Speak(text)],
                None => Vec::new(),
            },
            Input::Regenerate => {
                if self.phase() == Phase::Result {
                    self.roll_result(rng);
                }
                Vec::new()
            }
            Input::Tick => {
                if self.recording {
                    self.elapsed += timings.tick();
                }
                Vec::new()
            }
            Input::RotateStatus => {
                if self.analyzing {
                    self.status_message = pick(rng, STATUS_MESSAGES);
                }
                Vec::new()
            }
            Input::AnalysisDone => {
                if !self.analyzing {
                    return Vec::new();
                }
                self.roll_result(rng);
                self.analyzing = false;
                vec![Effect::EndAnalysis]
            }
        }
    }

    fn start_recording(&mut self) -> Vec<Effect> {
        self.recording = true;
        self.translation = None;
        self.personality = None;
        self.elapsed = Duration::ZERO;
        vec![Effect::StartTicker]
    }

    fn stop_recording(&mut self, min_recording: Duration) -> Vec<Effect> {
        if self.elapsed < min_recording {
            log::debug!(
                "Ignoring stop after {:.1}s (minimum {:.1}s)",
                self.elapsed_seconds(),
                min_recording.as_secs_f64()
            );
            return Vec::new();
        }
        self.recording = false;
        self.elapsed = Duration::ZERO;
        self.hold_active = false;
        self.analyzing = true;
        vec![Effect::StopTicker, Effect::BeginAnalysis]
    }

    fn roll_result(&mut self, rng: &mut dyn RandomSource) {
        self.translation = Some(pick(rng, PHRASES));
        self.personality = Some(pick(rng, PERSONALITIES));
    }
}
