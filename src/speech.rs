use std::cell::RefCell;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;
use std::rc::Rc;

use crate::config::{SpeechConfig, SpeechEngine};

/// Speaking rate multiplier handed to every utterance.
pub const SPEECH_RATE: f32 = 0.8;
/// Pitch multiplier handed to every utterance.
pub const SPEECH_PITCH: f32 = 1.2;

pub type SpeechError = Box<dyn std::error::Error + Send + Sync>;

/// Text plus delivery parameters, as multipliers of the engine's normal voice.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

/// One-way text-to-speech hand-off. Nothing is reported back after `speak` returns.
pub trait SpeechSink {
    fn is_available(&self) -> bool;
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError>;
}

/// Sink for when speech is disabled or no engine was found.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeech;

impl SpeechSink for NoSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _utterance: Utterance) -> Result<(), SpeechError> {
        Err("speech output is disabled".into())
    }
}

/// Command-line synthesizers we know how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synth {
    SpdSay,
    Espeak,
}

impl Synth {
    fn program(self) -> &'static str {
        match self {
            Synth::SpdSay => "spd-say",
            Synth::Espeak => "espeak",
        }
    }

    /// Map rate/pitch multipliers onto the tool's own scale.
    pub fn args(self, utterance: &Utterance) -> Vec<String> {
        match self {
            // speech-dispatcher: -100..100, 0 is the default voice
            Synth::SpdSay => {
                let rate = ((utterance.rate - 1.0) * 100.0).round().clamp(-100.0, 100.0);
                let pitch = ((utterance.pitch - 1.0) * 100.0).round().clamp(-100.0, 100.0);
                vec![
                    "-r".into(),
                    format!("{rate}"),
                    "-p".into(),
                    format!("{pitch}"),
                    "--".into(),
                    utterance.text.clone(),
                ]
            }
            // espeak: 175 wpm and pitch 50 are the defaults
            Synth::Espeak => {
                let wpm = (175.0 * utterance.rate).round().clamp(80.0, 450.0);
                let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0);
                vec![
                    "-s".into(),
                    format!("{wpm}"),
                    "-p".into(),
                    format!("{pitch}"),
                    "--".into(),
                    utterance.text.clone(),
                ]
            }
        }
    }
}

/// Speaks through `spd-say` or `espeak`, spawned on the tokio runtime.
pub struct CommandSpeech {
    synth: Option<Synth>,
    handle: tokio::runtime::Handle,
}

impl CommandSpeech {
    /// Resolve the configured engine against what is installed.
    pub fn new(config: &SpeechConfig, handle: tokio::runtime::Handle) -> Self {
        let synth = match config.engine {
            SpeechEngine::Disabled => None,
            SpeechEngine::SpdSay => Some(Synth::SpdSay),
            SpeechEngine::Espeak => Some(Synth::Espeak),
            SpeechEngine::Auto => [Synth::SpdSay, Synth::Espeak]
                .into_iter()
                .find(|s| find_in_path(s.program()).is_some()),
        };
        match synth {
            Some(s) => log::info!("Speech output via {}", s.program()),
            None => log::info!("No speech engine available"),
        }
        Self { synth, handle }
    }

    pub fn synth(&self) -> Option<Synth> {
        self.synth
    }
}

impl SpeechSink for CommandSpeech {
    fn is_available(&self) -> bool {
        self.synth.is_some()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        let synth = self.synth.ok_or("no speech engine")?;
        let cmd = synth.program();

        let mut child = {
            let _guard = self.handle.enter();
            tokio::process::Command::new(cmd)
                .args(synth.args(&utterance))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| format!("Failed to spawn {cmd}: {e}"))?
        };

        // Reap the child without blocking the UI thread.
        self.handle.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    log::debug!("{cmd} exited with status {status}");
                }
                Ok(_) => {}
                Err(e) => log::debug!("Waiting on {cmd} failed: {e}"),
            }
        });
        Ok(())
    }
}

fn find_in_path(program: impl AsRef<OsStr>) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program.as_ref()))
        .find(|candidate| candidate.is_file())
}

/// Test double: keeps every utterance in memory. Clones share the same log.
#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct MemorySpeech {
    available: bool,
    spoken: Rc<RefCell<Vec<Utterance>>>,
}

impl MemorySpeech {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            spoken: Rc::default(),
        }
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.borrow().clone()
    }
}

impl SpeechSink for MemorySpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        self.spoken.borrow_mut().push(utterance);
        Ok(())
    }
}
