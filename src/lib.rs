//! BarkGPT, a dog bark "translator" that translates nothing.
//!
//! [`app::Controller`] drives the record/analyze/reveal cycle. Timers, randomness
//! and speech output are injected so the whole cycle can run on a virtual clock.

pub mod app;
pub mod catalog;
pub mod config;
pub mod random;
pub mod scheduler;
pub mod speech;
