mod controller;
mod event;
mod pointer;
mod state;

pub use controller::Controller;
pub use event::AppEvent;
pub use pointer::PointerHold;
pub use state::{Effect, Input, Phase, SessionState};
