use crate::scheduler::TimerFired;

/// Everything the controller reacts to. Front ends and timers post these on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Mouse button down or touch start on the record control.
    PointerDown,
    /// Mouse button up or touch end on the record control.
    PointerUp,
    /// Click on the record control. Delivered after `PointerUp` for pointer clicks.
    Click,
    /// The separate "Stop Recording" affordance.
    StopClicked,
    SpeakClicked,
    GenerateNew,
    Timer(TimerFired),
    /// UI is going away; release every timer.
    Shutdown,
}
