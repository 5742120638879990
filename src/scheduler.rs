use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app::AppEvent;

/// Handle to a scheduled timer. Ids are never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// What a timer drives in the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Elapsed-time ticker, live while recording.
    RecordingTick,
    /// Status message rotator, live while analyzing.
    StatusRotate,
    /// One-shot end of the fake analysis.
    AnalysisDone,
}

/// A timer firing, delivered back to the controller as an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub id: TimerId,
    pub kind: TimerKind,
}

/// Timer capability injected into the controller.
pub trait Scheduler {
    fn schedule_repeating(&mut self, kind: TimerKind, period: Duration) -> TimerId;
    fn schedule_once(&mut self, kind: TimerKind, delay: Duration) -> TimerId;
    /// Cancel a timer. Unknown or already-finished ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

/// Wall-clock timers on a tokio runtime. Firings are posted to the event channel.
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
    sender: async_channel::Sender<AppEvent>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle, sender: async_channel::Sender<AppEvent>) -> Self {
        Self {
            handle,
            sender,
            tasks: HashMap::new(),
            next_id: 0,
        }
    }

    fn allocate(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&mut self, kind: TimerKind, period: Duration) -> TimerId {
        let id = self.allocate();
        let sender = self.sender.clone();
        let task = self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sender.send(AppEvent::Timer(TimerFired { id, kind })).await.is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(id, task);
        id
    }

    fn schedule_once(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        let id = self.allocate();
        let sender = self.sender.clone();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(AppEvent::Timer(TimerFired { id, kind })).await;
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[derive(Debug)]
struct ManualTimer {
    id: TimerId,
    kind: TimerKind,
    deadline: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

/// Test double: virtual-clock scheduler. Clones share the same clock, so a test
/// can keep one handle while the controller owns another.
#[doc(hidden)]
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time since creation.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    pub fn live_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn has_live(&self, kind: TimerKind) -> bool {
        self.inner.borrow().timers.iter().any(|t| t.kind == kind)
    }

    /// Fire the earliest timer due at or before `until`, moving the clock to its deadline.
    /// Ties fire in scheduling order.
    pub fn pop_due(&self, until: Duration) -> Option<TimerFired> {
        let mut inner = self.inner.borrow_mut();
        let idx = inner
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(i, _)| i)?;

        let deadline = inner.timers[idx].deadline;
        inner.now = inner.now.max(deadline);
        let timer = &mut inner.timers[idx];
        let fired = TimerFired {
            id: timer.id,
            kind: timer.kind,
        };
        let period = timer.period;
        match period {
            Some(period) => timer.deadline += period,
            None => {
                inner.timers.remove(idx);
            }
        }
        Some(fired)
    }

    /// Advance the clock by `by`, handing every firing to `on_fire` in order.
    /// Timers scheduled or cancelled from inside `on_fire` are honoured.
    pub fn advance<F>(&self, by: Duration, mut on_fire: F)
    where
        F: FnMut(TimerFired),
    {
        let until = self.now() + by;
        while let Some(fired) = self.pop_due(until) {
            on_fire(fired);
        }
        self.inner.borrow_mut().now = until;
    }

    fn insert(&mut self, kind: TimerKind, after: Duration, period: Option<Duration>) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TimerId(inner.next_id);
        let deadline = inner.now + after;
        inner.timers.push(ManualTimer {
            id,
            kind,
            deadline,
            period,
        });
        id
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, kind: TimerKind, period: Duration) -> TimerId {
        // A zero period would never let `advance` return.
        let period = period.max(Duration::from_millis(1));
        self.insert(kind, period, Some(period))
    }

    fn schedule_once(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.insert(kind, delay, None)
    }

    fn cancel(&mut self, id: TimerId) {
        self.inner.borrow_mut().timers.retain(|t| t.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn repeating_timer_fires_per_period() {
        let mut sched = ManualScheduler::new();
        sched.schedule_repeating(TimerKind::RecordingTick, ms(100));
        let mut count = 0;
        sched.advance(ms(350), |_| count += 1);
        assert_eq!(count, 3);
        assert_eq!(sched.now(), ms(350));
        sched.advance(ms(50), |_| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn once_timer_fires_once_and_is_released() {
        let mut sched = ManualScheduler::new();
        sched.schedule_once(TimerKind::AnalysisDone, ms(2000));
        let mut fired = Vec::new();
        sched.advance(ms(1999), |f| fired.push(f.kind));
        assert!(fired.is_empty());
        sched.advance(ms(5000), |f| fired.push(f.kind));
        assert_eq!(fired, vec![TimerKind::AnalysisDone]);
        assert_eq!(sched.live_timers(), 0);
    }

    #[test]
    fn firings_are_ordered_by_deadline() {
        let mut sched = ManualScheduler::new();
        sched.schedule_once(TimerKind::AnalysisDone, ms(2000));
        sched.schedule_repeating(TimerKind::StatusRotate, ms(800));
        let mut fired = Vec::new();
        let clock = sched.clone();
        sched.advance(ms(2000), |f| fired.push((f.kind, clock.now())));
        assert_eq!(
            fired,
            vec![
                (TimerKind::StatusRotate, ms(800)),
                (TimerKind::StatusRotate, ms(1600)),
                (TimerKind::AnalysisDone, ms(2000)),
            ]
        );
    }

    #[test]
    fn cancel_from_inside_callback() {
        let mut sched = ManualScheduler::new();
        let tick = sched.schedule_repeating(TimerKind::RecordingTick, ms(100));
        let mut handle = sched.clone();
        let mut count = 0;
        sched.advance(ms(1000), |_| {
            count += 1;
            if count == 2 {
                handle.cancel(tick);
            }
        });
        assert_eq!(count, 2);
        assert_eq!(sched.live_timers(), 0);
    }

    #[test]
    fn cancel_unknown_id_is_noop() {
        let mut sched = ManualScheduler::new();
        sched.schedule_once(TimerKind::AnalysisDone, ms(10));
        sched.cancel(TimerId(999));
        assert_eq!(sched.live_timers(), 1);
    }

    mod tokio_timers {
        use super::*;
        use crate::app::{Controller, Phase};
        use crate::config::Config;
        use crate::random::SeededRandom;
        use crate::speech::MemorySpeech;

        fn scheduler() -> (TokioScheduler, async_channel::Receiver<AppEvent>) {
            let (tx, rx) = async_channel::unbounded();
            (TokioScheduler::new(tokio::runtime::Handle::current(), tx), rx)
        }

        #[tokio::test(start_paused = true)]
        async fn repeating_fires_each_period_until_cancelled() {
            let (mut sched, rx) = scheduler();
            let start = tokio::time::Instant::now();
            let id = sched.schedule_repeating(TimerKind::RecordingTick, ms(100));

            for n in 1..=3u32 {
                let event = rx.recv().await.unwrap();
                assert_eq!(
                    event,
                    AppEvent::Timer(TimerFired {
                        id,
                        kind: TimerKind::RecordingTick
                    })
                );
                let elapsed = start.elapsed();
                assert!(elapsed >= ms(100) * n && elapsed < ms(100) * (n + 1), "tick {n} at {elapsed:?}");
            }

            sched.cancel(id);
            tokio::time::sleep(ms(1000)).await;
            assert!(rx.try_recv().is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn once_fires_a_single_time() {
            let (mut sched, rx) = scheduler();
            let start = tokio::time::Instant::now();
            let id = sched.schedule_once(TimerKind::AnalysisDone, ms(2000));

            let event = rx.recv().await.unwrap();
            assert_eq!(
                event,
                AppEvent::Timer(TimerFired {
                    id,
                    kind: TimerKind::AnalysisDone
                })
            );
            assert!(start.elapsed() >= ms(2000));

            tokio::time::sleep(ms(5000)).await;
            assert!(rx.try_recv().is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn cancelled_once_never_fires() {
            let (mut sched, rx) = scheduler();
            let id = sched.schedule_once(TimerKind::AnalysisDone, ms(2000));
            tokio::time::sleep(ms(1000)).await;
            sched.cancel(id);
            tokio::time::sleep(ms(5000)).await;
            assert!(rx.try_recv().is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn drop_aborts_every_timer() {
            let (mut sched, rx) = scheduler();
            sched.schedule_repeating(TimerKind::StatusRotate, ms(800));
            sched.schedule_once(TimerKind::AnalysisDone, ms(2000));
            drop(sched);

            tokio::time::sleep(ms(5000)).await;
            // every sender is gone once the aborted tasks are dropped
            assert!(rx.recv().await.is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn controller_cycle_on_tokio_timers() {
            let (sched, rx) = scheduler();
            let mut ctl = Controller::new(
                &Config::default(),
                Box::new(sched),
                Box::new(SeededRandom::new(7)),
                Box::new(MemorySpeech::new(false)),
            );

            ctl.handle_event(AppEvent::Click);
            while ctl.state().elapsed() < ms(600) {
                ctl.handle_event(rx.recv().await.unwrap());
            }
            ctl.handle_event(AppEvent::Click);
            assert_eq!(ctl.phase(), Phase::Analyzing);

            let start = tokio::time::Instant::now();
            while ctl.phase() == Phase::Analyzing {
                ctl.handle_event(rx.recv().await.unwrap());
            }
            assert_eq!(ctl.phase(), Phase::Result);
            assert!(ctl.state().translation().is_some());
            assert!(start.elapsed() >= ms(2000));
        }
    }
}
