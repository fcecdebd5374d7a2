use std::thread;
use std::time::{Duration, Instant};

use crate::error::{FramestepError, FramestepResult};
use crate::scheduler::Scheduler;

/// Source of frame-boundary timestamps.
///
/// One call blocks until the host's next frame boundary and returns its
/// timestamp. Timestamps must be monotonic and in the same timebase as
/// the clock of the scheduler being driven.
pub trait FrameSource {
    fn next_frame(&mut self) -> Duration;
}

/// Fixed-cadence pacer: a frame boundary every `interval` of wall time.
///
/// Stands in for an environment refresh signal on hosts that have none.
/// Build the paired scheduler with [`IntervalFrames::clock`] so tick
/// timestamps and the scheduler clock share a timebase.
pub struct IntervalFrames {
    origin: Instant,
    interval: Duration,
    deadline: Duration, // next boundary, relative to origin
}

impl IntervalFrames {
    pub fn new(interval: Duration) -> FramestepResult<Self> {
        if interval.is_zero() {
            return Err(FramestepError::validation(
                "IntervalFrames interval must be > 0",
            ));
        }
        Ok(Self {
            origin: Instant::now(),
            interval,
            deadline: interval,
        })
    }

    pub fn from_fps(fps: u32) -> FramestepResult<Self> {
        if fps == 0 {
            return Err(FramestepError::validation("IntervalFrames fps must be > 0"));
        }
        Self::new(Duration::from_secs(1) / fps)
    }

    /// Clock in this source's timebase, for [`Scheduler::with_clock`].
    pub fn clock(&self) -> impl Fn() -> Duration + 'static + use<> {
        let origin = self.origin;
        move || origin.elapsed()
    }
}

impl FrameSource for IntervalFrames {
    fn next_frame(&mut self) -> Duration {
        let now = self.origin.elapsed();
        if let Some(wait) = self.deadline.checked_sub(now) {
            thread::sleep(wait);
        }
        let t = self.origin.elapsed();
        // Step the deadline past `t` so one slow frame does not trigger
        // a burst of catch-up frames.
        while self.deadline <= t {
            self.deadline += self.interval;
        }
        t
    }
}

/// Drives a [`Scheduler`] from a [`FrameSource`], one tick per frame.
///
/// The loop is the self-perpetuating registration of a callback-driven
/// host turned inside out; hosts that deliver their own frame callbacks
/// can skip this type and call [`Scheduler::tick`] directly.
pub struct Ticker<S> {
    source: S,
}

impl<S: FrameSource> Ticker<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Waits for the next frame boundary and feeds it to the scheduler.
    /// Returns the tick timestamp.
    pub fn tick(&mut self, scheduler: &mut Scheduler) -> Duration {
        let timestamp = self.source.next_frame();
        scheduler.tick(timestamp);
        timestamp
    }

    /// Ticks until `keep_going` returns false. The predicate is checked
    /// before each frame, so `|f| f.pending()` runs queued work dry and
    /// stops.
    pub fn run_while(&mut self, scheduler: &mut Scheduler, mut keep_going: impl FnMut(&Scheduler) -> bool) {
        while keep_going(scheduler) {
            self.tick(scheduler);
        }
    }
}
