use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crate::queue::{CallbackId, Slot, StepQueue};
use crate::step::Step;

/// Floor on a frame's measured elapsed time.
const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Tolerance of delay between frames (to prevent visual jumps).
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_millis(40);

/// Default tick-delivery lag above which a pending flush waits for the
/// next tick.
pub const DEFAULT_FLUSH_LATENCY: Duration = Duration::from_micros(16_500);

/// When a pending flush is allowed to run on an incoming tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FlushGate {
    /// Flush only when the tick was delivered with less than this much
    /// lag behind its own timestamp; otherwise keep the work pending and
    /// retry on the next tick. Bounds the latency added to a frame that
    /// is already running behind.
    Latency(Duration),
    /// Flush unconditionally whenever work is pending.
    Always,
}

/// Tunables for a [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchedulerConfig {
    /// Cap on the per-frame elapsed time reported to callbacks.
    pub max_elapsed: Duration,
    pub flush_gate: FlushGate,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_elapsed: DEFAULT_MAX_ELAPSED,
            flush_gate: FlushGate::Latency(DEFAULT_FLUSH_LATENCY),
        }
    }
}

type Clock = Box<dyn Fn() -> Duration>;

/// Per-frame task scheduler.
///
/// Callbacks are queued against one of the four [`Step`]s and run when
/// that step drains, in step order, once per frame tick. Callbacks
/// receive `&mut Scheduler` and may submit or remove further work while
/// the frame is draining; the placement rules keep re-entrant submission
/// deterministic (see [`Scheduler::once`]).
pub struct Scheduler {
    queues: [StepQueue; Step::COUNT],
    active: Option<Step>,
    last_tick: Duration,
    elapsed: Duration,
    dilation: f64,
    pending_flush: bool,
    next_id: u64,
    config: SchedulerConfig,
    clock: Clock,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Scheduler with the default config and a monotonic clock starting
    /// at zero on construction.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let origin = Instant::now();
        Self::with_clock(config, move || origin.elapsed())
    }

    /// Scheduler on a caller-supplied clock. Tick timestamps must be in
    /// the same timebase as `clock`.
    pub fn with_clock(config: SchedulerConfig, clock: impl Fn() -> Duration + 'static) -> Self {
        let clock: Clock = Box::new(clock);
        let last_tick = clock();
        Self {
            queues: std::array::from_fn(|_| StepQueue::new()),
            active: None,
            last_tick,
            elapsed: Duration::ZERO,
            dilation: 1.0,
            pending_flush: false,
            next_id: 0,
            config,
            clock,
        }
    }

    /// The step currently draining, or `None` outside a flush.
    pub fn active_step(&self) -> Option<Step> {
        self.active
    }

    /// Timestamp of the most recent tick.
    pub fn time(&self) -> Duration {
        self.last_tick
    }

    /// Dilated elapsed time of the most recent flushed frame.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn dilation(&self) -> f64 {
        self.dilation
    }

    /// Whether queued work is waiting for a flush.
    pub fn pending(&self) -> bool {
        self.pending_flush
    }

    /// Sets the multiplier applied to elapsed time on subsequent frames.
    /// Negative factors are clamped to zero.
    pub fn dilate(&mut self, factor: f64) {
        self.dilation = factor.max(0.0);
    }

    /// Current reading of the scheduler's clock.
    pub fn now(&self) -> Duration {
        (self.clock)()
    }

    /// Queues `callback` to run once, the next time `step` drains.
    ///
    /// When called while a frame is draining, placement keeps the frame
    /// deterministic: a submission targeting a step later than the active
    /// one is deferred to the next frame (running it this frame would let
    /// work scheduled from an earlier step jump the order it observed),
    /// and any other target runs the next time that step drains.
    pub fn once<F>(&mut self, step: Step, callback: F) -> CallbackId
    where
        F: FnOnce(&mut Scheduler) + 'static,
    {
        let id = self.alloc_id();
        self.place(step, Slot::Once(id, Box::new(callback)), false);
        id
    }

    /// Like [`Scheduler::once`], but asks for the soonest possible
    /// execution: if `step` is the one currently draining, the callback
    /// is appended to the live list and runs within this very drain pass.
    /// If an earlier step is draining, the callback still runs this
    /// frame; if a later step is draining, `step` has already passed and
    /// the callback waits for the next frame.
    pub fn once_asap<F>(&mut self, step: Step, callback: F) -> CallbackId
    where
        F: FnOnce(&mut Scheduler) + 'static,
    {
        let id = self.alloc_id();
        self.place(step, Slot::Once(id, Box::new(callback)), true);
        id
    }

    /// Queues `callback` to run every time `step` drains, until it
    /// returns [`ControlFlow::Break`].
    ///
    /// The returned id stays valid across frames: passing it to
    /// [`Scheduler::off`] between frames stops the recurrence.
    pub fn on<F>(&mut self, step: Step, callback: F) -> CallbackId
    where
        F: FnMut(&mut Scheduler) -> ControlFlow<()> + 'static,
    {
        let id = self.alloc_id();
        self.place(step, Slot::Each(id, Box::new(callback)), false);
        id
    }

    /// Removes a queued callback before it fires.
    ///
    /// Only the step's `next` list is searched: a callback already
    /// promoted to the live list by [`Scheduler::once_asap`] can no
    /// longer be removed. The matching slot is tombstoned in place, never
    /// spliced, so an in-progress drain keeps its indices. Unknown ids
    /// are ignored.
    pub fn off(&mut self, step: Step, id: CallbackId) {
        self.queues[step.index()].remove_next(id);
    }

    /// Feeds one frame tick with the given timestamp.
    ///
    /// Without pending work this only records the timestamp, keeping
    /// wall-clock bookkeeping warm. With pending work the flush gate
    /// decides whether to drain this tick or wait for the next one.
    /// Ticks arriving re-entrantly from inside a draining callback are
    /// ignored.
    pub fn tick(&mut self, timestamp: Duration) {
        if self.active.is_some() {
            return;
        }
        let gate_open = match self.config.flush_gate {
            FlushGate::Always => true,
            FlushGate::Latency(limit) => self.now().saturating_sub(timestamp) < limit,
        };
        if self.pending_flush && gate_open {
            self.flush_all(timestamp);
        } else {
            self.last_tick = timestamp;
        }
    }

    #[tracing::instrument(skip(self))]
    fn flush_all(&mut self, timestamp: Duration) {
        self.pending_flush = false;
        let raw = timestamp.saturating_sub(self.last_tick);
        let cap = self.config.max_elapsed.max(MIN_ELAPSED);
        self.elapsed = raw.clamp(MIN_ELAPSED, cap).mul_f64(self.dilation);
        self.last_tick = timestamp;
        for step in Step::ALL {
            self.drain(step);
        }
        self.active = None;
    }

    fn drain(&mut self, step: Step) {
        let i = step.index();
        if self.queues[i].has_next() {
            self.active = Some(step);
            self.queues[i].swap();
            let mut cursor = 0;
            // Re-read the length every iteration: callbacks may append
            // to the live list while it drains.
            while cursor < self.queues[i].now_len() {
                let slot = self.queues[i].take_now(cursor);
                cursor += 1;
                match slot {
                    Slot::Tombstone => {}
                    Slot::Once(_, callback) => callback(self),
                    Slot::Each(id, mut callback) => {
                        if callback(self).is_continue() {
                            self.place(step, Slot::Each(id, callback), false);
                        }
                    }
                }
            }
            self.queues[i].clear_now();
        } else if self.queues[i].has_now() {
            // Swap anyway so `next` keeps naming the list due next.
            self.queues[i].swap();
        }
    }

    fn place(&mut self, step: Step, slot: Slot, asap: bool) {
        let queue = &mut self.queues[step.index()];
        if asap {
            // The soonest possible execution: append to the live list of
            // the step currently draining. No flush needs scheduling.
            if self.active == Some(step) {
                queue.push_now(slot);
                return;
            }
        } else if let Some(active) = self.active {
            // A later step still has its `next` list due this frame, so
            // that list would run this submission out of order. Park it
            // in `now` for the next frame instead.
            if step.index() > active.index() {
                queue.push_now(slot);
                self.pending_flush = true;
                return;
            }
        }
        queue.push_next(slot);
        self.pending_flush = true;
    }

    fn alloc_id(&mut self) -> CallbackId {
        self.next_id += 1;
        CallbackId(self.next_id)
    }
}
