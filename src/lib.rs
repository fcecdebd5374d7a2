//! Framestep is a per-frame task scheduler for render loops.
//!
//! Work submitted during a frame is partitioned into four ordered steps
//! (`start`, `update`, `render`, `end`), and work queued during one step
//! runs in the correct step: later in the same frame, or at the top of
//! the next one.
//!
//! # Frame model
//!
//! 1. **Submit**: [`Scheduler::once`] / [`Scheduler::on`] queue a
//!    callback against a [`Step`] and mark a flush as pending.
//! 2. **Tick**: the host (or a [`Ticker`]) feeds one timestamp per
//!    environment frame to [`Scheduler::tick`].
//! 3. **Drain**: a pending flush walks the steps in order; each step's
//!    double-buffered queue is swapped and drained, and callbacks
//!    submitted mid-drain land in the buffer that makes them run in the
//!    right frame.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded by construction**: one logical render loop; no
//!   locking in the queue engine, exclusivity is structural.
//! - **No steady-state allocation**: each step's two queue buffers are
//!   swapped and reused, never reallocated per frame.
//! - **Deterministic re-entrancy**: callbacks may submit and remove work
//!   while the frame drains; placement rules decide between "this drain
//!   pass", "this frame", and "next frame" (see [`Scheduler::once`] and
//!   [`Scheduler::once_asap`]).
//!
//! # Getting started
//!
//! ```
//! use framestep::{Scheduler, Step};
//!
//! let mut frame = Scheduler::new();
//! frame.once(Step::Update, |f| {
//!     // one simulation step, scaled by the frame's dilated elapsed time
//!     let _dt = f.elapsed();
//! });
//!
//! let t = frame.now();
//! frame.tick(t); // host delivers one frame tick
//! assert_eq!(frame.active_step(), None);
//! ```
#![forbid(unsafe_code)]

mod error;
mod future;
mod queue;
mod scheduler;
mod step;
mod ticker;

pub use error::{FramestepError, FramestepResult};
pub use future::StepFuture;
pub use queue::CallbackId;
pub use scheduler::{
    DEFAULT_FLUSH_LATENCY, DEFAULT_MAX_ELAPSED, FlushGate, Scheduler, SchedulerConfig,
};
pub use step::Step;
pub use ticker::{FrameSource, IntervalFrames, Ticker};
