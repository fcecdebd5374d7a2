use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use crate::scheduler::Scheduler;
use crate::step::Step;

#[derive(Debug)]
struct Core {
    done: bool,
    waker: Option<Waker>,
}

/// Single-shot future that resolves the next time a render step fires.
///
/// Built entirely on [`Scheduler::once`]; there is no cancellation. The
/// resolution happens synchronously inside the step's drain, but anything
/// awaiting the future resumes on its executor strictly afterwards, so a
/// continuation can never inject work that the current drain pass still
/// observes.
pub struct StepFuture {
    core: Arc<Mutex<Core>>,
}

impl Future for StepFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut core = self.core.lock().unwrap();
        if core.done {
            Poll::Ready(())
        } else {
            core.waker.replace(cx.waker().clone());
            Poll::Pending
        }
    }
}

fn arm(scheduler: &mut Scheduler, step: Step, asap: bool) -> StepFuture {
    let core = Arc::new(Mutex::new(Core {
        done: false,
        waker: None,
    }));
    let resolve = {
        let core = Arc::clone(&core);
        move |_: &mut Scheduler| {
            let mut core = core.lock().unwrap();
            core.done = true;
            if let Some(waker) = core.waker.take() {
                waker.wake();
            }
        }
    };
    if asap {
        scheduler.once_asap(step, resolve);
    } else {
        scheduler.once(step, resolve);
    }
    StepFuture { core }
}

impl Scheduler {
    /// Future for "`step` has completed", resolving the next time the
    /// step drains.
    pub fn promise(&mut self, step: Step) -> StepFuture {
        arm(self, step, false)
    }

    /// [`Scheduler::promise`] with soonest-possible placement, matching
    /// [`Scheduler::once_asap`].
    pub fn promise_asap(&mut self, step: Step) -> StepFuture {
        arm(self, step, true)
    }

    /// Future resolving at the top of the next frame (the first step).
    pub fn next_frame(&mut self) -> StepFuture {
        self.promise(Step::first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SchedulerConfig;
    use std::time::Duration;

    fn scripted() -> Scheduler {
        Scheduler::with_clock(SchedulerConfig::default(), || Duration::ZERO)
    }

    #[test]
    fn resolves_after_its_step_drains() {
        let mut scheduler = scripted();
        let fut = scheduler.promise(Step::Render);
        assert!(scheduler.pending());

        scheduler.tick(Duration::from_millis(16));
        pollster::block_on(fut);
        assert_eq!(scheduler.active_step(), None);
    }

    #[test]
    fn next_frame_resolves_on_the_first_step() {
        let mut scheduler = scripted();
        let fut = scheduler.next_frame();
        scheduler.tick(Duration::from_millis(16));
        pollster::block_on(fut);
    }

    #[test]
    fn promise_asap_joins_an_active_drain() {
        let mut scheduler = scripted();
        let done = std::sync::Arc::new(std::sync::Mutex::new(None));

        let slot = std::sync::Arc::clone(&done);
        scheduler.once(Step::Update, move |f| {
            *slot.lock().unwrap() = Some(f.promise_asap(Step::Update));
        });

        scheduler.tick(Duration::from_millis(16));
        let fut = done.lock().unwrap().take().unwrap();
        pollster::block_on(fut); // resolved within the same frame
    }

    #[test]
    fn unresolved_future_stays_pending() {
        let mut scheduler = scripted();
        let mut fut = scheduler.promise(Step::End);

        let waker = Waker::noop();
        let mut cx = Context::from_waker(waker);
        assert!(Pin::new(&mut fut).poll(&mut cx).is_pending());

        scheduler.tick(Duration::from_millis(16));
        assert!(Pin::new(&mut fut).poll(&mut cx).is_ready());
    }
}
