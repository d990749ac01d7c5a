use core::{
    hint::spin_loop,
    sync::atomic::{fence, Ordering},
    time::Duration,
};

use alloc::{boxed::Box, sync::Arc};
use log::trace;

use crate::sync::SpinNoIrq;

mod queue;

pub use queue::EventId;

pub type BoxTickSource = Box<dyn TickSource>;

const NANO_PER_SEC: u128 = 1_000_000_000;

/// A free running counter with a one-shot compare interrupt.
pub trait TickSource: Send + Sync {
    fn current_ticks(&self) -> u64;
    fn tick_hz(&self) -> u64;
    /// Raises the timer interrupt `ticks` from now.
    fn set_timeval(&self, ticks: u64);
    fn set_irq_enable(&self, enable: bool);
}

/// Software timer queue multiplexed onto one [`TickSource`].
///
/// The platform calls [`Timer::handle_irq`] from the tick source interrupt.
pub struct Timer {
    source: BoxTickSource,
    q: SpinNoIrq<queue::Queue>,
}

impl Timer {
    pub fn new(source: BoxTickSource) -> Self {
        source.set_irq_enable(false);
        Self {
            source,
            q: SpinNoIrq::new(queue::Queue::new()),
        }
    }

    pub fn since_boot(&self) -> Duration {
        self.tick_to_duration(self.source.current_ticks())
    }

    /// Registers a one-shot deadline that runs `callback` on expiry.
    ///
    /// The deadline starts disarmed.
    pub fn deadline(self: &Arc<Self>, callback: impl Fn() + Send + Sync + 'static) -> Deadline {
        let id = self.q.lock().insert(Arc::new(callback));
        Deadline {
            timer: self.clone(),
            id,
        }
    }

    /// Runs every callback whose deadline has passed.
    ///
    /// Callbacks run with the queue unlocked, so they may re-arm deadlines.
    /// Several CPUs may call this at once.
    pub fn handle_irq(&self) {
        loop {
            let (id, callback) = {
                let mut q = self.q.lock();
                match q.pop(self.source.current_ticks()) {
                    Some(event) => event,
                    None => {
                        self.program(&q);
                        return;
                    }
                }
            };

            trace!("timer event {id:?} expired");
            callback();
            drop(callback);
            self.q.lock().finish(id);
        }
    }

    fn arm(&self, id: EventId, after: Duration) {
        let ticks = self.duration_to_tick(after);
        let mut q = self.q.lock();
        let at_tick = self.source.current_ticks().saturating_add(ticks);
        q.arm(id, at_tick);
        self.program(&q);
    }

    fn cancel(&self, id: EventId) -> bool {
        let mut q = self.q.lock();
        let pending = q.disarm(id);
        self.program(&q);
        pending
    }

    fn wait_not_running(&self, id: EventId) {
        while self.q.lock().is_running(id) {
            spin_loop();
        }
    }

    fn is_pending(&self, id: EventId) -> bool {
        self.q.lock().is_pending(id)
    }

    fn remove(&self, id: EventId) {
        let event = {
            let mut q = self.q.lock();
            let event = q.remove(id);
            self.program(&q);
            event
        };
        // The callback may own other deadlines, drop it unlocked.
        drop(event);
    }

    fn program(&self, q: &queue::Queue) {
        self.source.set_irq_enable(false);
        fence(Ordering::SeqCst);

        if let Some(next_tick) = q.next_tick() {
            let now = self.source.current_ticks();
            self.source.set_timeval(next_tick.saturating_sub(now));

            fence(Ordering::SeqCst);
            self.source.set_irq_enable(true);
        }
    }

    fn tick_to_duration(&self, tick: u64) -> Duration {
        Duration::from_nanos((tick as u128 * NANO_PER_SEC / self.source.tick_hz() as u128) as _)
    }

    /// Rounds up, a deadline never fires early.
    fn duration_to_tick(&self, duration: Duration) -> u64 {
        (duration.as_nanos() * self.source.tick_hz() as u128).div_ceil(NANO_PER_SEC) as _
    }
}

/// A cancellable one-shot deadline on a [`Timer`].
///
/// Arming a pending deadline moves it; the callback runs at most once per
/// arming. Dropping the deadline cancels it synchronously.
pub struct Deadline {
    timer: Arc<Timer>,
    id: EventId,
}

impl Deadline {
    /// Arms the deadline `after` from now, replacing any pending expiry.
    pub fn arm(&self, after: Duration) {
        self.timer.arm(self.id, after);
    }

    /// Disarms the deadline. A callback already running keeps running.
    ///
    /// Returns whether the deadline was pending.
    pub fn cancel(&self) -> bool {
        self.timer.cancel(self.id)
    }

    /// Disarms the deadline and waits for a running callback to return.
    ///
    /// Must not be called from the deadline's own callback.
    pub fn cancel_sync(&self) -> bool {
        let pending = self.cancel();
        self.timer.wait_not_running(self.id);
        pending
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending(self.id)
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.cancel_sync();
        self.timer.remove(self.id);
    }
}
