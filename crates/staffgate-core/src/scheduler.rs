//! Background reset of the fixed rate-limit window.
//!
//! [`ResetScheduler::start`] spawns a task on the current tokio runtime that
//! calls [`WindowReset::reset`] once per period, whether or not any requests
//! arrived. A failed or panicking reset is logged and the next tick runs as
//! usual. The task stops on [`ResetScheduler::stop`] or when the scheduler
//! is dropped.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{GateError, GateResult};
use crate::store::WindowCounterStore;

/// Something the scheduler wipes at every window boundary.
pub trait WindowReset: Send + Sync + 'static {
    fn reset(&self) -> GateResult<()>;
}

impl WindowReset for WindowCounterStore {
    fn reset(&self) -> GateResult<()> {
        self.clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TickStats {
    resets: AtomicU64,
    failures: AtomicU64,
}

/// Handle to the running reset task.
pub struct ResetScheduler {
    period: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    stats: Arc<TickStats>,
}

impl ResetScheduler {
    /// Starts resetting `target` every `period`. The first reset happens one
    /// full period after this call.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero or too long for the runtime clock.
    /// [`GateConfig::validate`](crate::GateConfig::validate) rules out both.
    pub fn start<T: WindowReset>(target: Arc<T>, period: Duration) -> Self {
        assert!(!period.is_zero(), "reset period must be non-zero");
        let first_tick = Instant::now()
            .checked_add(period)
            .unwrap_or_else(|| panic!("reset period {period:?} overflows the clock"));

        let cancel = CancellationToken::new();
        let stats = Arc::new(TickStats::default());

        let mut ticker = tokio::time::interval_at(first_tick, period);
        // A late tick shifts the schedule instead of firing twice in a row.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let task_cancel = cancel.clone();
        let task_stats = Arc::clone(&stats);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => run_tick(&*target, &task_stats),
                }
            }
            debug!("reset scheduler task exited");
        });

        info!(period_secs = period.as_secs(), "reset scheduler started");

        Self {
            period,
            cancel,
            handle: Some(handle),
            stats,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Resets that completed successfully so far.
    pub fn resets_performed(&self) -> u64 {
        self.stats.resets.load(Ordering::Relaxed)
    }

    /// Ticks whose reset returned an error or panicked.
    pub fn failed_ticks(&self) -> u64 {
        self.stats.failures.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the schedule and waits for the task to exit. No reset fires
    /// after this returns.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("reset scheduler task ended abnormally: {e}");
            }
        }
        info!(
            resets = self.resets_performed(),
            failed = self.failed_ticks(),
            "reset scheduler stopped"
        );
    }
}

impl Drop for ResetScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn run_tick<T: WindowReset>(target: &T, stats: &TickStats) {
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| target.reset()))
        .unwrap_or_else(|panic| Err(GateError::SchedulerTick(panic_message(&*panic))));

    match outcome {
        Ok(()) => {
            let total = stats.resets.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(resets = total, "rate limit window reset");
        }
        Err(e) => {
            stats.failures.fetch_add(1, Ordering::Relaxed);
            let e = match e {
                tick @ GateError::SchedulerTick(_) => tick,
                other => GateError::SchedulerTick(other.to_string()),
            };
            error!("{e}; next reset stays scheduled");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "reset panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::AtomicUsize;

    use crate::traffic::TrafficClass;

    const PERIOD: Duration = Duration::from_secs(60);

    #[derive(Default)]
    struct CountingTarget {
        calls: AtomicUsize,
        fail_first: usize,
        panic_first: usize,
    }

    impl WindowReset for CountingTarget {
        fn reset(&self) -> GateResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.panic_first {
                panic!("counter shard poisoned");
            }
            if call < self.fail_first {
                return Err(GateError::SchedulerTick("transient".to_string()));
            }
            Ok(())
        }
    }

    impl CountingTarget {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_reset_waits_a_full_period() {
        let target = Arc::new(CountingTarget::default());
        let scheduler = ResetScheduler::start(Arc::clone(&target), PERIOD);

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(target.calls(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(target.calls(), 1);
        assert_eq!(scheduler.resets_performed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period_without_traffic() {
        let target = Arc::new(CountingTarget::default());
        let scheduler = ResetScheduler::start(Arc::clone(&target), PERIOD);

        tokio::time::sleep(Duration::from_secs(3 * 60 + 1)).await;
        assert_eq!(target.calls(), 3);
        assert_eq!(scheduler.resets_performed(), 3);
        assert!(scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tick_does_not_halt_schedule() {
        let target = Arc::new(CountingTarget {
            fail_first: 1,
            ..CountingTarget::default()
        });
        let scheduler = ResetScheduler::start(Arc::clone(&target), PERIOD);

        tokio::time::sleep(Duration::from_secs(2 * 60 + 1)).await;
        assert_eq!(target.calls(), 2);
        assert_eq!(scheduler.failed_ticks(), 1);
        assert_eq!(scheduler.resets_performed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_tick_does_not_halt_schedule() {
        let target = Arc::new(CountingTarget {
            panic_first: 1,
            ..CountingTarget::default()
        });
        let scheduler = ResetScheduler::start(Arc::clone(&target), PERIOD);

        tokio::time::sleep(Duration::from_secs(2 * 60 + 1)).await;
        assert_eq!(target.calls(), 2);
        assert_eq!(scheduler.failed_ticks(), 1);
        assert_eq!(scheduler.resets_performed(), 1);
        assert!(scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_resets() {
        let target = Arc::new(CountingTarget::default());
        let scheduler = ResetScheduler::start(Arc::clone(&target), PERIOD);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(target.calls(), 1);

        scheduler.stop().await;
        tokio::time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(target.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_schedule() {
        let target = Arc::new(CountingTarget::default());
        let scheduler = ResetScheduler::start(Arc::clone(&target), PERIOD);
        drop(scheduler);

        tokio::time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(target.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clears_counter_store() {
        let store = Arc::new(WindowCounterStore::new());
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let scheduler = ResetScheduler::start(Arc::clone(&store), PERIOD);

        store.increment(TrafficClass::General, client);
        store.increment(TrafficClass::Authentication, client);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(store.count(TrafficClass::General, client), 0);
        assert_eq!(store.count(TrafficClass::Authentication, client), 0);

        scheduler.stop().await;
    }

    #[test]
    fn panic_message_extracts_strings() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");

        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "reset panicked");
    }
}
