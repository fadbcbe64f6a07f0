// src/pipeline/scheduler.rs

//! Repeating timer that drives [`MatchPipeline`] ticks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::tick::MatchPipeline;

/// Owns at most one armed timer.
///
/// Each tick runs in its own task, so [`Scheduler::stop`] only prevents
/// future ticks; a tick already fetching finishes and applies its results.
pub struct Scheduler {
    pipeline: Arc<MatchPipeline>,
    period: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(pipeline: Arc<MatchPipeline>, period: Duration) -> Self {
        Self {
            pipeline,
            period,
            timer: Mutex::new(None),
        }
    }

    pub fn pipeline(&self) -> &Arc<MatchPipeline> {
        &self.pipeline
    }

    pub fn is_checking(&self) -> bool {
        self.pipeline.state().is_checking()
    }

    /// Arm the timer. The first tick fires one period from now.
    ///
    /// Returns `false` without arming anything if already checking.
    pub fn start(&self) -> bool {
        let state = Arc::clone(self.pipeline.state());
        if state.set_checking(true) {
            log::debug!("Already checking; start ignored");
            return false;
        }

        let pipeline = Arc::clone(&self.pipeline);
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !state.is_checking() {
                    break;
                }
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move {
                    pipeline.tick().await;
                });
            }
        });

        if let Some(previous) = self.timer.lock().replace(handle) {
            previous.abort();
        }
        log::info!("Started checking every {:?}", self.period);
        true
    }

    /// Clear the checking flag and cancel the timer immediately.
    ///
    /// Returns `false` if nothing was running.
    pub fn stop(&self) -> bool {
        let was_checking = self.pipeline.state().set_checking(false);
        if let Some(timer) = self.timer.lock().take() {
            timer.abort();
        }
        if was_checking {
            log::info!("Stopped checking");
        }
        was_checking
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use tokio::sync::Notify;

    use super::*;
    use crate::models::ConditionTable;
    use crate::pipeline::WatchState;
    use crate::pipeline::tick::tests::{FakeFetcher, RecordingNotifier, listing, pipeline};

    const PERIOD: Duration = Duration::from_secs(3);

    fn scheduler(fetcher: Arc<FakeFetcher>, state: Arc<WatchState>) -> Scheduler {
        let pipeline = pipeline(fetcher, Arc::new(RecordingNotifier::default()), state);
        Scheduler::new(Arc::new(pipeline), PERIOD)
    }

    fn pages(count: usize) -> Vec<crate::error::Result<String>> {
        (0..count).map(|_| Ok(listing(&[("a", "")]))).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let state = Arc::new(WatchState::new());
        let fetcher = Arc::new(FakeFetcher::pages(pages(10)));
        let scheduler = scheduler(fetcher.clone(), state.clone());

        assert!(scheduler.start());
        assert!(state.is_checking());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(PERIOD).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(PERIOD * 2).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        assert_eq!(state.posts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_arms_one_timer() {
        let state = Arc::new(WatchState::new());
        let fetcher = Arc::new(FakeFetcher::pages(pages(10)));
        let scheduler = scheduler(fetcher.clone(), state);

        assert!(scheduler.start());
        assert!(!scheduler.start());

        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_future_ticks() {
        let state = Arc::new(WatchState::new());
        let fetcher = Arc::new(FakeFetcher::pages(pages(10)));
        let scheduler = scheduler(fetcher.clone(), state.clone());

        scheduler.start();
        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
        assert!(scheduler.stop());
        assert!(!state.is_checking());
        assert!(!scheduler.stop());

        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        // Restart arms a fresh timer.
        assert!(scheduler.start());
        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_tick_completes_after_stop() {
        let state = Arc::new(WatchState::new());
        state.install_conditions(ConditionTable::new());
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(FakeFetcher::gated(
            listing(&[("late", "result")]),
            gate.clone(),
        ));
        let scheduler = scheduler(fetcher.clone(), state.clone());

        scheduler.start();
        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(state.is_loading());

        scheduler.stop();
        gate.notify_one();
        while state.is_loading() {
            tokio::task::yield_now().await;
        }

        assert_eq!(state.posts().len(), 1);
        assert_eq!(state.posts()[0].title, "late");
        assert_eq!(&*state.feedback(), "No matches found. Refreshing...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_tick_skips_overlapping_ticks() {
        let state = Arc::new(WatchState::new());
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(FakeFetcher::gated(listing(&[("a", "")]), gate.clone()));
        let scheduler = scheduler(fetcher.clone(), state.clone());

        scheduler.start();
        tokio::time::sleep(PERIOD * 4 + Duration::from_millis(100)).await;

        // Later timer firings found the first tick still pending.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(state.is_loading());

        scheduler.stop();
        gate.notify_one();
    }
}
