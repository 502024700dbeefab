//! Independent, cancellable polling loops.

use crate::metrics::CollectorMetrics;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// One polling job against one target.
#[async_trait]
pub trait Collector: Send {
    fn name(&self) -> &str;

    /// Fixed delay between the end of a tick and the start of the next one.
    fn interval(&self) -> Duration;

    /// One polling pass. Failures are logged by the collector; a tick never
    /// fails as a whole.
    async fn tick(&mut self);

    /// Run the tick loop until `token` is cancelled.
    async fn start(&mut self, token: CancellationToken) {
        run_every(self, token).await
    }
}

/// Tick immediately, then once per interval. Cancellation is only observed
/// between ticks, so a tick in flight always runs to completion.
pub async fn run_every<C: Collector + ?Sized>(collector: &mut C, token: CancellationToken) {
    let metrics = CollectorMetrics::for_collector(collector.name());
    let interval = collector.interval();

    tracing::debug!(collector = %collector.name(), ?interval, "Starting polling loop");

    while !token.is_cancelled() {
        let started = Instant::now();
        collector.tick().await;
        metrics.record_tick(started.elapsed());

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::debug!(collector = %collector.name(), "Polling loop stopped");
}

/// Owns the task of every running collector and the token that stops them.
pub struct Scheduler {
    token: CancellationToken,
    tasks: JoinSet<()>,
}

impl Scheduler {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            tasks: JoinSet::new(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn spawn<C: Collector + 'static>(&mut self, mut collector: C) {
        let token = self.token.clone();
        self.tasks.spawn(async move {
            collector.start(token).await;
        });
    }

    /// Wait for every loop to exit. Loops only exit once the token is
    /// cancelled.
    pub async fn join(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(err) = result {
                tracing::error!("Collector task failed: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingCollector {
        interval: Duration,
        tick_duration: Duration,
        started: Arc<AtomicUsize>,
        completed: Arc<AtomicUsize>,
    }

    impl CountingCollector {
        fn new(interval: Duration, tick_duration: Duration) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let started = Arc::new(AtomicUsize::new(0));
            let completed = Arc::new(AtomicUsize::new(0));
            let collector = Self {
                interval,
                tick_duration,
                started: started.clone(),
                completed: completed.clone(),
            };
            (collector, started, completed)
        }
    }

    #[async_trait]
    impl Collector for CountingCollector {
        fn name(&self) -> &str {
            "counting"
        }

        fn interval(&self) -> Duration {
            self.interval
        }

        async fn tick(&mut self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            if !self.tick_duration.is_zero() {
                tokio::time::sleep(self.tick_duration).await;
            }
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate_then_fixed_interval() {
        let (collector, _, completed) =
            CountingCollector::new(Duration::from_secs(10), Duration::ZERO);
        let mut scheduler = Scheduler::new(CancellationToken::new());
        scheduler.spawn(collector);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 5);

        scheduler.token().cancel();
        scheduler.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_without_new_tick() {
        let (collector, started, _) =
            CountingCollector::new(Duration::from_secs(10), Duration::ZERO);
        let token = CancellationToken::new();
        let mut scheduler = Scheduler::new(token.clone());
        scheduler.spawn(collector);

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
        scheduler.join().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_tick_finishes_on_cancel() {
        let (collector, started, completed) =
            CountingCollector::new(Duration::from_secs(1), Duration::from_secs(5));
        let token = CancellationToken::new();
        let mut scheduler = Scheduler::new(token.clone());
        scheduler.spawn(collector);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(completed.load(Ordering::SeqCst), 0);

        token.cancel();
        scheduler.join().await;

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loops_run_at_their_own_cadence() {
        let (fast, _, fast_ticks) = CountingCollector::new(Duration::from_secs(1), Duration::ZERO);
        let (slow, _, slow_ticks) = CountingCollector::new(Duration::from_secs(15), Duration::ZERO);
        let mut scheduler = Scheduler::new(CancellationToken::new());
        scheduler.spawn(fast);
        scheduler.spawn(slow);
        assert_eq!(scheduler.len(), 2);

        tokio::time::sleep(Duration::from_millis(15_500)).await;
        assert_eq!(fast_ticks.load(Ordering::SeqCst), 16);
        assert_eq!(slow_ticks.load(Ordering::SeqCst), 2);

        scheduler.token().cancel();
        scheduler.join().await;
    }
}
