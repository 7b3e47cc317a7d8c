//! # Batch Scheduler
//!
//! Fires `batch_size` concurrent instances of a [`BatchJob`] per cycle and
//! keeps cycling until the cancellation token fires. Two pacing strategies
//! are supported, see [`BatchMode`].
//!
//! Cancellation only stops new launches. Every job that was spawned is
//! awaited before [`BatchScheduler::run`] returns.

use crate::config::{BatchConfig, BatchMode};
use crate::traits::BatchJob;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

/// Emitted once per cycle to the caller's callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    /// Jobs launched in this cycle
    pub launched: usize,
    /// Jobs that finished since the previous report
    pub completed: usize,
    /// Jobs still running when the report was taken
    pub in_flight: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub cycles: u64,
    pub launched: u64,
    pub completed: u64,
    pub panicked: u64,
}

impl SchedulerSummary {
    fn tally(&mut self, res: Result<(), tokio::task::JoinError>) {
        match res {
            Ok(()) => self.completed += 1,
            Err(e) => {
                error!("A job task panicked or failed to join: {:?}", e);
                self.panicked += 1;
            }
        }
    }
}

pub struct BatchScheduler<J: BatchJob + 'static> {
    job: Arc<J>,
    config: BatchConfig,
}

impl<J: BatchJob + 'static> BatchScheduler<J> {
    pub fn new(job: Arc<J>, config: BatchConfig) -> Self {
        Self { job, config }
    }

    fn spawn_job(&self, set: &mut JoinSet<()>, cycle: u64, slot: usize) {
        let job = self.job.clone();
        let span = tracing::info_span!("job", cycle = cycle, slot = format!("{:03}", slot + 1));
        set.spawn(async move { job.run(slot).await }.instrument(span));
    }

    /// Runs cycles until `token` is cancelled, then drains in-flight jobs.
    pub async fn run<F>(&self, token: CancellationToken, on_cycle: F) -> SchedulerSummary
    where
        F: FnMut(&CycleReport),
    {
        if self.config.batch_size == 0 {
            warn!("Batch size is 0, nothing to schedule for {}", self.job.name());
            return SchedulerSummary::default();
        }
        if let BatchMode::FixedInterval { period } = self.config.mode {
            if period.is_zero() {
                warn!("Fixed-interval period is 0, refusing to schedule {}", self.job.name());
                return SchedulerSummary::default();
            }
        }

        let start_time = Instant::now();
        info!(
            "Starting {} scheduler: {} jobs per cycle ({:?})",
            self.job.name(),
            self.config.batch_size,
            self.config.mode
        );

        let summary = match self.config.mode {
            BatchMode::Staggered { stagger, pause } => {
                self.run_staggered(token, stagger, pause, on_cycle).await
            }
            BatchMode::FixedInterval { period } => {
                self.run_fixed_interval(token, period, on_cycle).await
            }
        };

        info!(
            "Scheduler stopped after {:.1}s | Cycles: {} | Launched: {} | Completed: {} | Panicked: {}",
            start_time.elapsed().as_secs_f64(),
            summary.cycles,
            summary.launched,
            summary.completed,
            summary.panicked
        );

        summary
    }

    /// Launches one batch with `stagger` between launches and waits for
    /// every launched job. Stops launching early if `token` is cancelled.
    pub async fn run_batch(
        &self,
        cycle: u64,
        stagger: Duration,
        token: &CancellationToken,
    ) -> (CycleReport, SchedulerSummary) {
        let batch_size = self.config.batch_size;
        let mut set = JoinSet::new();
        let mut launched = 0;

        for slot in 0..batch_size {
            if token.is_cancelled() {
                break;
            }
            self.spawn_job(&mut set, cycle, slot);
            launched += 1;

            if slot + 1 < batch_size && !stagger.is_zero() {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = sleep(stagger) => {}
                }
            }
        }

        let mut summary = SchedulerSummary {
            cycles: 1,
            launched: launched as u64,
            ..Default::default()
        };
        while let Some(res) = set.join_next().await {
            summary.tally(res);
        }

        let report = CycleReport {
            cycle,
            launched,
            completed: (summary.completed + summary.panicked) as usize,
            in_flight: 0,
        };
        (report, summary)
    }

    async fn run_staggered<F>(
        &self,
        token: CancellationToken,
        stagger: Duration,
        pause: Duration,
        mut on_cycle: F,
    ) -> SchedulerSummary
    where
        F: FnMut(&CycleReport),
    {
        let mut summary = SchedulerSummary::default();
        let mut cycle = 0;

        loop {
            if token.is_cancelled() {
                break;
            }

            cycle += 1;
            let (report, batch) = self.run_batch(cycle, stagger, &token).await;
            summary.cycles += batch.cycles;
            summary.launched += batch.launched;
            summary.completed += batch.completed;
            summary.panicked += batch.panicked;
            on_cycle(&report);

            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Cancelled during inter-batch pause");
                    break;
                }
                _ = sleep(pause) => {}
            }
        }

        summary
    }

    async fn run_fixed_interval<F>(
        &self,
        token: CancellationToken,
        period: Duration,
        mut on_cycle: F,
    ) -> SchedulerSummary
    where
        F: FnMut(&CycleReport),
    {
        let mut summary = SchedulerSummary::default();
        let mut in_flight = JoinSet::new();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut completed_since_report = 0;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                Some(res) = in_flight.join_next(), if !in_flight.is_empty() => {
                    summary.tally(res);
                    completed_since_report += 1;
                }
                _ = ticker.tick() => {
                    summary.cycles += 1;
                    let cycle = summary.cycles;
                    for slot in 0..self.config.batch_size {
                        self.spawn_job(&mut in_flight, cycle, slot);
                    }
                    summary.launched += self.config.batch_size as u64;

                    on_cycle(&CycleReport {
                        cycle,
                        launched: self.config.batch_size,
                        completed: completed_since_report,
                        in_flight: in_flight.len(),
                    });
                    completed_since_report = 0;
                }
            }
        }

        if !in_flight.is_empty() {
            info!("Waiting for {} in-flight jobs to finish...", in_flight.len());
        }
        while let Some(res) = in_flight.join_next().await {
            summary.tally(res);
        }

        summary
    }
}
