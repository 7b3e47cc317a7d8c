use async_trait::async_trait;

/// A unit of work the [`BatchScheduler`](crate::BatchScheduler) launches
/// `batch_size` times per cycle.
///
/// Jobs resolve on their own: failures are recorded by the job (e.g. into
/// run statistics) rather than returned, so the scheduler only tracks
/// completion.
#[async_trait]
pub trait BatchJob: Send + Sync {
    /// Returns the name of the job, used in log output
    fn name(&self) -> &str;

    /// Executes one instance of the job. `slot` is the launch index within
    /// the current cycle.
    async fn run(&self, slot: usize);
}
