//! Bounded worker pool for blocking parse and generation jobs.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::options::DEFAULT_WORKERS;

/// Runs batches of blocking jobs with at most `workers` in flight.
///
/// A batch either yields every job result (in completion order) or the first
/// error. Outstanding jobs are aborted once an error is seen.
#[derive(Debug, Clone, Copy)]
pub struct BatchExecutor {
    workers: usize,
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl BatchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn run_batch<T, F>(&self, stage: &'static str, jobs: Vec<F>) -> Result<Vec<T>, PipelineError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    {
        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();

        for job in jobs {
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|err| PipelineError::Worker(err.to_string()))?;
                tokio::task::spawn_blocking(job)
                    .await
                    .map_err(worker_error)?
            });
        }

        debug!(stage, jobs = total, workers = self.workers, "batch submitted");

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = set.join_next().await {
            let outcome = joined.map_err(worker_error).and_then(|result| result);
            match outcome {
                Ok(value) => results.push(value),
                Err(err) => {
                    set.abort_all();
                    warn!(stage, error = %err, "batch aborted");
                    return Err(err);
                }
            }
        }

        Ok(results)
    }
}

fn worker_error(err: JoinError) -> PipelineError {
    if err.is_panic() {
        PipelineError::Worker(panic_message(err.into_panic()))
    } else {
        PipelineError::Worker(format!("job cancelled: {err}"))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic in worker".to_string()
    }
}
