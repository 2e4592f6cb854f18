//! A join barrier over a set of spawned tasks.
use futures::future::join_all;
use std::future::Future;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

/// A group of named tasks that are always awaited together.
///
/// This struct is responsible for:
/// - Spawning tasks and keeping track of their `JoinHandle`s.
/// - Awaiting every task in `join`, reporting panics per task.
/// - Aborting any task still running if the group is dropped unjoined.
#[derive(Debug)]
pub struct WorkerGroup<T> {
    handles: Vec<(String, JoinHandle<T>)>,
}

impl<T: Send + 'static> WorkerGroup<T> {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }

    /// Spawns a new task and adds its handle to the group.
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let name = name.into();
        debug!(worker = %name, "Spawning worker");
        let handle = tokio::spawn(future);
        self.handles.push((name, handle));
    }

    /// Waits for every task, returning each outcome in spawn order.
    ///
    /// The handles stay owned by the group until every task has finished,
    /// so dropping this future part-way aborts whatever is still running.
    pub async fn join(mut self) -> Vec<(String, Result<T, JoinError>)> {
        let results = join_all(self.handles.iter_mut().map(|(_, handle)| handle)).await;

        let names: Vec<String> = self.handles.drain(..).map(|(name, _)| name).collect();

        names
            .into_iter()
            .zip(results)
            .inspect(|(name, result)| {
                if let Err(e) = result {
                    error!(worker = %name, error = %e, "Worker panicked");
                }
            })
            .collect()
    }
}

impl<T: Send + 'static> Default for WorkerGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for WorkerGroup<T> {
    fn drop(&mut self) {
        for (name, handle) in self.handles.drain(..) {
            if !handle.is_finished() {
                debug!(worker = %name, "Aborting unjoined worker");
                handle.abort();
            }
        }
    }
}
