use tokio::task::JoinSet;
use std::future::Future;

/// A set of independent tasks joined together at a single point.
///
/// Each task yields a `T`; [`TaskManager::join_all`] waits for every one of them
/// and hands back whatever completed, in completion order.
pub struct TaskManager<T> {
    tasks: JoinSet<T>,
}

impl<T: Send + 'static> TaskManager<T> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Starts `task` right away. Spawned tasks run until they finish, there is no cancellation.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    /// Waits for all tasks to complete. Panicked or cancelled tasks are logged and left out.
    pub async fn join_all(&mut self) -> Vec<T> {
        log::debug!("Waiting for {} tasks", self.tasks.len());
        let mut results = Vec::with_capacity(self.tasks.len());
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(value) => results.push(value),
                Err(e) => log::error!("Background task failed: {:?}", e),
            }
        }
        results
    }
}

impl<T> Drop for TaskManager<T> {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            // JoinSet aborts whatever is left when it is dropped
            log::warn!("TaskManager dropped with {} active tasks, aborting them", self.tasks.len());
        }
    }
}
