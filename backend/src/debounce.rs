use std::{future::Future, time::Duration};

use tokio::task::AbortHandle;

/// Cancel handle for a scheduled task.
#[derive(Debug, Clone)]
pub struct Scheduled(AbortHandle);

impl Scheduled {
    pub fn cancel(&self) {
        self.0.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

/// Runs the most recently scheduled task once `delay` has passed without a
/// newer one arriving. Dropping the debouncer cancels the pending task.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Scheduled>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, task: F) -> Scheduled
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        let scheduled = Scheduled(handle.abort_handle());
        self.pending = Some(scheduled.clone());
        scheduled
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<String>>>;

    fn record(calls: &Calls, value: &str) -> impl Future<Output = ()> + Send + 'static {
        let calls = calls.clone();
        let value = value.to_string();
        async move { calls.lock().unwrap().push(value) }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_input_runs_only_the_last_task() {
        let calls = Calls::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.schedule(record(&calls, "re"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.schedule(record(&calls, "ref"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.schedule(record(&calls, "reff"));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["reff".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_input_runs_each_task() {
        let calls = Calls::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.schedule(record(&calls, "a"));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        debouncer.schedule(record(&calls, "b"));
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_handle_and_drop_stop_pending_task() {
        let calls = Calls::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        let scheduled = debouncer.schedule(record(&calls, "cancelled"));
        scheduled.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;

        debouncer.schedule(record(&calls, "dropped"));
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(calls.lock().unwrap().is_empty());
    }
}
