use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

/// Trailing-edge debouncer
///
/// Every `push` restarts the quiet period; once `delay` passes without a new
/// value the last one is handed to the settle callback. Values pushed in a
/// burst before that are dropped. Dropping the debouncer flushes a pending
/// value immediately.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start the debounce task. Must be called inside a Tokio runtime.
    pub fn spawn<F>(delay: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(mut value) = rx.recv().await {
                loop {
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {
                            on_settle(value);
                            break;
                        }
                        next = rx.recv() => match next {
                            Some(newer) => {
                                trace!("debounce window restarted");
                                value = newer;
                            }
                            None => {
                                on_settle(value);
                                return;
                            }
                        },
                    }
                }
            }
        });

        Self { tx }
    }

    pub fn push(&self, value: T) {
        if self.tx.send(value).is_err() {
            trace!("debounce task already stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value| sink.lock().unwrap().push(value))
    }

    #[tokio::test]
    async fn test_burst_delivers_only_last_value() {
        let (seen, on_settle) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(50), on_settle);

        for term in ["a", "ad", "ada"] {
            debouncer.push(term.to_string());
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["ada".to_string()]);
    }

    #[tokio::test]
    async fn test_separated_pushes_each_settle() {
        let (seen, on_settle) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(20), on_settle);

        debouncer.push("first".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("second".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
    }
}
