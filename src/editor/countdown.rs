use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

/// A 1 Hz ticker backing the preview timer. The spawned task is aborted when
/// the `Countdown` is dropped, so an abandoned preview never leaves a timer
/// running.
#[derive(Debug)]
pub struct Countdown {
    ticks: mpsc::UnboundedReceiver<()>,
    handle: JoinHandle<()>,
}

impl Countdown {
    pub fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            // The first tick of a fresh interval resolves immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self { ticks: rx, handle }
    }

    /// Waits for the next second to elapse. `None` once the ticker task has
    /// stopped.
    pub async fn next_tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let mut countdown = Countdown::start();
        tokio::task::yield_now().await;

        time::advance(Duration::from_millis(999)).await;
        assert!(countdown.ticks.try_recv().is_err());

        time::advance(Duration::from_millis(1)).await;
        assert!(countdown.next_tick().await.is_some());

        time::advance(Duration::from_secs(3)).await;
        for _ in 0..3 {
            assert!(countdown.next_tick().await.is_some());
        }
        assert!(countdown.ticks.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_the_ticker_task() {
        let countdown = Countdown::start();
        let probe = countdown.handle.abort_handle();
        drop(countdown);

        // Give the runtime a pass to process the abort.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert!(probe.is_finished());
    }
}
