use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Interval between displayed-amount steps while counting toward the bank.
pub const REVEAL_TICK: Duration = Duration::from_millis(260);

/// Drives the count-up animation of the displayed money amount.
///
/// `start` walks the displayed value through a step sequence on a timer;
/// observers follow along through a watch channel. Starting a new run while
/// one is in flight aborts the old run first, so the display never interleaves
/// two sequences.
pub struct RevealAnimator {
    tx: watch::Sender<u64>,
    handle: Option<JoinHandle<()>>,
    tick: Duration,
}

impl RevealAnimator {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            tx,
            handle: None,
            tick: REVEAL_TICK,
        }
    }

    /// Override the step interval. Test hook.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Current displayed amount.
    #[must_use]
    pub fn displayed(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Watch the displayed amount as it changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Animate the displayed amount through `steps`, one tick apart.
    ///
    /// An empty sequence only cancels the previous run. The final step is the
    /// resting value until the next `start`.
    pub fn start(&mut self, steps: Vec<u64>) {
        self.cancel();
        if steps.is_empty() {
            return;
        }
        let tx = self.tx.clone();
        let tick = self.tick;
        self.handle = Some(tokio::spawn(async move {
            for step in steps {
                tokio::time::sleep(tick).await;
                tx.send_replace(step);
            }
        }));
    }

    /// Stop an in-flight animation, leaving the displayed amount wherever the
    /// last tick put it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Jump straight to `amount` with no animation.
    pub fn snap_to(&mut self, amount: u64) {
        self.cancel();
        self.tx.send_replace(amount);
    }

    /// Whether an animation task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for RevealAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RevealAnimator {
    fn drop(&mut self) {
        self.cancel();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
