//! Cancellable self-rearming timer

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// What a tick decided about the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Arm the timer again with a fresh delay
    Rearm,
    /// The loop is no longer eligible; go idle
    Stop,
}

/// Work performed on every firing of a [`PeriodicTask`]
#[async_trait]
pub trait TickHandler: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Delay before the next firing, computed fresh each time
    fn next_delay(&self) -> Duration;

    async fn on_tick(&self) -> TickOutcome;
}

struct ArmedLoop {
    generation: u64,
    token: CancellationToken,
    /// `start` was called while a tick was running
    restart_requested: bool,
}

type Slot = Arc<Mutex<Option<ArmedLoop>>>;

/// A periodic loop that is either idle or has exactly one pending tick
///
/// `start` while active and `stop` while idle are no-ops. A tick that is
/// already running when `stop` is called finishes (and may still act once),
/// but the loop never re-arms after a stop. A `start` that lands while a tick
/// is deciding to go idle keeps the loop armed instead of being lost.
pub struct PeriodicTask {
    handler: Arc<dyn TickHandler>,
    armed: Slot,
    generation: AtomicU64,
}

impl PeriodicTask {
    pub fn new(handler: Arc<dyn TickHandler>) -> Self {
        Self {
            handler,
            armed: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        }
    }

    /// Arm the loop. Returns `false` if it was already active or no Tokio runtime is available.
    pub fn start(&self) -> bool {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Cannot start {} loop outside a Tokio runtime: {}", self.handler.name(), e);
                return false;
            }
        };

        if let Some(armed) = self.armed.lock().as_mut() {
            armed.restart_requested = true;
            return false;
        }

        // Computed before the slot is claimed, so a failing handler leaves the loop idle
        let delay = self.handler.next_delay();

        let mut armed = self.armed.lock();
        if let Some(existing) = armed.as_mut() {
            existing.restart_requested = true;
            return false;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        *armed = Some(ArmedLoop {
            generation,
            token: token.clone(),
            restart_requested: false,
        });

        tracing::info!("Started {} loop, first tick in {:.1}s", self.handler.name(), delay.as_secs_f64());
        runtime.spawn(run_loop(
            self.handler.clone(),
            SlotGuard { slot: self.armed.clone(), generation },
            token,
            delay,
        ));
        true
    }

    /// Cancel the pending tick. Returns `false` if the loop was idle.
    pub fn stop(&self) -> bool {
        match self.armed.lock().take() {
            Some(armed) => {
                armed.token.cancel();
                tracing::info!("Stopped {} loop", self.handler.name());
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.armed.lock().is_some()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(armed) = self.armed.lock().take() {
            armed.token.cancel();
        }
    }
}

/// Releases the slot when the loop that owns it ends, however it ends
struct SlotGuard {
    slot: Slot,
    generation: u64,
}

impl SlotGuard {
    fn with_own<T>(&self, f: impl FnOnce(&mut Option<ArmedLoop>) -> T) -> Option<T> {
        let mut slot = self.slot.lock();
        if slot.as_ref().map(|a| a.generation) == Some(self.generation) {
            Some(f(&mut slot))
        } else {
            None
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.with_own(|slot| *slot = None);
    }
}

async fn run_loop(
    handler: Arc<dyn TickHandler>,
    guard: SlotGuard,
    token: CancellationToken,
    mut delay: Duration,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        guard.with_own(|slot| {
            if let Some(armed) = slot.as_mut() {
                armed.restart_requested = false;
            }
        });

        // Run the tick as its own task so a panic costs one tick, not the loop
        let tick = tokio::spawn({
            let handler = handler.clone();
            async move { handler.on_tick().await }
        });
        let outcome = match tick.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("{} tick failed: {}", handler.name(), e);
                TickOutcome::Rearm
            }
        };

        // A stop requested mid-tick wins over whatever the tick decided
        if token.is_cancelled() {
            return;
        }

        if outcome == TickOutcome::Stop {
            let idle = guard.with_own(|slot| match slot.as_mut() {
                Some(armed) if armed.restart_requested => {
                    armed.restart_requested = false;
                    false
                }
                _ => {
                    *slot = None;
                    true
                }
            });
            match idle {
                Some(false) => tracing::debug!("{} loop restarted during its last tick", handler.name()),
                _ => {
                    tracing::info!("{} loop went idle", handler.name());
                    return;
                }
            }
        }
        delay = handler.next_delay();
    }
}
