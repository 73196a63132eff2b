//! Background alert playback.
//!
//! One thread owns the buzzer. Tiers are handed over through a rendezvous
//! channel with a non-blocking send, so an offer only lands when the worker
//! is idle and waiting. While a pattern plays, new offers are dropped: at most
//! one pattern sounds at a time and nothing queues up behind it.
//!
//! Dropping the worker closes the channel and joins the thread after the
//! current pattern finishes. The buzzer is silenced on the way out.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cane_traits::ToneOutput;

use crate::alert::AlertActuator;
use crate::risk::RiskTier;

pub struct AlertWorker {
    tx: Option<xch::Sender<RiskTier>>,
    played: Arc<AtomicU64>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl AlertWorker {
    pub fn spawn<B: ToneOutput + Send + 'static>(mut actuator: AlertActuator<B>) -> Self {
        let (tx, rx) = xch::bounded::<RiskTier>(0);
        let played = Arc::new(AtomicU64::new(0));
        let played_clone = played.clone();

        let join_handle = std::thread::spawn(move || {
            for tier in rx.iter() {
                if let Err(e) = actuator.alert(tier) {
                    tracing::warn!(error = %e, %tier, "background alert failed");
                }
                played_clone.fetch_add(1, Ordering::Relaxed);
            }
            if let Err(e) = actuator.silence() {
                tracing::warn!(error = %e, "silencing buzzer on worker exit failed");
            }
            tracing::trace!("alert worker exiting cleanly");
        });

        Self {
            tx: Some(tx),
            played,
            join_handle: Some(join_handle),
        }
    }

    /// Hand `tier` to the worker if it is idle. Returns whether it was taken.
    pub fn offer(&self, tier: RiskTier) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        match tx.try_send(tier) {
            Ok(()) => true,
            Err(xch::TrySendError::Full(_)) => {
                tracing::trace!(%tier, "alert worker busy, dropping");
                false
            }
            Err(xch::TrySendError::Disconnected(_)) => {
                tracing::warn!(%tier, "alert worker gone");
                false
            }
        }
    }

    /// Patterns completed so far.
    pub fn played(&self) -> u64 {
        self.played.load(Ordering::Relaxed)
    }
}

impl core::fmt::Debug for AlertWorker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AlertWorker")
            .field("played", &self.played())
            .finish()
    }
}

impl Drop for AlertWorker {
    fn drop(&mut self) {
        // Closing the sender ends the worker's receive loop.
        drop(self.tx.take());
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(?e, "alert worker panicked during shutdown");
        }
    }
}
