use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::sample::PinchEvent;

/// Pipeline counters shared between the router and the hand workers
#[derive(Debug, Default)]
pub struct Stats {
    frames: AtomicU64,
    samples: AtomicU64,
    handless_samples: AtomicU64,
    pinches: AtomicU64,
    dropped_pinches: AtomicU64,
    live_hands: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames: u64,
    pub samples: u64,
    pub handless_samples: u64,
    pub pinches: u64,
    pub dropped_pinches: u64,
    pub live_hands: u64,
}

impl Stats {
    #[inline]
    pub(crate) fn frame(&self, samples: u64, handless: u64) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.samples.fetch_add(samples, Ordering::Relaxed);
        self.handless_samples.fetch_add(handless, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_live_hands(&self, n: usize) {
        self.live_hands.store(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            samples: self.samples.load(Ordering::Relaxed),
            handless_samples: self.handless_samples.load(Ordering::Relaxed),
            pinches: self.pinches.load(Ordering::Relaxed),
            dropped_pinches: self.dropped_pinches.load(Ordering::Relaxed),
            live_hands: self.live_hands.load(Ordering::Relaxed),
        }
    }
}

/// Sending half of the pinch event channel.
///
/// Publishing never blocks: when the consumer falls behind and the channel is
/// full the event is dropped and counted.
#[derive(Debug, Clone)]
pub struct PinchSink {
    tx: Sender<PinchEvent>,
    stats: Arc<Stats>,
}

impl PinchSink {
    pub fn new(capacity: usize, stats: Arc<Stats>) -> (Self, Receiver<PinchEvent>) {
        let (tx, rx) = bounded(capacity.max(1));

        (Self { tx, stats }, rx)
    }

    pub fn publish(&self, event: PinchEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.stats.pinches.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(ev)) => {
                let dropped = self.stats.dropped_pinches.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    "pinch sink full, dropping pinch of hand {} ({} dropped so far)",
                    ev.hand_id,
                    dropped
                );
                false
            }
            Err(TrySendError::Disconnected(ev)) => {
                self.stats.dropped_pinches.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("pinch consumer gone, dropping pinch of hand {}", ev.hand_id);
                false
            }
        }
    }

    #[inline]
    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }
}
