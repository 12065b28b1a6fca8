use std::collections::HashMap;

use crate::config::Config;
use crate::convergence::ConvergenceEvaluator;
use crate::ring_history::RingHistory;
use crate::sample::{PinchEvent, Sample};
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct TrackedFinger {
    pub id: i32,
    pub history: RingHistory<Sample>,
    pub last_update: u64,
    pub added: u64,
}

impl TrackedFinger {
    pub fn new(id: i32, capacity: usize) -> Self {
        Self {
            id,
            history: RingHistory::with_capacity(capacity),
            last_update: 0,
            added: 0,
        }
    }

    pub fn update(&mut self, sample: Sample) {
        self.last_update = sample.timestamp;
        self.added += 1;
        self.history.push(sample);
    }

    #[inline]
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_update)
    }
}

/// What a disappearance signal concluded for one hand
#[derive(Debug, Clone, PartialEq)]
pub enum Judgment {
    Pinch(PinchEvent),
    NoPair { qualifying: usize },
    InsufficientHistory,
    TooFar { distance: f64 },
    NotConverging { increases: usize },
}

impl Judgment {
    #[inline]
    pub fn pinch(&self) -> Option<&PinchEvent> {
        match self {
            Judgment::Pinch(ev) => Some(ev),
            _ => None,
        }
    }
}

/// Pinch state machine of a single hand.
///
/// Fingers are created on their first sample and evicted once they have not
/// been updated for longer than the staleness window. Timestamps are device
/// microseconds; `now` is supplied by the caller.
#[derive(Debug)]
pub struct HandDetector {
    pub hand_id: i32,
    fingers: HashMap<i32, TrackedFinger>,
    evaluator: ConvergenceEvaluator,
    capacity: usize,
    min_history: u64,
    liveness_us: u64,
    stale_us: u64,
    distance_threshold: f64,
}

impl HandDetector {
    pub fn new(hand_id: i32, config: &Config) -> Self {
        Self {
            hand_id,
            fingers: HashMap::with_capacity(5),
            evaluator: ConvergenceEvaluator::from_config(config),
            capacity: config.ring_capacity,
            min_history: config.min_history_for_judgment as u64,
            liveness_us: config.liveness_window().as_micros() as u64,
            stale_us: config.stale_eviction().as_micros() as u64,
            distance_threshold: config.pinch_distance_threshold,
        }
    }

    pub fn on_sample(&mut self, sample: Sample) {
        let capacity = self.capacity;

        self.fingers
            .entry(sample.finger_id)
            .or_insert_with(|| TrackedFinger::new(sample.finger_id, capacity))
            .update(sample);
    }

    pub fn on_finger_disappeared(&mut self, now: u64) -> Judgment {
        let judgment = self.judge(now);

        match &judgment {
            Judgment::Pinch(ev) => tracing::info!(
                "hand {}: pinch at ({:.1}, {:.1}, {:.1})",
                self.hand_id,
                ev.point.pos.x,
                ev.point.pos.y,
                ev.point.pos.z
            ),
            Judgment::NoPair { qualifying } => tracing::debug!(
                "hand {}: could not find 2 fingers, found {}",
                self.hand_id,
                qualifying
            ),
            Judgment::InsufficientHistory => {
                tracing::debug!("hand {}: insufficient history", self.hand_id)
            }
            Judgment::TooFar { distance } => tracing::debug!(
                "hand {}: distance {:.1} is over threshold {:.1}",
                self.hand_id,
                distance,
                self.distance_threshold
            ),
            Judgment::NotConverging { increases } => tracing::debug!(
                "hand {}: failed to converge ({} rises)",
                self.hand_id,
                increases
            ),
        }

        self.evict_stale(now);

        judgment
    }

    fn judge(&self, now: u64) -> Judgment {
        let mut pair: Vec<&TrackedFinger> = self
            .fingers
            .values()
            .filter(|f| f.age(now) < self.liveness_us && f.added >= self.min_history)
            .collect();

        if pair.len() != 2 {
            return Judgment::NoPair {
                qualifying: pair.len(),
            };
        }

        pair.sort_by_key(|f| f.id);
        let (a, b) = (pair[0], pair[1]);

        let (pa, pb) = match Self::newest_pair(a, b) {
            Ok(p) => p,
            Err(_) => return Judgment::InsufficientHistory,
        };

        let distance = pa.point.distance_squared(&pb.point);
        if distance >= self.distance_threshold {
            return Judgment::TooFar { distance };
        }

        let conv = self.evaluator.evaluate(&a.history, &b.history);
        if !conv.converging {
            return Judgment::NotConverging {
                increases: conv.increases,
            };
        }

        Judgment::Pinch(PinchEvent {
            hand_id: self.hand_id,
            point: pa.point,
            timestamp: now,
        })
    }

    fn newest_pair<'a>(
        a: &'a TrackedFinger,
        b: &'a TrackedFinger,
    ) -> Result<(&'a Sample, &'a Sample), Error> {
        Ok((a.history.read_from_newest(0)?, b.history.read_from_newest(0)?))
    }

    fn evict_stale(&mut self, now: u64) {
        let stale_us = self.stale_us;
        let hand_id = self.hand_id;

        self.fingers.retain(|id, f| {
            let keep = f.age(now) <= stale_us;
            if !keep {
                tracing::trace!("hand {}: evicting finger {}", hand_id, id);
            }
            keep
        });
    }

    #[inline]
    pub fn finger(&self, id: i32) -> Option<&TrackedFinger> {
        self.fingers.get(&id)
    }

    #[inline]
    pub fn is_tracking(&self, id: i32) -> bool {
        self.fingers.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fingers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fingers.is_empty()
    }
}
