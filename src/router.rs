use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::thread::JoinHandle;

use crate::config::Config;
use crate::error::Error;
use crate::frame::Frame;
use crate::sink::PinchSink;
use crate::worker::HandWorker;

/// Demultiplexes frames into one worker per hand and raises disappearance
/// signals when a hand shows fewer fingers than in the previous frame.
///
/// A hand's samples for a frame are always queued before that frame's
/// disappearance signal, so a worker never judges a partially applied frame.
pub struct FrameRouter {
    config: Config,
    sink: PinchSink,
    hands: HashMap<i32, HandWorker>,
    curr: HashMap<i32, usize>,
    prev: HashMap<i32, usize>,
    retired: Vec<(i32, JoinHandle<()>)>,
}

impl FrameRouter {
    pub fn new(config: Config, sink: PinchSink) -> Self {
        Self {
            config,
            sink,
            hands: HashMap::new(),
            curr: HashMap::new(),
            prev: HashMap::new(),
            retired: Vec::new(),
        }
    }

    pub fn route(&mut self, frame: &Frame) -> Result<(), Error> {
        let now = frame.timestamp;
        let mut routed = 0;

        for sample in frame.samples() {
            let hand_id = sample.hand_id();
            *self.curr.entry(hand_id).or_insert(0) += 1;

            let worker = match self.hands.entry(hand_id) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    e.insert(HandWorker::spawn(hand_id, &self.config, self.sink.clone())?)
                }
            };

            worker.last_seen = now;
            worker.send_sample(sample);
            routed += 1;
        }

        for (hand_id, &before) in &self.prev {
            let after = self.curr.get(hand_id).copied().unwrap_or(0);

            if after < before {
                tracing::trace!("hand {}: {} -> {} fingers", hand_id, before, after);

                if let Some(worker) = self.hands.get(hand_id) {
                    worker.signal_disappeared(now);
                }
            }
        }

        self.prev = std::mem::take(&mut self.curr);

        self.retire_idle(now);

        let stats = self.sink.stats();
        stats.frame(routed, frame.len() as u64 - routed);
        stats.set_live_hands(self.hands.len());

        Ok(())
    }

    fn retire_idle(&mut self, now: u64) {
        let timeout_us = match self.config.hand_idle_timeout() {
            Some(t) => t.as_micros() as u64,
            None => return,
        };

        let idle: Vec<i32> = self
            .hands
            .iter()
            .filter(|(_, w)| now.saturating_sub(w.last_seen) > timeout_us)
            .map(|(id, _)| *id)
            .collect();

        for hand_id in idle {
            if let Some(worker) = self.hands.remove(&hand_id) {
                tracing::info!("hand {}: idle, tearing down worker", hand_id);
                self.retired.push(worker.close());
            }
        }

        self.retired.retain(|(_, handle)| !handle.is_finished());
    }

    /// Routes every frame of `frames`, then shuts down once the source ends.
    pub fn run<I>(mut self, frames: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Frame>,
    {
        for frame in frames {
            self.route(&frame)?;
        }

        self.finish()
    }

    /// Closes every hand queue and waits for the workers to drain.
    pub fn finish(self) -> Result<(), Error> {
        let Self { hands, retired, sink, .. } = self;
        let mut result = Ok(());

        let handles = hands
            .into_values()
            .map(HandWorker::close)
            .chain(retired);

        for (hand_id, handle) in handles {
            if handle.join().is_err() {
                tracing::warn!("hand {}: worker panicked", hand_id);
                result = Err(Error::WorkerPanicked { hand_id });
            }
        }

        sink.stats().set_live_hands(0);

        result
    }

    #[inline]
    pub fn is_routing(&self, hand_id: i32) -> bool {
        self.hands.contains_key(&hand_id)
    }

    #[inline]
    pub fn hand_ids(&self) -> impl Iterator<Item = &i32> {
        self.hands.keys()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Pointable, NO_HAND};
    use crate::sink::Stats;
    use std::sync::Arc;

    fn pointable(id: i32, hand_id: i32, x: f64) -> Pointable {
        Pointable {
            id,
            hand_id,
            tip_position: [x, 0.0, 0.0],
        }
    }

    fn frame(id: i64, pointables: Vec<Pointable>) -> Frame {
        Frame {
            id,
            timestamp: id as u64 * 5_000,
            pointables,
        }
    }

    fn router(config: Config) -> (FrameRouter, Arc<Stats>) {
        let stats = Arc::new(Stats::default());
        let (sink, _rx) = PinchSink::new(8, stats.clone());
        (FrameRouter::new(config, sink), stats)
    }

    #[test]
    fn creates_one_worker_per_hand() {
        let (mut router, stats) = router(Config::default());

        router
            .route(&frame(
                0,
                vec![
                    pointable(1, 7, 0.0),
                    pointable(2, 7, 1.0),
                    pointable(3, 8, 2.0),
                    pointable(4, NO_HAND, 3.0),
                ],
            ))
            .unwrap();

        let mut ids: Vec<_> = router.hand_ids().copied().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![7, 8]);

        let snap = stats.snapshot();
        assert_eq!(snap.frames, 1);
        assert_eq!(snap.samples, 3);
        assert_eq!(snap.handless_samples, 1);
        assert_eq!(snap.live_hands, 2);

        router.finish().unwrap();
        assert_eq!(stats.snapshot().live_hands, 0);
    }

    #[test]
    fn handless_only_frame_creates_nothing() {
        let (mut router, _) = router(Config::default());
        router
            .route(&frame(0, vec![pointable(1, NO_HAND, 0.0)]))
            .unwrap();

        assert!(router.is_empty());
        router.finish().unwrap();
    }

    #[test]
    fn idle_hands_are_torn_down_when_enabled() {
        let config = Config {
            hand_idle_timeout_ms: Some(100),
            ..Config::default()
        };
        let (mut router, _) = router(config);

        router.route(&frame(0, vec![pointable(1, 7, 0.0)])).unwrap();
        for id in 1..=20 {
            router.route(&frame(id, vec![pointable(1, 8, 0.0)])).unwrap();
        }
        assert!(router.is_routing(7), "100ms after last sight is kept");

        router.route(&frame(21, vec![pointable(1, 8, 0.0)])).unwrap();
        assert!(!router.is_routing(7));
        assert!(router.is_routing(8));

        router.finish().unwrap();
    }

    #[test]
    fn hands_persist_without_idle_timeout() {
        let (mut router, _) = router(Config::default());

        router.route(&frame(0, vec![pointable(1, 7, 0.0)])).unwrap();
        for id in 1..=400 {
            router.route(&frame(id, vec![])).unwrap();
        }

        assert!(router.is_routing(7));
        router.finish().unwrap();
    }
}
