use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::Config;
use crate::error::Error;
use crate::hand::{HandDetector, Judgment};
use crate::sample::Sample;
use crate::sink::PinchSink;

#[derive(Debug, Clone, Copy)]
pub(crate) enum HandMessage {
    Sample(Sample),
    FingerDisappeared { now: u64 },
}

/// Handle to the thread owning one hand's detector.
///
/// The inbound queue is unbounded so the router never waits on a busy hand.
/// Dropping the handle closes the queue; the worker drains what is left and
/// exits.
#[derive(Debug)]
pub struct HandWorker {
    hand_id: i32,
    tx: Sender<HandMessage>,
    handle: JoinHandle<()>,
    pub(crate) last_seen: u64,
}

impl HandWorker {
    pub fn spawn(hand_id: i32, config: &Config, sink: PinchSink) -> Result<Self, Error> {
        let (tx, rx) = unbounded();
        let detector = HandDetector::new(hand_id, config);

        let handle = thread::Builder::new()
            .name(format!("pinch-hand-{}", hand_id))
            .spawn(move || run(detector, rx, sink))?;

        tracing::info!("hand {}: worker started", hand_id);

        Ok(Self {
            hand_id,
            tx,
            handle,
            last_seen: 0,
        })
    }

    #[inline]
    pub fn hand_id(&self) -> i32 {
        self.hand_id
    }

    pub fn send_sample(&self, sample: Sample) {
        self.send(HandMessage::Sample(sample));
    }

    pub fn signal_disappeared(&self, now: u64) {
        self.send(HandMessage::FingerDisappeared { now });
    }

    fn send(&self, msg: HandMessage) {
        if self.tx.send(msg).is_err() {
            tracing::warn!("hand {}: worker is gone, message lost", self.hand_id);
        }
    }

    /// Closes the queue without waiting; the worker exits once it has
    /// processed everything already queued.
    pub(crate) fn close(self) -> (i32, JoinHandle<()>) {
        let Self {
            hand_id, tx, handle, ..
        } = self;
        drop(tx);

        (hand_id, handle)
    }

    /// Closes the queue and waits until every queued message is processed.
    pub fn join(self) -> Result<(), Error> {
        let (hand_id, handle) = self.close();

        handle
            .join()
            .map_err(|_| Error::WorkerPanicked { hand_id })
    }
}

fn run(mut detector: HandDetector, rx: Receiver<HandMessage>, sink: PinchSink) {
    for msg in rx.iter() {
        match msg {
            HandMessage::Sample(sample) => detector.on_sample(sample),
            HandMessage::FingerDisappeared { now } => {
                if let Judgment::Pinch(ev) = detector.on_finger_disappeared(now) {
                    sink.publish(ev);
                }
            }
        }
    }

    tracing::info!(
        "hand {}: worker stopped with {} tracked fingers",
        detector.hand_id,
        detector.len()
    );
}
