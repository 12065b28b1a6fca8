pub mod config;
pub mod convergence;
pub mod error;
pub mod frame;
pub mod hand;
pub mod ring_history;
pub mod router;
pub mod sink;
pub mod source;

mod sample;
mod worker;

pub use config::Config;
pub use frame::{Frame, Pointable};
pub use hand::{HandDetector, Judgment};
pub use ring_history::RingHistory;
pub use router::FrameRouter;
pub use sample::{PinchEvent, Point, Sample};
pub use sink::{PinchSink, Stats, StatsSnapshot};
pub use worker::HandWorker;

use crossbeam_channel::Receiver;
use error::Error;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A running detector: a router thread fed by a frame source, one worker per
/// hand, and a channel of detected pinches.
pub struct Pipeline {
    pinches: Receiver<PinchEvent>,
    stats: Arc<Stats>,
    router: JoinHandle<Result<(), Error>>,
}

impl Pipeline {
    /// Starts routing `frames` on a background thread.
    ///
    /// Iterating the source may block; when it ends every hand worker drains
    /// its queue and the pinch channel disconnects.
    pub fn spawn<I>(config: Config, frames: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Frame> + Send + 'static,
    {
        config.validate()?;

        let stats = Arc::new(Stats::default());
        let (sink, pinches) = PinchSink::new(config.pinch_sink_capacity, stats.clone());
        let router = FrameRouter::new(config, sink);

        let router = thread::Builder::new()
            .name("pinch-router".into())
            .spawn(move || router.run(frames))?;

        Ok(Self {
            pinches,
            stats,
            router,
        })
    }

    #[inline]
    pub fn pinches(&self) -> Receiver<PinchEvent> {
        self.pinches.clone()
    }

    #[inline]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Waits for the source to end and every worker to finish.
    pub fn join(self) -> Result<StatsSnapshot, Error> {
        self.router.join().map_err(|_| Error::RouterPanicked)??;

        Ok(self.stats.snapshot())
    }
}
