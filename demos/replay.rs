use std::io::BufReader;

use pinchtrack::source::JsonLinesSource;
use pinchtrack::{Config, Pipeline};
use tracing::info;

fn main() -> Result<(), pinchtrack::error::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinchtrack=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let recording = args.next();
    let config = match args.next() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let pipeline = match recording.as_deref() {
        Some("-") | None => {
            info!("replaying frames from stdin");
            let source = JsonLinesSource::new(BufReader::new(std::io::stdin()));
            Pipeline::spawn(config, source)?
        }
        Some(path) => {
            info!("replaying frames from {}", path);
            let source = JsonLinesSource::new(BufReader::new(std::fs::File::open(path)?));
            Pipeline::spawn(config, source)?
        }
    };

    for ev in pipeline.pinches().iter() {
        println!(
            "{} hand={} x={:.2} y={:.2} z={:.2}",
            ev.timestamp, ev.hand_id, ev.point.pos.x, ev.point.pos.y, ev.point.pos.z
        );
    }

    let stats = pipeline.join()?;
    info!(
        "{} frames, {} samples, {} pinches ({} dropped)",
        stats.frames, stats.samples, stats.pinches, stats.dropped_pinches
    );

    Ok(())
}
