use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("index {index} is out of range for a history of {len} samples")]
    OutOfRange { index: usize, len: usize },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("worker for hand {hand_id} panicked")]
    WorkerPanicked { hand_id: i32 },

    #[error("router thread panicked")]
    RouterPanicked,
}
