//! Error types for PktQueue

use thiserror::Error;

/// Result type for PktQueue operations
pub type Result<T> = std::result::Result<T, QueueError>;

/// Protocol violations on the write side of a queue
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// `close` was called on a queue that is already closed
    #[error("Queue '{name}' is already closed")]
    AlreadyClosed { name: String },

    /// A filled packet was submitted after the queue was closed
    #[error("Packet submitted to closed queue '{name}'")]
    SubmitAfterClose { name: String },
}

/// End of stream observed by the reader.
///
/// Carries back the empty packet that was handed to `replace_pkt`; it was not
/// recycled and still belongs to the caller.
#[derive(Debug, Error)]
#[error("End of stream")]
pub struct EndOfStream<P>(pub P);

impl<P> EndOfStream<P> {
    /// Take back the packet that was not consumed
    pub fn into_inner(self) -> P {
        self.0
    }
}
