//! Reader and writer halves of a [`PktQueue`](crate::PktQueue)
//!
//! Both halves are handles onto the same queue state. The reader can only
//! take filled packets and hand back empty ones; the writer can only take
//! empty packets, hand back filled ones and close the stream.
//!
//! # Protocol
//!
//! Using the primitive calls directly, the reader must first take a filled
//! packet with `recv_filled` and then return a packet with `recycle`. The
//! writer must first take an empty packet with `take_empty` and then hand
//! it back with `submit`. A packet that is never returned is lost to the
//! queue for good. `replace_pkt` performs both steps in the right order.

use crate::error::{EndOfStream, Result};
use crate::packet::Packet;
use crate::queue::Shared;
use std::sync::Arc;

/// Swap one packet for another through a queue
pub trait PktReplacer<P = Packet> {
    /// Hand `pkt` to the queue and get a packet back in exchange
    fn replace_pkt(&self, pkt: P) -> std::result::Result<P, EndOfStream<P>>;
}

/// Reader half of a queue
pub struct PktReadQueue<P = Packet> {
    shared: Arc<Shared<P>>,
}

impl<P> PktReadQueue<P> {
    pub(crate) fn new(shared: Arc<Shared<P>>) -> Self {
        Self { shared }
    }

    /// Take the next filled packet, blocking while none is pending.
    ///
    /// Returns `None` once the writer has closed the queue and every pending
    /// packet has been read. The caller owns the packet and must pass it (or
    /// another packet taken from this queue) to [`recycle`](Self::recycle).
    #[inline]
    pub fn recv_filled(&self) -> Option<P> {
        self.shared.recv_filled()
    }

    /// Return an emptied packet to the pool
    #[inline]
    pub fn recycle(&self, pkt: P) {
        self.shared.recycle(pkt)
    }

    /// Iterate over filled packets until end of stream.
    ///
    /// Each yielded packet still has to be recycled.
    pub fn iter(&self) -> Iter<'_, P> {
        Iter { queue: self }
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.shared.capacity()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl<P> PktReplacer<P> for PktReadQueue<P> {
    /// Take the next filled packet, then recycle `pkt`.
    ///
    /// At end of stream `pkt` is not recycled and comes back inside the
    /// error.
    fn replace_pkt(&self, pkt: P) -> std::result::Result<P, EndOfStream<P>> {
        match self.shared.recv_filled() {
            Some(filled) => {
                self.shared.recycle(pkt);
                Ok(filled)
            }
            None => Err(EndOfStream(pkt)),
        }
    }
}

impl<P> Clone for PktReadQueue<P> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.shared))
    }
}

/// Blocking iterator over filled packets, see [`PktReadQueue::iter`]
pub struct Iter<'a, P> {
    queue: &'a PktReadQueue<P>,
}

impl<P> Iterator for Iter<'_, P> {
    type Item = P;

    fn next(&mut self) -> Option<P> {
        self.queue.recv_filled()
    }
}

/// Writer half of a queue
pub struct PktWriteQueue<P = Packet> {
    shared: Arc<Shared<P>>,
}

impl<P> PktWriteQueue<P> {
    pub(crate) fn new(shared: Arc<Shared<P>>) -> Self {
        Self { shared }
    }

    /// Take an empty packet, blocking while the reader holds all of them
    #[inline]
    pub fn take_empty(&self) -> P {
        self.shared.take_empty()
    }

    /// Append a filled packet to the pending set.
    ///
    /// # Panics
    /// If the queue was already closed.
    #[inline]
    pub fn submit(&self, pkt: P) {
        self.shared.submit(pkt)
    }

    /// Close the stream.
    ///
    /// Packets already pending stay readable; after they are drained the
    /// reader sees end of stream.
    ///
    /// # Panics
    /// If the queue was already closed. Use [`try_close`](Self::try_close)
    /// to get an error instead.
    pub fn close(&self) {
        self.shared.close()
    }

    /// Close the stream, reporting a double close as an error
    pub fn try_close(&self) -> Result<()> {
        self.shared.try_close()
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.shared.capacity()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl<P> PktReplacer<P> for PktWriteQueue<P> {
    /// Take an empty packet, then submit `pkt`. Never returns an error.
    ///
    /// # Panics
    /// If the queue was already closed.
    fn replace_pkt(&self, pkt: P) -> std::result::Result<P, EndOfStream<P>> {
        self.shared.ensure_open();
        let empty = self.shared.take_empty();
        // A close from another handle may have landed while blocked above
        self.shared.submit(pkt);
        Ok(empty)
    }
}

impl<P> Clone for PktWriteQueue<P> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.shared))
    }
}
