//! Packet queue core: the empty pool and the pending set
//!
//! A `PktQueue` owns exactly `capacity` packets for its whole lifetime. They
//! circulate between two bounded FIFOs:
//!
//! - **empty pool**: packets the writer may fill
//! - **pending set**: filled packets waiting for the reader
//!
//! Access goes through the two views returned by [`PktQueue::read_part`] and
//! [`PktQueue::write_part`].

use crate::error::{QueueError, Result};
use crate::packet::Packet;
use crate::view::{PktReadQueue, PktWriteQueue};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Default number of packets owned by a queue
const DEFAULT_CAPACITY: usize = 32;

/// Queue configuration
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Number of packets allocated up front
    pub capacity: usize,
    /// Name used in log events and panic messages
    pub name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            name: "pktqueue".to_string(),
        }
    }
}

impl QueueConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// State shared by the queue and all of its views
pub(crate) struct Shared<P> {
    name: String,
    capacity: usize,
    empty_tx: Sender<P>,
    empty_rx: Receiver<P>,
    /// `None` once the writer has closed the queue
    filled_tx: Mutex<Option<Sender<P>>>,
    filled_rx: Receiver<P>,
}

impl<P> Shared<P> {
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.filled_rx.len()
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.filled_tx.lock().is_none()
    }

    /// Number of packets sitting in the empty pool
    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.empty_rx.len()
    }

    /// Block until an empty packet is available
    pub(crate) fn take_empty(&self) -> P {
        match self.empty_rx.recv() {
            Ok(pkt) => pkt,
            // empty_tx lives as long as self
            Err(_) => unreachable!("empty pool disconnected"),
        }
    }

    /// Return an empty packet to the pool
    pub(crate) fn recycle(&self, pkt: P) {
        if self.empty_tx.send(pkt).is_err() {
            unreachable!("empty pool disconnected");
        }
    }

    /// Block until a filled packet is available.
    ///
    /// Returns `None` once the queue is closed and the pending set is drained.
    pub(crate) fn recv_filled(&self) -> Option<P> {
        match self.filled_rx.recv() {
            Ok(pkt) => Some(pkt),
            Err(_) => {
                trace!(queue = %self.name, "end of stream");
                None
            }
        }
    }

    /// Panic if the writer has already closed the queue
    pub(crate) fn ensure_open(&self) {
        if self.is_closed() {
            self.violation(QueueError::SubmitAfterClose {
                name: self.name.clone(),
            });
        }
    }

    /// Block until there is room in the pending set, then append `pkt`.
    ///
    /// Panics if the queue is closed. The sender is cloned out so the lock is
    /// never held while blocking; the pending set has room for every packet
    /// the queue owns, so the send does not wait under the protocol.
    pub(crate) fn submit(&self, pkt: P) {
        let tx = self.filled_tx.lock().clone();
        let Some(tx) = tx else {
            self.violation(QueueError::SubmitAfterClose {
                name: self.name.clone(),
            });
        };
        // filled_rx lives as long as self, so the channel never disconnects
        if tx.send(pkt).is_err() {
            unreachable!("pending set disconnected");
        }
    }

    pub(crate) fn try_close(&self) -> Result<()> {
        let tx = self.filled_tx.lock().take();
        match tx {
            Some(tx) => {
                drop(tx);
                debug!(queue = %self.name, pending = self.len(), "queue closed");
                Ok(())
            }
            None => Err(QueueError::AlreadyClosed {
                name: self.name.clone(),
            }),
        }
    }

    pub(crate) fn close(&self) {
        if let Err(err) = self.try_close() {
            self.violation(err);
        }
    }

    /// Protocol violations leave the pool in an undefined state, so fail fast
    fn violation(&self, err: QueueError) -> ! {
        error!(queue = %self.name, error = %err, "queue protocol violation");
        panic!("{}", err);
    }
}

/// Bounded packet queue for one writer and one reader
pub struct PktQueue<P = Packet> {
    shared: Arc<Shared<P>>,
}

impl<P: Default> PktQueue<P> {
    /// Create a queue owning `capacity` default-initialized packets.
    ///
    /// A capacity of zero is accepted; every blocking call on such a queue
    /// waits forever.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(QueueConfig::default().with_capacity(capacity))
    }

    pub fn with_config(config: QueueConfig) -> Self {
        let capacity = config.capacity;
        let (empty_tx, empty_rx) = bounded(capacity);
        let (filled_tx, filled_rx) = bounded(capacity);

        for _ in 0..capacity {
            if empty_tx.try_send(P::default()).is_err() {
                unreachable!("empty pool sized to capacity");
            }
        }

        debug!(queue = %config.name, capacity, "queue created");

        Self {
            shared: Arc::new(Shared {
                name: config.name,
                capacity,
                empty_tx,
                empty_rx,
                filled_tx: Mutex::new(Some(filled_tx)),
                filled_rx,
            }),
        }
    }
}

impl<P> PktQueue<P> {
    /// Number of packets owned by the queue
    #[inline]
    pub fn cap(&self) -> usize {
        self.shared.capacity()
    }

    /// Number of filled packets waiting for the reader.
    ///
    /// Only a snapshot: the other side may change it right after.
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> &str {
        self.shared.name()
    }

    /// Whether the writer has closed the queue
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Reader half: obtain filled packets and hand back empty ones
    pub fn read_part(&self) -> PktReadQueue<P> {
        PktReadQueue::new(Arc::clone(&self.shared))
    }

    /// Writer half: obtain empty packets, hand back filled ones and close
    pub fn write_part(&self) -> PktWriteQueue<P> {
        PktWriteQueue::new(Arc::clone(&self.shared))
    }

    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.shared.idle()
    }
}

impl<P> Clone for PktQueue<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P> std::fmt::Debug for PktQueue<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PktQueue")
            .field("name", &self.shared.name())
            .field("cap", &self.cap())
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::PktReplacer;
    use proptest::prelude::*;
    use std::thread;

    fn tag(pkt: &mut Packet, n: u32) {
        pkt[..4].copy_from_slice(&n.to_le_bytes());
    }

    fn tag_of(pkt: &Packet) -> u32 {
        u32::from_le_bytes([pkt[0], pkt[1], pkt[2], pkt[3]])
    }

    #[test]
    fn test_new_queue_cap_len() {
        let q: PktQueue = PktQueue::new(5);
        assert_eq!(q.cap(), 5);
        assert_eq!(q.len(), 0);
        assert!(q.is_empty());
        assert_eq!(q.idle(), 5);
        assert!(!q.is_closed());

        let w = q.write_part();
        for n in 0..3 {
            let mut pkt = w.take_empty();
            tag(&mut pkt, n);
            w.submit(pkt);
        }

        assert_eq!(q.len(), 3);
        assert_eq!(q.read_part().len(), 3);
        assert_eq!(w.len(), 3);
        assert_eq!(w.cap(), 5);
        assert_eq!(q.idle(), 2);
    }

    #[test]
    fn test_config_defaults() {
        let q: PktQueue = PktQueue::with_config(QueueConfig::default());
        assert_eq!(q.cap(), DEFAULT_CAPACITY);
        assert_eq!(q.name(), "pktqueue");

        let q: PktQueue = PktQueue::with_config(
            QueueConfig::default().with_capacity(2).with_name("video"),
        );
        assert_eq!(q.cap(), 2);
        assert_eq!(q.name(), "video");
    }

    #[test]
    fn test_zero_capacity() {
        let q: PktQueue = PktQueue::new(0);
        assert_eq!(q.cap(), 0);
        assert_eq!(q.len(), 0);
        assert_eq!(q.idle(), 0);

        // Closing is still allowed and the reader sees end of stream at once
        q.write_part().close();
        assert!(q.read_part().recv_filled().is_none());
    }

    #[test]
    fn test_views_share_state() {
        let q: PktQueue = PktQueue::new(4);
        let w1 = q.write_part();
        let w2 = q.write_part();
        let r = q.read_part();

        let pkt = w1.take_empty();
        w2.submit(pkt);
        assert_eq!(r.len(), 1);
        assert_eq!(q.clone().len(), 1);

        w2.close();
        assert!(w1.is_closed());
        assert!(r.is_closed());
    }

    #[test]
    fn test_conservation_across_threads() {
        const N: usize = 4;
        const COUNT: u32 = 1000;

        let q: PktQueue = PktQueue::new(N);
        let w = q.write_part();
        let r = q.read_part();

        let producer = thread::spawn(move || {
            let mut pkt = w.take_empty();
            tag(&mut pkt, 0);
            for n in 1..COUNT {
                pkt = w.replace_pkt(pkt).unwrap();
                tag(&mut pkt, n);
            }
            w.submit(pkt);
            w.close();
        });

        let consumer = thread::spawn(move || {
            let mut seen = Vec::new();
            let Some(mut pkt) = r.recv_filled() else {
                return seen;
            };
            seen.push(tag_of(&pkt));
            loop {
                match r.replace_pkt(pkt) {
                    Ok(filled) => {
                        seen.push(tag_of(&filled));
                        pkt = filled;
                    }
                    Err(eos) => {
                        r.recycle(eos.into_inner());
                        break;
                    }
                }
            }
            seen
        });

        producer.join().unwrap();
        let seen = consumer.join().unwrap();

        assert_eq!(seen, (0..COUNT).collect::<Vec<_>>());
        // Every packet is back in the empty pool
        assert_eq!(q.idle(), N);
        assert_eq!(q.len(), 0);
    }

    proptest! {
        #[test]
        fn prop_fifo_and_conservation(cap in 1usize..8, tags in proptest::collection::vec(any::<u32>(), 0..64)) {
            let q: PktQueue = PktQueue::new(cap);
            let w = q.write_part();
            let r = q.read_part();

            let mut seen = Vec::with_capacity(tags.len());
            for chunk in tags.chunks(cap) {
                for &t in chunk {
                    let mut pkt = w.take_empty();
                    tag(&mut pkt, t);
                    w.submit(pkt);
                }
                prop_assert_eq!(q.idle() + q.len(), cap);

                while !r.is_empty() {
                    let pkt = r.recv_filled().unwrap();
                    seen.push(tag_of(&pkt));
                    prop_assert_eq!(q.idle() + q.len() + 1, cap);
                    r.recycle(pkt);
                }
            }

            prop_assert_eq!(seen, tags);
            prop_assert_eq!(q.idle(), cap);
        }
    }
}
