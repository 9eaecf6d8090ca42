//! PktQueue - bounded packet queue with buffer recycling
//!
//! A queue owns a fixed number of packet buffers that circulate between one
//! writer and one reader. Nothing is allocated after construction.
//!
//! # Architecture
//!
//! - **Empty pool**: packets available to the writer for filling
//! - **Pending set**: filled packets waiting for the reader, in FIFO order
//! - **Read part / write part**: two restricted handles onto the same queue
//!
//! The writer blocks when the reader holds every packet; this is the only
//! backpressure and bounds memory to the queue capacity.
//!
//! # Example
//!
//! ```
//! use pktqueue::{PktQueue, PktReplacer};
//! use std::thread;
//!
//! let q: PktQueue = PktQueue::new(4);
//! let (r, w) = (q.read_part(), q.write_part());
//!
//! let writer = thread::spawn(move || {
//!     for n in 0..10u8 {
//!         let mut pkt = w.take_empty();
//!         pkt[0] = n;
//!         w.submit(pkt);
//!     }
//!     w.close();
//! });
//!
//! let mut pkt = r.recv_filled().unwrap();
//! let mut count = 1;
//! while let Ok(next) = r.replace_pkt(pkt) {
//!     pkt = next;
//!     count += 1;
//! }
//! assert_eq!(count, 10);
//! writer.join().unwrap();
//! ```

pub mod error;
pub mod packet;
pub mod queue;
pub mod view;

pub use error::{EndOfStream, QueueError, Result};
pub use packet::{Packet, PKT_SIZE};
pub use queue::{PktQueue, QueueConfig};
pub use view::{Iter, PktReadQueue, PktReplacer, PktWriteQueue};
