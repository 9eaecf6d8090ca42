//! Fixed-size packet buffer circulated by the queue

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Size of a single packet in bytes (one MPEG-TS packet)
pub const PKT_SIZE: usize = 188;

/// Number of leading bytes shown by `Debug`
const DEBUG_PREFIX: usize = 8;

/// Heap-allocated fixed-size packet buffer.
///
/// The queue never looks at the payload; it only moves the box around.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet(Box<[u8; PKT_SIZE]>);

impl Packet {
    /// Allocate a zeroed packet
    pub fn new() -> Self {
        Self(Box::new([0u8; PKT_SIZE]))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; PKT_SIZE] {
        &self.0
    }

    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8; PKT_SIZE] {
        &mut self.0
    }

    /// Zero the payload
    #[inline]
    pub fn clear(&mut self) {
        self.0.fill(0);
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Packet {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl DerefMut for Packet {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0[..]
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &PKT_SIZE)
            .field("head", &&self.0[..DEBUG_PREFIX])
            .finish()
    }
}
