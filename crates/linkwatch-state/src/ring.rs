//! Fixed-capacity sample ring.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::types::Sample;

/// Bounded FIFO of samples, oldest first.
///
/// Storage is allocated once at construction; pushing onto a full ring
/// evicts exactly the oldest sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRing {
    buf: VecDeque<Sample>,
    capacity: NonZeroUsize,
}

impl SampleRing {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append a sample, returning the evicted one if the ring was full.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.buf.len() == self.capacity.get() {
            self.buf.pop_front()
        } else {
            None
        };
        self.buf.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Samples in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.buf.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.buf.back()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.buf.front()
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.buf.iter().copied().collect()
    }
}

impl Serialize for SampleRing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.buf.len()))?;
        for sample in &self.buf {
            seq.serialize_element(sample)?;
        }
        seq.end()
    }
}
