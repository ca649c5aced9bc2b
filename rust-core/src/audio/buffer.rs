//! Lock-free ring buffer for captured samples
//!
//! Single-producer single-consumer buffer between the device callback and the
//! analysis loop.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Capture ring buffer holding 8-bit samples
pub struct AudioRingBuffer {
    producer: HeapProducer<u8>,
    consumer: HeapConsumer<u8>,
}

impl AudioRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<u8>::new(capacity);
        let (producer, consumer) = rb.split();

        Self { producer, consumer }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        let dropped = Arc::new(AtomicU64::new(0));
        (
            AudioProducer {
                producer: self.producer,
                dropped: Arc::clone(&dropped),
            },
            AudioConsumer {
                consumer: self.consumer,
                dropped,
            },
        )
    }
}

/// Producer end (owned by the device callback)
pub struct AudioProducer {
    producer: HeapProducer<u8>,
    dropped: Arc<AtomicU64>,
}

impl AudioProducer {
    /// Write samples to buffer
    ///
    /// # Returns
    /// Number of samples actually written (less when the buffer is full)
    pub fn write(&mut self, samples: &[u8]) -> usize {
        let written = self.producer.push_slice(samples);
        if written < samples.len() {
            self.dropped.fetch_add((samples.len() - written) as u64, Ordering::Relaxed);
        }
        written
    }
}

/// Consumer end (owned by the analysis loop)
pub struct AudioConsumer {
    consumer: HeapConsumer<u8>,
    dropped: Arc<AtomicU64>,
}

impl AudioConsumer {
    /// Fill `buffer` with the most recent `buffer.len()` samples
    ///
    /// Older backlog is discarded so a slow reader never falls further behind
    /// than one frame. Nothing is consumed and `false` is returned when fewer
    /// than `buffer.len()` samples are available.
    pub fn read_latest(&mut self, buffer: &mut [u8]) -> bool {
        let available = self.consumer.len();
        if available < buffer.len() {
            return false;
        }

        self.consumer.skip(available - buffer.len());
        self.consumer.pop_slice(buffer) == buffer.len()
    }

    /// Samples the producer had to discard because the buffer was full
    pub fn overruns(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Discard everything currently buffered
    pub fn clear(&mut self) -> usize {
        let n = self.consumer.len();
        self.consumer.skip(n)
    }
}
