//! Lock-free ring buffer for PCM samples
//!
//! Hands 16-bit samples from the device callback to the capture loop

use ringbuf::{HeapRb, HeapConsumer, HeapProducer};

/// Single-producer / single-consumer PCM ring buffer
pub struct PcmRingBuffer {
    producer: HeapProducer<i16>,
    consumer: HeapConsumer<i16>,
    capacity: usize,
}

impl PcmRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<i16>::new(capacity);
        let (producer, consumer) = rb.split();

        Self {
            producer,
            consumer,
            capacity,
        }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (PcmProducer, PcmConsumer) {
        (
            PcmProducer {
                producer: self.producer,
                dropped: 0,
            },
            PcmConsumer {
                consumer: self.consumer,
                capacity: self.capacity,
            },
        )
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Producer end, owned by the device callback
pub struct PcmProducer {
    producer: HeapProducer<i16>,
    dropped: u64,
}

impl PcmProducer {
    /// Write samples, discarding whatever does not fit
    ///
    /// # Returns
    /// Number of samples actually written
    pub fn write(&mut self, samples: &[i16]) -> usize {
        let written = self.producer.push_slice(samples);
        self.dropped += (samples.len() - written) as u64;
        written
    }

    /// Total samples discarded because the consumer fell behind
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Get number of free slots
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }
}

/// Consumer end, owned by the capture loop
pub struct PcmConsumer {
    consumer: HeapConsumer<i16>,
    capacity: usize,
}

impl PcmConsumer {
    /// Read whatever is available without blocking
    ///
    /// # Returns
    /// Number of samples read (0 when the buffer is empty)
    pub fn read(&mut self, buffer: &mut [i16]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Get number of available samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_write_read() {
        let rb = PcmRingBuffer::new(1024);
        let (mut producer, mut consumer) = rb.split();

        let data = vec![1, -2, 3, -4, 5];
        assert_eq!(producer.write(&data), 5);
        assert_eq!(consumer.len(), 5);

        let mut output = vec![0; 5];
        assert_eq!(consumer.read(&mut output), 5);
        assert_eq!(output, data);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_ring_buffer_overflow_counts_dropped() {
        let rb = PcmRingBuffer::new(10);
        let (mut producer, mut consumer) = rb.split();

        let written = producer.write(&[7; 25]);
        assert!(written <= 10);
        assert_eq!(producer.dropped(), (25 - written) as u64);

        let mut output = vec![0; 25];
        assert_eq!(consumer.read(&mut output), written);
    }

    #[test]
    fn test_ring_buffer_short_read() {
        let rb = PcmRingBuffer::new(4096);
        let (mut producer, mut consumer) = rb.split();

        producer.write(&[1; 300]);
        let mut output = vec![0; 1024];

        // Partial frames come back as-is; padding is the window's job
        assert_eq!(consumer.read(&mut output), 300);
        assert_eq!(consumer.read(&mut output), 0);
    }
}
