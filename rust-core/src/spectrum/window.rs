//! Sliding analysis window with a single frame of history

use super::{FRAME_SIZE, WINDOW_SIZE};

/// One frame of mono samples, always exactly `FRAME_SIZE` long
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    samples: Vec<f64>,
}

impl Frame {
    /// All-zero frame
    pub fn silent() -> Self {
        Self {
            samples: vec![0.0; FRAME_SIZE],
        }
    }

    /// Build a frame from PCM, zero-filling a short read and ignoring excess
    pub fn from_pcm(pcm: &[i16]) -> Self {
        let mut frame = Self::silent();
        frame.fill_from_pcm(pcm);
        frame
    }

    /// Overwrite this frame in place (no allocation)
    pub fn fill_from_pcm(&mut self, pcm: &[i16]) {
        let valid = pcm.len().min(FRAME_SIZE);
        for (dst, &src) in self.samples[..valid].iter_mut().zip(pcm) {
            *dst = src as f64;
        }
        self.samples[valid..].fill(0.0);
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::silent()
    }
}

/// Holds the previous frame and assembles `[previous | current]` windows
pub struct WindowBuffer {
    previous: Frame,
    window: Vec<f64>,
}

impl WindowBuffer {
    pub fn new() -> Self {
        Self {
            previous: Frame::silent(),
            window: vec![0.0; WINDOW_SIZE],
        }
    }

    /// Assemble the analysis window for `current` and retain it as history
    ///
    /// # Returns
    /// The `WINDOW_SIZE` window, ready to be transformed in place. Its
    /// contents are only meaningful until the next call.
    pub fn assemble(&mut self, current: &Frame) -> &mut [f64] {
        let (head, tail) = self.window.split_at_mut(FRAME_SIZE);
        head.copy_from_slice(&self.previous.samples);
        tail.copy_from_slice(&current.samples);
        self.previous.samples.copy_from_slice(&current.samples);
        &mut self.window
    }

    /// Frame that will occupy the first half of the next window
    pub fn previous(&self) -> &Frame {
        &self.previous
    }

    /// Forget history so the next window starts from silence
    pub fn reset(&mut self) {
        self.previous.samples.fill(0.0);
        self.window.fill(0.0);
    }

    pub fn is_reset(&self) -> bool {
        self.previous.is_silent()
    }
}

impl Default for WindowBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: i16) -> Vec<i16> {
        (0..FRAME_SIZE as i16).map(|i| start.wrapping_add(i)).collect()
    }

    #[test]
    fn test_first_window_starts_with_silence() {
        let mut buffer = WindowBuffer::new();
        let current = Frame::from_pcm(&ramp(1));

        let window = buffer.assemble(&current);

        assert_eq!(window.len(), WINDOW_SIZE);
        assert!(window[..FRAME_SIZE].iter().all(|&s| s == 0.0));
        assert_eq!(&window[FRAME_SIZE..], current.samples());
    }

    #[test]
    fn test_window_lags_by_one_frame() {
        let mut buffer = WindowBuffer::new();
        let frames: Vec<Frame> = (0..4).map(|k| Frame::from_pcm(&ramp(k * 100))).collect();

        buffer.assemble(&frames[0]);
        for k in 1..frames.len() {
            let window = buffer.assemble(&frames[k]).to_vec();
            assert_eq!(&window[..FRAME_SIZE], frames[k - 1].samples());
            assert_eq!(&window[FRAME_SIZE..], frames[k].samples());
        }
        assert_eq!(buffer.previous(), &frames[3]);
    }

    #[test]
    fn test_short_read_is_zero_filled() {
        let frame = Frame::from_pcm(&[5; 300]);

        assert!(frame.samples()[..300].iter().all(|&s| s == 5.0));
        assert!(frame.samples()[300..].iter().all(|&s| s == 0.0));
        assert_eq!(frame.samples().len(), FRAME_SIZE);
    }

    #[test]
    fn test_refill_clears_stale_tail() {
        let mut frame = Frame::from_pcm(&[9; FRAME_SIZE]);
        frame.fill_from_pcm(&[3; 10]);

        assert_eq!(frame.samples()[9], 3.0);
        assert_eq!(frame.samples()[10], 0.0);
        assert_eq!(frame.samples()[FRAME_SIZE - 1], 0.0);
    }

    #[test]
    fn test_oversized_read_is_truncated() {
        let frame = Frame::from_pcm(&vec![1; FRAME_SIZE + 50]);
        assert_eq!(frame.samples().len(), FRAME_SIZE);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut buffer = WindowBuffer::new();
        buffer.assemble(&Frame::from_pcm(&ramp(7)));
        assert!(!buffer.is_reset());

        buffer.reset();
        assert!(buffer.is_reset());

        let current = Frame::from_pcm(&ramp(1));
        let window = buffer.assemble(&current);
        assert!(window[..FRAME_SIZE].iter().all(|&s| s == 0.0));
    }
}
