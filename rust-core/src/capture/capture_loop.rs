//! Real-time capture loop
//!
//! One tick = one read, and for a non-empty read one transform, one
//! aggregate/normalize and one emit. The loop sleeps a fixed pacing interval
//! after every tick and checks the running flag only between ticks.

use crate::audio::{SampleSource, SourceError};
use crate::relay::Emitter;
use crate::spectrum::{BandAnalyzer, BandLevels, Frame, FRAME_SIZE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Default sleep between ticks
pub const DEFAULT_PACING: Duration = Duration::from_millis(5);

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A frame was analyzed and emitted
    Emitted(BandLevels),
    /// The source had nothing this tick
    NoData,
    /// The read failed but the session continues
    Skipped(SourceError),
    /// The session must end
    Fatal(SourceError),
}

/// What the loop hands back when it exits
pub struct LoopExit {
    /// Analyzer with its window history already reset
    pub analyzer: BandAnalyzer,
    pub error: Option<SourceError>,
    pub emitted: u64,
}

pub struct CaptureLoop {
    source: Box<dyn SampleSource>,
    analyzer: BandAnalyzer,
    emitter: Emitter,
    pcm: Vec<i16>,
    frame: Frame,
    pacing: Duration,
    emitted: u64,
}

impl CaptureLoop {
    pub fn new(
        source: Box<dyn SampleSource>,
        analyzer: BandAnalyzer,
        emitter: Emitter,
        pacing: Duration,
    ) -> Self {
        Self {
            source,
            analyzer,
            emitter,
            pcm: vec![0; FRAME_SIZE],
            frame: Frame::silent(),
            pacing,
            emitted: 0,
        }
    }

    /// Run one tick without pacing
    pub fn tick(&mut self) -> TickOutcome {
        match self.source.read(&mut self.pcm) {
            Ok(0) => TickOutcome::NoData,
            Ok(n) => {
                let n = n.min(self.pcm.len());
                self.frame.fill_from_pcm(&self.pcm[..n]);
                let levels = self.analyzer.process(&self.frame);
                self.emitter.emit(levels);
                self.emitted += 1;
                TickOutcome::Emitted(levels)
            }
            Err(e) if e.is_fatal() => TickOutcome::Fatal(e),
            Err(e) => {
                log::debug!("Skipping tick: {}", e);
                TickOutcome::Skipped(e)
            }
        }
    }

    /// Tick until `running` clears or the source fails fatally
    ///
    /// The source is released and the window history reset before returning.
    pub fn run(mut self, running: &AtomicBool) -> LoopExit {
        let mut error = None;

        while running.load(Ordering::SeqCst) {
            if let TickOutcome::Fatal(e) = self.tick() {
                error = Some(e);
                break;
            }
            std::thread::sleep(self.pacing);
        }

        log::info!(
            "Capture loop exiting after {} frames ({} datagrams sent, {} dropped)",
            self.emitted,
            self.emitter.sent(),
            self.emitter.dropped()
        );

        let CaptureLoop {
            source,
            mut analyzer,
            emitted,
            ..
        } = self;
        drop(source);
        analyzer.reset();

        LoopExit {
            analyzer,
            error,
            emitted,
        }
    }

    pub fn analyzer(&self) -> &BandAnalyzer {
        &self.analyzer
    }
}
