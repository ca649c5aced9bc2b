//! Running/Stopped analysis loop
//!
//! Pulls one frame per cycle, analyzes it and publishes the result to a
//! single-slot mailbox. The shutdown signal is checked between cycles, never
//! mid-computation.

use super::mailbox::Mailbox;
use crate::audio::{Frame, FrameSource};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::spectrum::HarmonicAnalyzer;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything a consumer needs to draw one analysis cycle
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// 0-based cycle number; gaps mean the consumer skipped updates
    pub sequence: u64,

    /// Bin frequencies in Hz, shared by every output of this configuration
    pub frequency_axis: Arc<[f64]>,

    /// Normalized magnitudes, one per axis entry
    pub magnitudes: Vec<f64>,

    /// Raw frame the spectrum was derived from
    pub waveform: Frame,

    /// Refined dominant frequency in Hz (0 when none was detected)
    pub harmonic_hz: f64,

    /// Magnitude of the coarse peak bin
    pub peak_magnitude: f64,
}

/// Cloneable stop request observed by the loop between cycles
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Counters returned when the loop stops cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopReport {
    pub frames_processed: u64,
    pub timeouts: u64,
}

/// Frame-by-frame analysis driver
pub struct AnalysisLoop<S: FrameSource> {
    source: S,
    analyzer: HarmonicAnalyzer,
    mailbox: Mailbox<AnalysisOutput>,
    shutdown: ShutdownSignal,
    state: LoopState,
    max_frames: Option<u64>,
    report: LoopReport,
}

impl<S: FrameSource> AnalysisLoop<S> {
    /// Build a loop in the Running state
    ///
    /// Configuration errors surface here, before any frame is pulled.
    pub fn new(
        source: S,
        config: AnalysisConfig,
        mailbox: Mailbox<AnalysisOutput>,
        shutdown: ShutdownSignal,
    ) -> Result<Self, AnalysisError> {
        let analyzer = HarmonicAnalyzer::new(config)?;

        Ok(Self {
            source,
            analyzer,
            mailbox,
            shutdown,
            state: LoopState::Running,
            max_frames: None,
            report: LoopReport::default(),
        })
    }

    /// Stop on its own after `frames` successfully analyzed frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn report(&self) -> LoopReport {
        self.report
    }

    pub fn analyzer(&self) -> &HarmonicAnalyzer {
        &self.analyzer
    }

    /// Run cycles until shutdown, the frame limit, or a fatal error
    ///
    /// The source is released before this returns, whatever the outcome.
    pub fn run(&mut self) -> Result<LoopReport, AnalysisError> {
        info!(
            "Analysis loop running: {} Hz, {} samples/frame, {} window",
            self.analyzer.config().sample_rate,
            self.analyzer.config().frame_size,
            self.analyzer.config().window
        );

        while self.step()? == LoopState::Running {}

        info!(
            "Analysis loop stopped after {} frame(s), {} timeout(s)",
            self.report.frames_processed, self.report.timeouts
        );
        Ok(self.report)
    }

    /// Execute one acquire → analyze → publish cycle
    pub fn step(&mut self) -> Result<LoopState, AnalysisError> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }

        let limit_reached = self
            .max_frames
            .map_or(false, |max| self.report.frames_processed >= max);
        if self.shutdown.is_triggered() || limit_reached {
            self.stop();
            return Ok(LoopState::Stopped);
        }

        let frame_size = self.analyzer.config().frame_size;
        let frame = match self.source.acquire_frame(frame_size) {
            Ok(frame) if frame.len() == frame_size => frame,
            Ok(frame) => {
                // Incomplete frames are never analyzed
                warn!("Discarding frame of {} samples (expected {})", frame.len(), frame_size);
                self.report.timeouts += 1;
                return Ok(LoopState::Running);
            }
            Err(e) if e.is_recoverable() => {
                warn!("{}; retrying next cycle", e);
                self.report.timeouts += 1;
                return Ok(LoopState::Running);
            }
            Err(e) => return Err(self.fail(e.into())),
        };

        let analysis = match self.analyzer.analyze(&frame) {
            Ok(analysis) => analysis,
            Err(e) => return Err(self.fail(e.into())),
        };

        let sequence = self.report.frames_processed;
        debug!(
            "Frame {}: harmonic {:.2} Hz (bin {}, magnitude {:.4})",
            sequence, analysis.peak.frequency_hz, analysis.peak.bin, analysis.peak.magnitude
        );

        self.mailbox.publish(AnalysisOutput {
            sequence,
            frequency_axis: self.analyzer.frequency_axis().shared(),
            magnitudes: analysis.magnitudes,
            waveform: frame,
            harmonic_hz: analysis.peak.frequency_hz,
            peak_magnitude: analysis.peak.magnitude,
        });
        self.report.frames_processed += 1;

        Ok(LoopState::Running)
    }

    fn fail(&mut self, err: AnalysisError) -> AnalysisError {
        warn!("Analysis loop stopping: {}", err);
        self.stop();
        err
    }

    fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.source.release();
            self.state = LoopState::Stopped;
        }
    }
}
