//! Live harmonic monitor
//!
//! Runs capture and analysis on a dedicated Rust thread; callers only read the
//! latest published result.

use super::analysis_loop::{AnalysisLoop, AnalysisOutput, LoopReport, ShutdownSignal};
use super::mailbox::Mailbox;
use crate::audio::input::list_input_devices;
use crate::audio::{AudioDeviceInfo, CaptureOptions, CpalFrameSource};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, CaptureError};
use log::{info, warn};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Live capture + analysis running in the background
pub struct HarmonicMonitor {
    config: AnalysisConfig,

    /// Input device name (`None` = default input)
    device_name: Option<String>,

    /// Acquisition timeout override
    timeout: Option<Duration>,

    /// Latest analysis output
    results: Mailbox<AnalysisOutput>,

    shutdown: ShutdownSignal,

    /// Processing thread handle
    process_thread: Option<JoinHandle<Result<LoopReport, AnalysisError>>>,

    device_info: Option<AudioDeviceInfo>,
}

impl HarmonicMonitor {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            device_name: None,
            timeout: None,
            results: Mailbox::new(),
            shutdown: ShutdownSignal::new(),
            process_thread: None,
            device_info: None,
        }
    }

    /// Capture from a named input device instead of the default
    pub fn with_device(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Open the device and start the analysis thread
    ///
    /// The capture stream is created on the analysis thread and dropped there
    /// when the loop stops. Startup failures (bad config, missing device,
    /// unsupported rate) are returned here rather than from the thread.
    pub fn start(&mut self) -> Result<AudioDeviceInfo, AnalysisError> {
        if let (true, Some(info)) = (self.is_running(), &self.device_info) {
            return Ok(info.clone());
        }
        self.stop();

        self.config.validate()?;

        let options = CaptureOptions {
            device_name: self.device_name.clone(),
            sample_rate: Some(self.config.sample_rate.round() as u32),
            frame_size: self.config.frame_size,
            timeout: self.timeout,
        };

        self.shutdown = ShutdownSignal::new();
        let shutdown = self.shutdown.clone();
        let results = self.results.clone();
        let config = self.config.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let source = match CpalFrameSource::open(&options) {
                Ok(source) => source,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.clone()));
                    return Err(AnalysisError::from(e));
                }
            };
            let _ = ready_tx.send(Ok(source.device_info().clone()));

            let mut analysis_loop = AnalysisLoop::new(source, config, results, shutdown)?;
            analysis_loop.run()
        });

        let device_info = match ready_rx.recv() {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e.into());
            }
            Err(_) => {
                return Err(match handle.join() {
                    Ok(Err(e)) => e,
                    _ => AnalysisError::ThreadPanicked,
                });
            }
        };

        info!("Harmonic monitor started on '{}'", device_info.name);
        self.device_info = Some(device_info.clone());
        self.process_thread = Some(handle);

        Ok(device_info)
    }

    /// Signal the loop to stop and wait for it to release the device
    ///
    /// Returns the loop outcome, or `None` when nothing was running.
    pub fn stop(&mut self) -> Option<Result<LoopReport, AnalysisError>> {
        let handle = self.process_thread.take()?;
        self.shutdown.trigger();
        self.device_info = None;

        let outcome = handle.join().unwrap_or(Err(AnalysisError::ThreadPanicked));
        match &outcome {
            Ok(report) => info!("Harmonic monitor stopped ({} frames)", report.frames_processed),
            Err(e) => warn!("Harmonic monitor stopped with error: {}", e),
        }
        Some(outcome)
    }

    /// Whether the analysis thread is still alive
    ///
    /// Turns false on its own if the device disappears.
    pub fn is_running(&self) -> bool {
        self.process_thread
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Take the latest result, if one arrived since the last call
    pub fn get_results(&self) -> Option<AnalysisOutput> {
        self.results.take()
    }

    /// Handle for consumers polling from another thread
    pub fn results(&self) -> Mailbox<AnalysisOutput> {
        self.results.clone()
    }

    pub fn device_info(&self) -> Option<&AudioDeviceInfo> {
        self.device_info.as_ref()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// List available input device names
    pub fn list_devices() -> Result<Vec<String>, CaptureError> {
        list_input_devices().map(|devices| devices.into_iter().map(|d| d.name).collect())
    }
}

impl Drop for HarmonicMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_monitor() {
        let mut monitor = HarmonicMonitor::new(AnalysisConfig::default());
        assert!(!monitor.is_running());
        assert!(monitor.get_results().is_none());
        assert!(monitor.stop().is_none());
        assert!(monitor.device_info().is_none());
    }

    #[test]
    fn test_invalid_config_rejected_at_start() {
        let config = AnalysisConfig {
            frame_size: 1000,
            ..AnalysisConfig::default()
        };
        let mut monitor = HarmonicMonitor::new(config);
        assert!(matches!(monitor.start(), Err(AnalysisError::Spectrum(_))));
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_missing_device_fails_to_start() {
        let mut monitor =
            HarmonicMonitor::new(AnalysisConfig::default()).with_device("no-such-device-3f9c");
        assert!(matches!(
            monitor.start(),
            Err(AnalysisError::Capture(CaptureError::DeviceUnavailable(_)))
        ));
        assert!(!monitor.is_running());
    }
}
