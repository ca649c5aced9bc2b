//! End-to-end checks of the window → transform → estimate pipeline

use approx::assert_abs_diff_eq;
use harmonic_scope::audio::{Frame, FrameSource, ToneSource};
use harmonic_scope::engine::{AnalysisLoop, LoopState, Mailbox, ShutdownSignal};
use harmonic_scope::spectrum::{HarmonicAnalyzer, SpectralTransformer, Windower};
use harmonic_scope::{AnalysisConfig, WindowType};

fn config(sample_rate: f64, frame_size: usize) -> AnalysisConfig {
    AnalysisConfig {
        sample_rate,
        frame_size,
        ..AnalysisConfig::default()
    }
}

/// Deterministic pseudo-noise frame
fn noise_frame(len: usize, seed: u32) -> Frame {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let samples = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    Frame::new(samples)
}

#[test]
fn spectrum_has_half_length_and_zero_dc() {
    for exp in 2..=13 {
        let n = 1usize << exp;
        let mut analyzer = HarmonicAnalyzer::new(config(44100.0, n)).unwrap();
        let result = analyzer.analyze(&noise_frame(n, exp)).unwrap();

        assert_eq!(result.magnitudes.len(), n / 2);
        assert_eq!(result.magnitudes[0], 0.0);
        assert!(result.harmonic_hz() >= 0.0);
    }
}

#[test]
fn a440_is_resolved_below_bin_width() {
    let mut analyzer = HarmonicAnalyzer::new(config(44100.0, 4096)).unwrap();
    let frame = ToneSource::sine(44100.0, 440.0, 0.8).acquire_frame(4096).unwrap();

    let estimate = analyzer.analyze(&frame).unwrap().harmonic_hz();
    assert!((429.0..=451.0).contains(&estimate), "estimate {}", estimate);

    // Much closer than the 10.8 Hz bin spacing
    assert_abs_diff_eq!(estimate, 440.0, epsilon = 44100.0 / 4096.0 / 4.0);
}

#[test]
fn off_bin_tones_are_refined() {
    let mut analyzer = HarmonicAnalyzer::new(config(48000.0, 2048)).unwrap();
    let bin_width: f64 = 48000.0 / 2048.0;

    for &freq in &[97.0, 261.63, 1000.0, 3333.3, 7919.0] {
        let frame = ToneSource::sine(48000.0, freq, 0.7).acquire_frame(2048).unwrap();
        let estimate = analyzer.analyze(&frame).unwrap().harmonic_hz();
        assert!(
            (estimate - freq).abs() < bin_width / 4.0,
            "{} Hz estimated as {}",
            freq,
            estimate
        );
    }
}

#[test]
fn silence_yields_zero_everywhere() {
    let frame = Frame::silence(2048);

    let windowed = Windower::new(WindowType::Hann, 2048).apply(&frame).unwrap();
    assert!(windowed.iter().all(|&x| x == 0.0));

    let mut transformer = SpectralTransformer::new(2048, 128.0).unwrap();
    let magnitudes = transformer.magnitude_spectrum(&windowed).unwrap();
    assert!(magnitudes.iter().all(|&m| m == 0.0));

    let mut analyzer = HarmonicAnalyzer::new(AnalysisConfig::default()).unwrap();
    assert_eq!(analyzer.analyze(&frame).unwrap().harmonic_hz(), 0.0);
}

#[test]
fn dominant_of_two_tones_wins() {
    let mut analyzer = HarmonicAnalyzer::new(config(44100.0, 4096)).unwrap();
    let frame = ToneSource::new(44100.0)
        .with_partial(440.0, 0.5)
        .with_partial(1250.0, 0.25)
        .acquire_frame(4096)
        .unwrap();

    let result = analyzer.analyze(&frame).unwrap();
    let bin_width: f64 = 44100.0 / 4096.0;

    assert_eq!(result.peak.bin, (440.0 / bin_width).round() as usize);
    let estimate = result.harmonic_hz();
    assert!((estimate - 440.0).abs() < (estimate - 1250.0).abs());
    assert!((estimate - 440.0).abs() < bin_width / 4.0);
}

#[test]
fn identical_frames_give_identical_results() {
    let frame = ToneSource::new(44100.0)
        .with_partial(523.25, 0.6)
        .with_partial(80.0, 0.2)
        .acquire_frame(2048)
        .unwrap();

    let mut analyzer = HarmonicAnalyzer::new(AnalysisConfig::default()).unwrap();
    let first = analyzer.analyze(&frame).unwrap();
    let second = analyzer.analyze(&frame).unwrap();

    let mut fresh = HarmonicAnalyzer::new(AnalysisConfig::default()).unwrap();
    let third = fresh.analyze(&frame).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(first.harmonic_hz().to_bits(), third.harmonic_hz().to_bits());
}

#[test]
fn peak_in_last_bin_reports_bin_frequency() {
    // 8 kHz / 256 => 31.25 Hz bins, last searchable bin 127 at 3968.75 Hz
    let cfg = config(8000.0, 256);
    let mut analyzer = HarmonicAnalyzer::new(cfg).unwrap();
    let frame = ToneSource::sine(8000.0, 3968.75, 0.8).acquire_frame(256).unwrap();

    let result = analyzer.analyze(&frame).unwrap();
    assert_eq!(result.peak.bin, 127);
    assert_eq!(result.harmonic_hz(), 3968.75);
}

#[test]
fn empty_band_reports_zero() {
    let cfg = AnalysisConfig {
        min_frequency_hz: 30000.0,
        ..config(44100.0, 1024)
    };
    let mut analyzer = HarmonicAnalyzer::new(cfg).unwrap();
    let frame = ToneSource::sine(44100.0, 440.0, 0.8).acquire_frame(1024).unwrap();

    let result = analyzer.analyze(&frame).unwrap();
    assert_eq!(result.peak.bin, 0);
    assert_eq!(result.harmonic_hz(), 0.0);
}

#[test]
fn impulse_frame_is_handled() {
    // Flat spectrum: no clear peak, must still give a finite non-negative value
    let mut samples = vec![128u8; 1024];
    samples[512] = 200;
    let mut analyzer = HarmonicAnalyzer::new(config(44100.0, 1024)).unwrap();

    let estimate = analyzer.analyze(&Frame::new(samples)).unwrap().harmonic_hz();
    assert!(estimate.is_finite());
    assert!(estimate >= 0.0);
}

#[test]
fn loop_publishes_latest_tone_estimate() {
    let mailbox = Mailbox::new();
    let source = ToneSource::sine(44100.0, 880.0, 0.8);

    let mut analysis_loop = AnalysisLoop::new(
        source,
        AnalysisConfig::default(),
        mailbox.clone(),
        ShutdownSignal::new(),
    )
    .unwrap()
    .with_max_frames(5);

    let report = analysis_loop.run().unwrap();
    assert_eq!(report.frames_processed, 5);
    assert_eq!(report.timeouts, 0);
    assert_eq!(analysis_loop.state(), LoopState::Stopped);

    let output = mailbox.take().unwrap();
    assert_eq!(output.sequence, 4);
    assert_eq!(output.magnitudes.len(), output.frequency_axis.len());
    assert!((output.harmonic_hz - 880.0).abs() < 44100.0 / 2048.0 / 4.0);
}

#[test]
fn loop_on_other_thread_stops_on_signal() {
    let mailbox = Mailbox::new();
    let shutdown = ShutdownSignal::new();
    let source = ToneSource::sine(8000.0, 600.0, 0.5).with_realtime_pacing(true);

    let mut analysis_loop =
        AnalysisLoop::new(source, config(8000.0, 256), mailbox.clone(), shutdown.clone()).unwrap();
    let handle = std::thread::spawn(move || analysis_loop.run());

    // 256 samples at 8 kHz = 32 ms per frame
    std::thread::sleep(std::time::Duration::from_millis(150));
    shutdown.trigger();

    let report = handle.join().unwrap().unwrap();
    assert!(report.frames_processed >= 1);
    assert!(mailbox.take().is_some());
}
