//! Analysis window families
//!
//! Tapers applied to each frame before the transform to reduce spectral leakage.

use serde::Deserialize;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(N-1))
    /// Sidelobes ~-31 dB, fast rolloff; good default for peak picking
    #[default]
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(N-1))
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(N-1)) + 0.08*cos(4πn/(N-1))
    Blackman,

    /// Rectangular window (no tapering)
    Rectangular,
}

impl WindowType {
    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Rectangular => "rectangular",
        }
    }

    /// Mean of the window coefficients for large N (amplitude loss of a windowed tone)
    pub fn coherent_gain(&self) -> f64 {
        match self {
            WindowType::Hann => 0.5,
            WindowType::Hamming => 0.54,
            WindowType::Blackman => 0.42,
            WindowType::Rectangular => 1.0,
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "rectangular" | "rect" | "none" => Ok(WindowType::Rectangular),
            other => Err(format!(
                "unknown window '{}' (expected hann, hamming, blackman or rectangular)",
                other
            )),
        }
    }
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (N)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..N-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    // Symmetric forms divide by N-1
    if length < 2 {
        return vec![1.0; length];
    }

    let denom = (length - 1) as f64;

    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / denom;
            match window_type {
                WindowType::Hann => 0.5 - 0.5 * angle.cos(),
                WindowType::Hamming => 0.54 - 0.46 * angle.cos(),
                WindowType::Blackman => 0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos(),
                WindowType::Rectangular => 1.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_generation() {
        let length = 161;

        let hann = generate_window(WindowType::Hann, length);
        let hamming = generate_window(WindowType::Hamming, length);
        let blackman = generate_window(WindowType::Blackman, length);

        assert_eq!(hann.len(), length);
        assert_eq!(hamming.len(), length);
        assert_eq!(blackman.len(), length);

        // Symmetric
        assert!((hann[0] - hann[length - 1]).abs() < 1e-10);
        assert!((blackman[3] - blackman[length - 4]).abs() < 1e-10);

        // Peak of 1.0 at the center for odd lengths
        let center = length / 2;
        assert!((hann[center] - 1.0).abs() < 1e-10);
        assert!((hamming[center] - 1.0).abs() < 1e-10);
        assert!((blackman[center] - 1.0).abs() < 1e-10);

        // Hann tapers to zero, Hamming stops at 0.08
        assert!(hann[0].abs() < 1e-12);
        assert!(hamming[0] > 0.07 && hamming[0] < 0.09);
    }

    #[test]
    fn test_rectangular_window() {
        let window = generate_window(WindowType::Rectangular, 100);
        assert_eq!(window.len(), 100);
        assert!(window.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(generate_window(WindowType::Hann, 0).is_empty());
        assert_eq!(generate_window(WindowType::Blackman, 1), vec![1.0]);
    }

    #[test]
    fn test_coherent_gain_matches_mean() {
        let window = generate_window(WindowType::Hann, 4096);
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        assert!((mean - WindowType::Hann.coherent_gain()).abs() < 1e-3);
    }

    #[test]
    fn test_parse_window_names() {
        assert_eq!("Hann".parse::<WindowType>(), Ok(WindowType::Hann));
        assert_eq!("rect".parse::<WindowType>(), Ok(WindowType::Rectangular));
        assert!("kaiser".parse::<WindowType>().is_err());
        assert_eq!(WindowType::Blackman.to_string(), "blackman");
    }
}
