//! Configuration for the memovox voice recorder.
//!
//! Defaults reproduce the original firmware constants: an 8 kHz base rate
//! oversampled 4x to a 32 kHz tick rate, a 30 second message, a 12-bit
//! input converter and a 10-bit output driver.
//!
//! All sections deserialize with per-field defaults, so a partial TOML file
//! only needs to name the values it changes:
//!
//! ```ignore
//! [sampling]
//! max_message_secs = 10
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::{RecorderError, Result};

/// System-wide recorder configuration
///
/// Use `RecorderConfig::default()` for the firmware defaults, or
/// deserialize from TOML.
///
/// # Example
/// ```
/// use memovox::config::RecorderConfig;
///
/// let mut config = RecorderConfig::default();
/// config.sampling.max_message_secs = 10;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Tick rate, resample factor, and message capacity
    pub sampling: SamplingConfig,
    /// Anti-aliasing / anti-imaging low-pass design parameters
    pub filter: FilterConfig,
    /// Input converter geometry
    pub input: InputConfig,
    /// Output driver geometry
    pub output: OutputConfig,
}

/// Sample-rate and capacity configuration
///
/// The tick handler runs at `base_rate_hz * resample_factor`. The same
/// factor decimates on the record path and interpolates on the playback
/// path; storing it once makes the rate symmetry structural.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Stored sample rate in Hz (rate of the message buffer)
    pub base_rate_hz: u32,
    /// Decimation/interpolation factor between tick rate and base rate
    pub resample_factor: u32,
    /// Maximum message length in seconds
    pub max_message_secs: u32,
}

/// Low-pass filter design parameters
///
/// One response serves both roles: anti-aliasing ahead of decimation and
/// anti-imaging after zero-stuffing. The defaults place the stopband edge
/// at the base-rate Nyquist frequency (4 kHz).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Passband edge in Hz
    pub cutoff_hz: f32,
    /// Transition bandwidth in Hz (stopband starts at cutoff + transition)
    pub transition_hz: f32,
    /// Number of filter taps (even counts are bumped to odd for linear phase)
    pub num_taps: usize,
}

/// Input converter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Converter resolution in bits (samples arrive unsigned, 0..2^bits)
    pub bits: u32,
}

/// Output driver configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Driver resolution in bits (values written unsigned, 0..2^bits)
    pub bits: u32,
}

impl SamplingConfig {
    /// Tick rate of the periodic trigger in Hz
    ///
    /// Saturates rather than wrapping for out-of-range field values;
    /// `RecorderConfig::validate` rejects anything above the timer ceiling.
    pub fn tick_rate_hz(&self) -> u32 {
        self.base_rate_hz.saturating_mul(self.resample_factor)
    }

    /// Period of the periodic trigger (integer microseconds)
    pub fn timer_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.tick_rate_hz() as u64)
    }

    /// Message buffer capacity in samples.
    ///
    /// Ticks per message divided by the decimation factor, which reduces to
    /// `base_rate_hz * max_message_secs`.
    pub fn max_samples(&self) -> usize {
        (u64::from(self.base_rate_hz) * u64::from(self.max_message_secs)) as usize
    }
}

impl InputConfig {
    /// Midpoint subtracted to recenter the unsigned input to a signed range
    pub fn midpoint(&self) -> f32 {
        (1u32 << (self.bits - 1)) as f32
    }

    /// Divisor mapping the recentered input down to the 8-bit signed domain
    pub fn pcm8_divisor(&self) -> f32 {
        (1u32 << (self.bits - 8)) as f32
    }
}

impl OutputConfig {
    /// Largest value the output driver accepts
    pub fn full_scale(&self) -> i32 {
        (1i32 << self.bits) - 1
    }

    /// Gain mapping an unsigned 8-bit value up to the driver range
    pub fn pcm8_gain(&self) -> f32 {
        (1u32 << (self.bits - 8)) as f32
    }
}

impl RecorderConfig {
    /// Check the configuration for values the pipeline cannot run with
    ///
    /// # Errors
    /// Returns `RecorderError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.sampling.base_rate_hz == 0 {
            return Err(RecorderError::Config("base_rate_hz must be > 0".into()));
        }
        if self.sampling.resample_factor == 0 {
            return Err(RecorderError::Config("resample_factor must be > 0".into()));
        }
        if self.sampling.max_message_secs == 0 {
            return Err(RecorderError::Config("max_message_secs must be > 0".into()));
        }
        if self.sampling.tick_rate_hz() > 1_000_000 {
            return Err(RecorderError::Config(format!(
                "tick rate {} Hz exceeds the 1 MHz timer resolution",
                self.sampling.tick_rate_hz()
            )));
        }
        if !(8..=16).contains(&self.input.bits) {
            return Err(RecorderError::Config(format!(
                "input bits must be 8..=16, got {}",
                self.input.bits
            )));
        }
        if !(8..=16).contains(&self.output.bits) {
            return Err(RecorderError::Config(format!(
                "output bits must be 8..=16, got {}",
                self.output.bits
            )));
        }
        if self.filter.num_taps == 0 {
            return Err(RecorderError::Config("num_taps must be > 0".into()));
        }
        Ok(())
    }

    /// Load a configuration from a TOML string
    ///
    /// # Errors
    /// Returns `RecorderError::Config` for syntax errors or invalid values.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RecorderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            base_rate_hz: 8_000,
            resample_factor: 4,
            max_message_secs: 30,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 3_400.0,
            transition_hz: 600.0,
            num_taps: 63,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { bits: 12 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { bits: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_derived_values() {
        let config = RecorderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling.tick_rate_hz(), 32_000);
        assert_eq!(config.sampling.timer_period(), Duration::from_micros(31));
        assert_eq!(config.sampling.max_samples(), 240_000);
        assert_eq!(config.input.midpoint(), 2048.0);
        assert_eq!(config.input.pcm8_divisor(), 16.0);
        assert_eq!(config.output.full_scale(), 1023);
        assert_eq!(config.output.pcm8_gain(), 4.0);
    }

    #[test]
    fn test_validate_rejects_zero_rates() {
        let mut config = RecorderConfig::default();
        config.sampling.base_rate_hz = 0;
        assert!(config.validate().is_err());

        let mut config = RecorderConfig::default();
        config.sampling.resample_factor = 0;
        assert!(config.validate().is_err());

        let mut config = RecorderConfig::default();
        config.sampling.max_message_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_tick_rate() {
        // The raw u32 product wraps to 0 here; the saturating derivation
        // must reject it instead of panicking or slipping past the ceiling.
        let mut config = RecorderConfig::default();
        config.sampling.base_rate_hz = 1 << 30;
        config.sampling.resample_factor = 4;
        assert!(config.validate().is_err());
        assert_eq!(config.sampling.tick_rate_hz(), u32::MAX);

        // Above the timer resolution but without overflow: also rejected.
        let mut config = RecorderConfig::default();
        config.sampling.base_rate_hz = 2_000_000;
        config.sampling.resample_factor = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bit_widths() {
        let mut config = RecorderConfig::default();
        config.input.bits = 7;
        assert!(config.validate().is_err());

        let mut config = RecorderConfig::default();
        config.output.bits = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RecorderConfig::from_toml(
            r#"
            [sampling]
            max_message_secs = 10

            [output]
            bits = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.sampling.max_message_secs, 10);
        assert_eq!(config.sampling.base_rate_hz, 8_000);
        assert_eq!(config.output.bits, 8);
        assert_eq!(config.output.pcm8_gain(), 1.0);
    }

    #[test]
    fn test_from_toml_invalid_value() {
        let result = RecorderConfig::from_toml("[input]\nbits = 40\n");
        assert!(result.is_err());
    }
}
