use crate::error::{RecorderError, Result};
use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};

/// Design a linear-phase FIR low-pass filter with the Parks-McClellan
/// (Remez) algorithm.
///
/// The same response serves both pipeline roles: anti-aliasing ahead of
/// decimation and anti-imaging after zero-stuffing, so the design runs at
/// the tick rate in both cases. DC gain is one, which keeps the stored
/// sample amplitude aligned with the input.
///
/// # Arguments
/// * `cutoff_hz` - Passband edge in Hz
/// * `transition_hz` - Transition bandwidth in Hz (stopband starts at
///   `cutoff_hz + transition_hz`)
/// * `sample_rate` - Tick rate in Hz
/// * `num_taps` - Number of filter taps (even counts bumped to odd for
///   Type I linear phase)
///
/// # Errors
/// Returns `RecorderError::FilterDesign` if the band geometry is invalid
/// or the Remez exchange fails.
pub fn design_lowpass(
    cutoff_hz: f32,
    transition_hz: f32,
    sample_rate: f32,
    num_taps: usize,
) -> Result<Vec<f64>> {
    let num_taps = if num_taps.is_multiple_of(2) {
        num_taps + 1
    } else {
        num_taps
    };

    let pass_end = (cutoff_hz / sample_rate) as f64;
    let stop_start = ((cutoff_hz + transition_hz) / sample_rate) as f64;

    if pass_end <= 0.0 || stop_start >= 0.5 || pass_end >= stop_start {
        return Err(RecorderError::FilterDesign(format!(
            "Invalid filter frequencies: cutoff={}, transition={}, sample_rate={}",
            cutoff_hz, transition_hz, sample_rate
        )));
    }

    let bands = [
        BandSetting::new(0.0, pass_end, constant(1.0))
            .map_err(|e| RecorderError::FilterDesign(format!("Passband: {:?}", e)))?,
        BandSetting::new(stop_start, 0.5, constant(0.0))
            .map_err(|e| RecorderError::FilterDesign(format!("Stopband: {:?}", e)))?,
    ];

    let params = pm_parameters(num_taps, &bands)
        .map_err(|e| RecorderError::FilterDesign(format!("PM parameters: {:?}", e)))?;

    let design =
        pm_remez(&params).map_err(|e| RecorderError::FilterDesign(format!("PM Remez: {:?}", e)))?;

    Ok(design.impulse_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_processing::FirFilter;
    use std::f32::consts::PI;

    fn settled_rms(samples: &[f32], skip: usize) -> f32 {
        (samples.iter().skip(skip).map(|x| x * x).sum::<f32>() / (samples.len() - skip) as f32)
            .sqrt()
    }

    #[test]
    fn test_lowpass_design() {
        let taps = design_lowpass(3400.0, 600.0, 32000.0, 63).unwrap();
        assert_eq!(taps.len(), 63);
    }

    #[test]
    fn test_even_tap_count_bumped_to_odd() {
        let taps = design_lowpass(3400.0, 600.0, 32000.0, 62).unwrap();
        assert_eq!(taps.len(), 63);
    }

    #[test]
    fn test_lowpass_invalid_geometry() {
        // Stopband edge past Nyquist
        assert!(design_lowpass(3400.0, 600.0, 8000.0, 63).is_err());
        // Zero cutoff
        assert!(design_lowpass(0.0, 600.0, 32000.0, 63).is_err());
    }

    #[test]
    fn test_lowpass_passes_voice_band() {
        let taps = design_lowpass(3400.0, 600.0, 32000.0, 63).unwrap();
        let mut filter = FirFilter::new(taps);

        let input: Vec<f32> = (0..3200)
            .map(|i| (2.0 * PI * 1000.0 * i as f32 / 32000.0).sin())
            .collect();

        let mut output = input.clone();
        filter.process_buffer(&mut output);

        let attenuation_db =
            20.0 * (settled_rms(&output, 200) / settled_rms(&input, 200)).log10();
        assert!(
            attenuation_db > -3.0,
            "Voice band too attenuated: {} dB",
            attenuation_db
        );
    }

    #[test]
    fn test_lowpass_attenuates_image_band() {
        let taps = design_lowpass(3400.0, 600.0, 32000.0, 63).unwrap();
        let mut filter = FirFilter::new(taps);

        let input: Vec<f32> = (0..3200)
            .map(|i| (2.0 * PI * 6000.0 * i as f32 / 32000.0).sin())
            .collect();

        let mut output = input.clone();
        filter.process_buffer(&mut output);

        let attenuation_db =
            20.0 * (settled_rms(&output, 200) / settled_rms(&input, 200)).log10();
        assert!(
            attenuation_db < -20.0,
            "Image band not attenuated enough: {} dB",
            attenuation_db
        );
    }
}
