//! Mock hardware and signal helpers for tests.
//!
//! Compiled for unit tests, and for external test targets through the
//! `mock-hal` feature (enabled by the self-referential dev-dependency).

use std::sync::Arc;
use std::time::Duration;

use crate::driver::SoftTimer;
use crate::hal::Hardware;

/// In-memory [`Hardware`] implementation.
///
/// Input samples come from a script (or a constant once the script is
/// exhausted); output samples and every control-line change are recorded
/// for assertions.
pub struct MockHardware {
    /// Scripted input samples, consumed in order
    pub input: Vec<u16>,
    /// Read position into the script
    pub input_pos: usize,
    /// Value returned once the script is exhausted
    pub idle_input: u16,
    /// Every value written to the output driver
    pub outputs: Vec<u16>,
    /// Current output-driver enable state
    pub output_enabled: bool,
    /// Whether the local timer is armed (unused when a shared timer is set)
    pub timer_armed: bool,
    /// Period of the most recent successful arm
    pub armed_period: Option<Duration>,
    /// Number of arm attempts
    pub arm_count: usize,
    /// When set, every arm attempt fails
    pub fail_arm: bool,
    /// Last value driven on the mode-select line
    pub capture_line: Option<bool>,
    /// Current activity-indicator state
    pub indicator: bool,
    shared_timer: Option<Arc<SoftTimer>>,
}

impl MockHardware {
    /// Hardware whose input always reads `value`
    pub fn constant(value: u16) -> Self {
        Self {
            input: Vec::new(),
            input_pos: 0,
            idle_input: value,
            outputs: Vec::new(),
            output_enabled: false,
            timer_armed: false,
            armed_period: None,
            arm_count: 0,
            fail_arm: false,
            capture_line: None,
            indicator: false,
            shared_timer: None,
        }
    }

    /// Hardware that plays the given samples in order, then `idle_input`
    pub fn from_samples(samples: Vec<u16>, idle_input: u16) -> Self {
        Self {
            input: samples,
            ..Self::constant(idle_input)
        }
    }

    /// Make every timer arm attempt fail
    pub fn failing_timer(mut self) -> Self {
        self.fail_arm = true;
        self
    }

    /// Delegate arm/disarm to a shared soft timer (for driver tests)
    pub fn with_timer(mut self, timer: Arc<SoftTimer>) -> Self {
        self.shared_timer = Some(timer);
        self
    }

    /// Whether the scripted input has been fully consumed
    pub fn input_exhausted(&self) -> bool {
        self.input_pos >= self.input.len()
    }
}

impl Hardware for MockHardware {
    fn read_input(&mut self) -> u16 {
        match self.input.get(self.input_pos) {
            Some(&sample) => {
                self.input_pos += 1;
                sample
            }
            None => self.idle_input,
        }
    }

    fn write_output(&mut self, value: u16) {
        self.outputs.push(value);
    }

    fn set_output_enabled(&mut self, enabled: bool) {
        self.output_enabled = enabled;
    }

    fn arm_timer(&mut self, period: Duration) -> bool {
        self.arm_count += 1;
        if self.fail_arm {
            return false;
        }
        self.armed_period = Some(period);
        match &self.shared_timer {
            Some(timer) => timer.arm(period),
            None => {
                self.timer_armed = true;
                true
            }
        }
    }

    fn disarm_timer(&mut self) {
        self.timer_armed = false;
        if let Some(timer) = &self.shared_timer {
            timer.disarm();
        }
    }

    fn select_capture(&mut self, capture: bool) {
        self.capture_line = Some(capture);
    }

    fn set_indicator(&mut self, active: bool) {
        self.indicator = active;
    }
}

/// Generate a sine tone as unsigned converter samples.
///
/// `amplitude` is a fraction of full scale; the tone is centered on the
/// converter midpoint for the given bit width.
pub fn make_tone_samples(
    amplitude: f32,
    freq_hz: f32,
    sample_rate: f32,
    bits: u32,
    num_samples: usize,
) -> Vec<u16> {
    let midpoint = (1u32 << (bits - 1)) as f32;
    let span = midpoint - 1.0;
    let full_scale = ((1u32 << bits) - 1) as f32;

    (0..num_samples)
        .map(|i| {
            let s = amplitude * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate).sin();
            (midpoint + s * span).clamp(0.0, full_scale) as u16
        })
        .collect()
}
