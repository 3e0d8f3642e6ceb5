//! Record/playback state machine and per-tick sample pipeline.
//!
//! One [`VoiceRecorder`] owns the hardware handle, the shared low-pass
//! filter, and the message buffer. An external caller starts and stops
//! sessions; the armed periodic trigger invokes [`VoiceRecorder::on_tick`]
//! once per period. The tick context is the only writer of the buffer and
//! counters, so the two contexts never race on sample data.

use std::time::Duration;

use crate::config::RecorderConfig;
use crate::constants::{PCM8_MAX, PCM8_MIN, PCM8_OFFSET};
use crate::error::{RecorderError, Result};
use crate::hal::Hardware;
use crate::signal_processing::{FirFilter, design_lowpass};

/// Pipeline state
///
/// The busy and direction flags of the original firmware are collapsed into
/// one tri-state so the invalid fourth combination cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No timer armed; the buffer may hold the previous message
    Idle,
    /// Timer armed, absorbing decimated input samples
    Recording,
    /// Timer armed, emitting interpolated output samples
    Playing,
}

/// Single-channel voice recorder pipeline
///
/// Records a filtered, decimated message into a bounded 8-bit buffer and
/// reconstructs it later by zero-stuffed interpolation through the same
/// filter. All buffers are sized at construction; no allocation happens on
/// the tick path.
pub struct VoiceRecorder<H: Hardware> {
    hw: H,
    filter: FirFilter,
    message: Vec<i8>,
    capacity: usize,
    resample_factor: u32,
    timer_period: Duration,
    input_midpoint: f32,
    pcm8_divisor: f32,
    pcm8_gain: f32,
    output_full_scale: i32,
    mode: Mode,
    sample_counter: u32,
    playback_index: usize,
}

impl<H: Hardware> VoiceRecorder<H> {
    /// Create a recorder, designing the low-pass taps from the filter
    /// configuration.
    ///
    /// # Errors
    /// Returns `RecorderError::Config` for invalid configuration values and
    /// `RecorderError::FilterDesign` if the tap design fails.
    pub fn new(config: &RecorderConfig, hw: H) -> Result<Self> {
        config.validate()?;
        let taps = design_lowpass(
            config.filter.cutoff_hz,
            config.filter.transition_hz,
            config.sampling.tick_rate_hz() as f32,
            config.filter.num_taps,
        )?;
        Self::with_taps(config, taps, hw)
    }

    /// Create a recorder with precomputed filter taps.
    ///
    /// The original firmware shipped its coefficients in a header; this
    /// constructor serves the same case.
    ///
    /// # Errors
    /// Returns `RecorderError::Config` for invalid configuration values or
    /// an empty tap set.
    pub fn with_taps(config: &RecorderConfig, taps: Vec<f64>, hw: H) -> Result<Self> {
        config.validate()?;
        if taps.is_empty() {
            return Err(RecorderError::Config("filter taps must not be empty".into()));
        }

        Ok(Self {
            hw,
            filter: FirFilter::new(taps),
            message: Vec::with_capacity(config.sampling.max_samples()),
            capacity: config.sampling.max_samples(),
            resample_factor: config.sampling.resample_factor,
            timer_period: config.sampling.timer_period(),
            input_midpoint: config.input.midpoint(),
            pcm8_divisor: config.input.pcm8_divisor(),
            pcm8_gain: config.output.pcm8_gain(),
            output_full_scale: config.output.full_scale(),
            mode: Mode::Idle,
            sample_counter: 0,
            playback_index: 0,
        })
    }

    /// Start a recording session.
    ///
    /// Returns `false` without changing state when a session is already
    /// running or the periodic trigger cannot be armed. On success the
    /// previous message is discarded.
    pub fn start_recording(&mut self) -> bool {
        if self.mode != Mode::Idle {
            log::debug!("start_recording rejected: busy");
            return false;
        }

        self.hw.select_capture(true);
        if !self.hw.arm_timer(self.timer_period) {
            log::warn!("start_recording failed: could not arm timer");
            return false;
        }

        self.message.clear();
        self.filter.reset();
        self.sample_counter = 0;
        self.mode = Mode::Recording;
        self.hw.set_indicator(true);
        log::debug!(
            "recording started, capacity {} samples, period {:?}",
            self.capacity,
            self.timer_period
        );
        true
    }

    /// Start a playback session of the held message.
    ///
    /// Returns `false` without changing state when a session is already
    /// running, the buffer is empty, or the periodic trigger cannot be
    /// armed.
    pub fn start_playback(&mut self) -> bool {
        if self.mode != Mode::Idle {
            log::debug!("start_playback rejected: busy");
            return false;
        }
        if self.message.is_empty() {
            log::debug!("start_playback rejected: no message recorded");
            return false;
        }

        self.hw.select_capture(false);
        if !self.hw.arm_timer(self.timer_period) {
            log::warn!("start_playback failed: could not arm timer");
            return false;
        }

        self.playback_index = 0;
        self.filter.reset();
        self.sample_counter = 0;
        self.hw.set_output_enabled(true);
        self.mode = Mode::Playing;
        self.hw.set_indicator(true);
        log::debug!("playback started, {} samples", self.message.len());
        true
    }

    /// Stop the current session.
    ///
    /// Disarms the timer, resets the filter and tick counter, disables the
    /// output driver, and clears the indicator. The recorded message is
    /// kept and stays playable until overwritten. Calling this while idle
    /// is a no-op.
    pub fn stop(&mut self) {
        self.hw.disarm_timer();
        self.hw.set_output_enabled(false);
        self.hw.set_indicator(false);
        self.filter.reset();
        self.sample_counter = 0;
        if self.mode != Mode::Idle {
            log::debug!("session stopped, holding {} samples", self.message.len());
        }
        self.mode = Mode::Idle;
    }

    /// Handle one tick of the periodic trigger.
    ///
    /// Called from the timer context once per period while a session is
    /// active. Cost is O(filter length); no allocation. A tick arriving
    /// while idle does nothing.
    pub fn on_tick(&mut self) {
        match self.mode {
            Mode::Idle => return,
            Mode::Recording => self.record_tick(),
            Mode::Playing => self.playback_tick(),
        }
        self.sample_counter = self.sample_counter.wrapping_add(1);
    }

    /// Absorb one input sample: recenter, filter, decimate, saturate.
    fn record_tick(&mut self) {
        let raw = self.hw.read_input();
        let centered = raw as f32 - self.input_midpoint;
        let filtered = self.filter.process(centered);

        if self.sample_counter % self.resample_factor == 0 {
            let scaled = (filtered / self.pcm8_divisor) as i32;
            self.message.push(scaled.clamp(PCM8_MIN, PCM8_MAX) as i8);
            if self.message.len() >= self.capacity {
                log::debug!("message buffer full");
                self.stop();
            }
        }
    }

    /// Emit one output sample: zero-stuff, filter, restore amplitude,
    /// rescale to the driver range.
    fn playback_tick(&mut self) {
        let raw = if self.sample_counter % self.resample_factor == 0 {
            let sample = self.message[self.playback_index];
            self.playback_index += 1;
            sample as f32
        } else {
            0.0
        };

        // Zero-stuffing divides the signal energy by the factor; the filter
        // output is scaled back up by the same factor.
        let filtered = self.filter.process(raw) * self.resample_factor as f32;
        let value = ((filtered + PCM8_OFFSET) * self.pcm8_gain) as i32;
        self.hw.write_output(value.clamp(0, self.output_full_scale) as u16);

        // Termination is checked after delivering the current output value.
        if self.playback_index >= self.message.len() {
            self.stop();
        }
    }

    /// Whether a session is currently active
    pub fn is_busy(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// Current pipeline state
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The held message as 8-bit signed samples at the base rate
    pub fn message(&self) -> &[i8] {
        &self.message
    }

    /// Number of samples in the held message
    pub fn message_len(&self) -> usize {
        self.message.len()
    }

    /// Period the timer is armed with for either session kind
    pub fn timer_period(&self) -> Duration {
        self.timer_period
    }

    /// Access the injected hardware
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Mutable access to the injected hardware
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}
