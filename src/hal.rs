//! Hardware capability contract for the voice pipeline.
//!
//! The pipeline never touches a peripheral directly; everything it needs
//! from the board is expressed through the [`Hardware`] trait and injected
//! at construction. On the original firmware these methods map to the ADC,
//! a PWM slice, a repeating timer, and two GPIO lines. On a host they map
//! to whatever the embedding provides: the demo binary backs them with WAV
//! files and a soft timer.

use std::time::Duration;

/// Peripheral access required by the voice pipeline.
///
/// The pipeline is the sole caller; implementations do not need interior
/// mutability. One tick context and one polling context exist, and both
/// reach the hardware only through the pipeline's `&mut self` methods.
pub trait Hardware {
    /// Read one unsigned sample from the input converter.
    ///
    /// The value is expected in `0..2^bits` for the configured input width,
    /// centered on the converter midpoint.
    fn read_input(&mut self) -> u16;

    /// Write one unsigned sample to the output driver.
    ///
    /// The value is always within `0..=full_scale` for the configured
    /// output width; the pipeline saturates before calling.
    fn write_output(&mut self, value: u16);

    /// Enable or disable the output driver.
    fn set_output_enabled(&mut self, enabled: bool);

    /// Arm the periodic trigger at the given period.
    ///
    /// Returns `false` when the trigger cannot be armed; the pipeline then
    /// reports the start request as failed and stays idle. Arming an
    /// already-armed trigger is a successful no-op.
    fn arm_timer(&mut self, period: Duration) -> bool;

    /// Disarm the periodic trigger. Must be idempotent.
    fn disarm_timer(&mut self);

    /// Drive the mode-select line: `true` routes the analog path for
    /// capture, `false` for playback.
    ///
    /// Implementations must not return until the line has settled, so the
    /// first tick of a new session sees the selected path.
    fn select_capture(&mut self, capture: bool);

    /// Drive the activity indicator: on while a session is running.
    fn set_indicator(&mut self, active: bool);
}
