//! Switch handling for the three-button control surface.
//!
//! Polled from the non-timer context at a slow, fixed rate. The record
//! switch must be held across several polls before a recording starts,
//! which keeps an accidental tap from discarding the held message; playback
//! starts immediately, and the stop switch only acts while a session runs.

use crate::hal::Hardware;
use crate::recorder::VoiceRecorder;

/// Snapshot of the debounced switch lines for one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchState {
    /// Record switch pressed
    pub record: bool,
    /// Playback switch pressed
    pub playback: bool,
    /// Stop switch pressed
    pub stop: bool,
}

/// Press-duration tracking controller for the switch surface
pub struct SwitchController {
    hold_polls: u32,
    record_held: u32,
}

impl SwitchController {
    /// Create a controller requiring the record switch to be held for more
    /// than `hold_polls` consecutive polls
    pub fn new(hold_polls: u32) -> Self {
        Self {
            hold_polls,
            record_held: 0,
        }
    }

    /// Process one poll of the switch lines against the recorder
    pub fn poll<H: Hardware>(&mut self, switches: SwitchState, recorder: &mut VoiceRecorder<H>) {
        if recorder.is_busy() {
            if switches.stop {
                recorder.stop();
            }
        } else if switches.record {
            self.record_held += 1;
            if self.record_held > self.hold_polls {
                recorder.start_recording();
            }
        } else if switches.playback {
            recorder.start_playback();
        }

        if !switches.record {
            self.record_held = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecorderConfig;
    use crate::recorder::Mode;
    use crate::test_utils::MockHardware;

    fn make_recorder() -> VoiceRecorder<MockHardware> {
        let mut config = RecorderConfig::default();
        config.sampling.base_rate_hz = 4;
        config.sampling.resample_factor = 4;
        config.sampling.max_message_secs = 1;
        VoiceRecorder::with_taps(&config, vec![1.0], MockHardware::constant(2148)).unwrap()
    }

    const RECORD: SwitchState = SwitchState {
        record: true,
        playback: false,
        stop: false,
    };
    const PLAYBACK: SwitchState = SwitchState {
        record: false,
        playback: true,
        stop: false,
    };
    const STOP: SwitchState = SwitchState {
        record: false,
        playback: false,
        stop: true,
    };
    const RELEASED: SwitchState = SwitchState {
        record: false,
        playback: false,
        stop: false,
    };

    #[test]
    fn test_record_requires_hold() {
        let mut recorder = make_recorder();
        let mut controller = SwitchController::new(3);

        for _ in 0..3 {
            controller.poll(RECORD, &mut recorder);
            assert_eq!(recorder.mode(), Mode::Idle);
        }
        controller.poll(RECORD, &mut recorder);
        assert_eq!(recorder.mode(), Mode::Recording);
    }

    #[test]
    fn test_record_release_resets_hold_count() {
        let mut recorder = make_recorder();
        let mut controller = SwitchController::new(3);

        for _ in 0..3 {
            controller.poll(RECORD, &mut recorder);
        }
        controller.poll(RELEASED, &mut recorder);

        // The count restarts; three more polls are not enough.
        for _ in 0..3 {
            controller.poll(RECORD, &mut recorder);
        }
        assert_eq!(recorder.mode(), Mode::Idle);
    }

    #[test]
    fn test_playback_starts_immediately() {
        let mut recorder = make_recorder();
        let mut controller = SwitchController::new(3);

        // Record a short message first.
        for _ in 0..4 {
            controller.poll(RECORD, &mut recorder);
        }
        recorder.on_tick();
        controller.poll(STOP, &mut recorder);
        assert_eq!(recorder.mode(), Mode::Idle);
        assert!(recorder.message_len() > 0);

        controller.poll(PLAYBACK, &mut recorder);
        assert_eq!(recorder.mode(), Mode::Playing);
    }

    #[test]
    fn test_stop_only_acts_while_busy() {
        let mut recorder = make_recorder();
        let mut controller = SwitchController::new(3);

        controller.poll(STOP, &mut recorder);
        assert_eq!(recorder.mode(), Mode::Idle);

        for _ in 0..4 {
            controller.poll(RECORD, &mut recorder);
        }
        assert_eq!(recorder.mode(), Mode::Recording);
        controller.poll(STOP, &mut recorder);
        assert_eq!(recorder.mode(), Mode::Idle);
    }

    #[test]
    fn test_switches_ignored_while_busy() {
        let mut recorder = make_recorder();
        let mut controller = SwitchController::new(0);

        controller.poll(RECORD, &mut recorder);
        assert_eq!(recorder.mode(), Mode::Recording);

        // Record and playback presses do nothing during a session.
        controller.poll(RECORD, &mut recorder);
        controller.poll(PLAYBACK, &mut recorder);
        assert_eq!(recorder.mode(), Mode::Recording);
    }
}
