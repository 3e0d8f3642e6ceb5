pub mod config;
pub mod constants;
pub mod control;
pub mod driver;
pub mod error;
pub mod hal;
pub mod recorder;
pub mod signal_processing;
pub mod wav;

#[cfg(any(test, feature = "mock-hal"))]
pub mod test_utils;

pub use config::RecorderConfig;
pub use error::{RecorderError, Result};
pub use recorder::{Mode, VoiceRecorder};
