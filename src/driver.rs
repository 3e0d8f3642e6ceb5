//! Host-side periodic trigger.
//!
//! On the original hardware the tick source is a repeating timer interrupt.
//! On a host with real threads the same contract maps to a dedicated
//! high-priority thread blocked on a rate-limited channel: [`SoftTimer`]
//! implements the arm/disarm side, and [`SessionDriver`] runs the tick
//! thread that invokes the pipeline while the timer is armed. Only the tick
//! thread mutates recorder state; other contexts go through the shared
//! mutex for start/stop/is_busy, which preserves the single-writer rule.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, select, tick};

use crate::hal::Hardware;
use crate::recorder::VoiceRecorder;

/// Armed flag and period for a software periodic trigger.
///
/// The pipeline arms and disarms it through its `Hardware` handle; the
/// driver thread observes the armed flag before each tick. Arming never
/// fails here, so start requests only fail for busy/empty reasons.
pub struct SoftTimer {
    armed: AtomicBool,
    period_us: AtomicU64,
}

impl SoftTimer {
    pub fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
            period_us: AtomicU64::new(0),
        }
    }

    /// Arm at the given period; always succeeds
    pub fn arm(&self, period: Duration) -> bool {
        self.period_us
            .store(period.as_micros() as u64, Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
        true
    }

    /// Disarm; idempotent
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us.load(Ordering::Relaxed))
    }
}

impl Default for SoftTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tick thread driving a shared recorder at a fixed period.
///
/// Dropping the driver (or calling [`SessionDriver::shutdown`]) stops the
/// thread and joins it.
pub struct SessionDriver<H: Hardware + Send + 'static> {
    recorder: Arc<std::sync::Mutex<VoiceRecorder<H>>>,
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl<H: Hardware + Send + 'static> SessionDriver<H> {
    /// Spawn the tick thread.
    ///
    /// `tick_period` is the fixed period of the trigger; `tick_rate_hz` is
    /// used for the real-time priority request.
    pub fn spawn(
        recorder: Arc<std::sync::Mutex<VoiceRecorder<H>>>,
        timer: Arc<SoftTimer>,
        tick_period: Duration,
        tick_rate_hz: u32,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded(1);
        let thread_recorder = Arc::clone(&recorder);

        let handle = thread::spawn(move || {
            run_tick_loop(thread_recorder, timer, tick_period, tick_rate_hz, shutdown_rx);
        });

        Self {
            recorder,
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Handle to the shared recorder for the polling context
    pub fn recorder(&self) -> Arc<std::sync::Mutex<VoiceRecorder<H>>> {
        Arc::clone(&self.recorder)
    }

    /// Stop the tick thread and wait for it to exit
    pub fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl<H: Hardware + Send + 'static> Drop for SessionDriver<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_tick_loop<H: Hardware>(
    recorder: Arc<std::sync::Mutex<VoiceRecorder<H>>>,
    timer: Arc<SoftTimer>,
    tick_period: Duration,
    tick_rate_hz: u32,
    shutdown_rx: Receiver<()>,
) {
    // Attempt to promote to real-time priority
    let _rt_handle = match audio_thread_priority::promote_current_thread_to_real_time(
        1,
        tick_rate_hz,
    ) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not set real-time priority: {}", e);
            None
        }
    };

    let ticks = tick(tick_period);

    loop {
        select! {
            recv(ticks) -> _ => {
                if !timer.is_armed() {
                    continue;
                }
                match recorder.lock() {
                    Ok(mut rec) => rec.on_tick(),
                    Err(e) => {
                        log::error!("Recorder lock poisoned, stopping tick thread: {}", e);
                        break;
                    }
                }
            }
            recv(shutdown_rx) -> _ => break,
        }
    }
}
