use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;

use memovox::config::{InputConfig, RecorderConfig};
use memovox::hal::Hardware;
use memovox::recorder::VoiceRecorder;
use memovox::wav;

#[derive(Parser, Debug)]
#[command(name = "memovox")]
#[command(about = "Record a WAV file through the voice pipeline and play it back", long_about = None)]
struct Args {
    /// Input WAV file used as the analog source; a test tone when omitted
    input: Option<PathBuf>,

    /// Output WAV path for the reconstructed playback signal
    #[arg(short, long, default_value = "playback.wav")]
    output: PathBuf,

    /// TOML configuration file (defaults match the original firmware)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to record (capped by the configured message capacity)
    #[arg(long, default_value = "3.0")]
    seconds: f32,

    /// Frequency in Hz of the synthesized tone when no input file is given
    #[arg(long, default_value = "440.0")]
    tone_hz: f32,

    /// Print the session summary as JSON
    #[arg(long)]
    json: bool,
}

/// File-backed stand-in for the board peripherals.
///
/// Input samples come from the decoded WAV (converter midpoint once
/// exhausted); output samples are collected for the playback WAV. The
/// timer is a plain armed flag: the main thread runs the tick loop
/// cooperatively while it is armed.
struct HostHardware {
    input: Vec<u16>,
    pos: usize,
    idle_level: u16,
    output: Vec<u16>,
    armed: bool,
}

impl HostHardware {
    fn new(input: Vec<u16>, idle_level: u16) -> Self {
        Self {
            input,
            pos: 0,
            idle_level,
            output: Vec::new(),
            armed: false,
        }
    }
}

impl Hardware for HostHardware {
    fn read_input(&mut self) -> u16 {
        match self.input.get(self.pos) {
            Some(&sample) => {
                self.pos += 1;
                sample
            }
            None => self.idle_level,
        }
    }

    fn write_output(&mut self, value: u16) {
        self.output.push(value);
    }

    fn set_output_enabled(&mut self, enabled: bool) {
        log::debug!("output driver {}", if enabled { "enabled" } else { "disabled" });
    }

    fn arm_timer(&mut self, _period: std::time::Duration) -> bool {
        self.armed = true;
        true
    }

    fn disarm_timer(&mut self) {
        self.armed = false;
    }

    fn select_capture(&mut self, capture: bool) {
        // No analog multiplexer on the host; nothing to settle.
        log::debug!("mode select: {}", if capture { "capture" } else { "playback" });
    }

    fn set_indicator(&mut self, active: bool) {
        log::debug!("activity indicator: {}", active);
    }
}

#[derive(Debug, Serialize)]
struct LevelSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl LevelSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    message_samples: usize,
    message_secs: f32,
    record_ticks: u64,
    playback_ticks: u64,
    output_samples: usize,
    clipped_samples: usize,
    level: Option<LevelSummary>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RecorderConfig::from_toml(&fs::read_to_string(path)?)?,
        None => RecorderConfig::default(),
    };
    let tick_rate = config.sampling.tick_rate_hz();

    let analog = match &args.input {
        Some(path) => {
            let (samples, rate) = wav::load_mono(path)?;
            if rate != tick_rate {
                log::warn!(
                    "input sample rate {} Hz differs from tick rate {} Hz; playback pitch will shift",
                    rate,
                    tick_rate
                );
            }
            samples
        }
        None => synthesize_tone(args.tone_hz, tick_rate, args.seconds),
    };

    let converter_input = to_converter_samples(&analog, &config.input);
    let input_ticks = converter_input.len() as u64;
    let idle_level = config.input.midpoint() as u16;
    let hw = HostHardware::new(converter_input, idle_level);
    let mut recorder = VoiceRecorder::new(&config, hw)?;

    // Record session: cooperative tick loop, bounded by the requested
    // duration and the available input.
    if !recorder.start_recording() {
        anyhow::bail!("could not start recording");
    }
    let record_limit = ((args.seconds * tick_rate as f32) as u64).min(input_ticks);
    let record_ticks = run_session(&mut recorder, record_limit);
    log::info!(
        "recorded {} samples over {} ticks",
        recorder.message_len(),
        record_ticks
    );

    let mut level: Stats<f32> = Stats::new();
    let mut clipped = 0usize;
    for &sample in recorder.message() {
        level.update(sample as f32);
        if sample as i32 == memovox::constants::PCM8_MIN || sample as i32 == memovox::constants::PCM8_MAX {
            clipped += 1;
        }
    }

    // Playback session: the pipeline self-stops at buffer exhaustion; the
    // limit is only a safety net.
    if !recorder.start_playback() {
        anyhow::bail!("could not start playback: nothing recorded");
    }
    let playback_limit =
        recorder.message_len() as u64 * config.sampling.resample_factor as u64 + 1;
    let playback_ticks = run_session(&mut recorder, playback_limit);

    let half_scale = (1u32 << config.output.bits) as f32 / 2.0;
    let reconstructed: Vec<f32> = recorder
        .hardware()
        .output
        .iter()
        .map(|&v| v as f32 / half_scale - 1.0)
        .collect();
    wav::save_mono(&args.output, &reconstructed, tick_rate)?;

    let summary = SessionSummary {
        message_samples: recorder.message_len(),
        message_secs: recorder.message_len() as f32 / config.sampling.base_rate_hz as f32,
        record_ticks,
        playback_ticks,
        output_samples: reconstructed.len(),
        clipped_samples: clipped,
        level: LevelSummary::from_stats(&level),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Message: {} samples ({:.2} s at {} Hz)",
            summary.message_samples,
            summary.message_secs,
            config.sampling.base_rate_hz
        );
        println!(
            "Ticks: {} record, {} playback",
            summary.record_ticks, summary.playback_ticks
        );
        println!(
            "Output: {} samples written to {}",
            summary.output_samples,
            args.output.display()
        );
        if let Some(level) = &summary.level {
            println!(
                "Level: mean {:.1}, std dev {:.1}, range [{:.0}, {:.0}], {} clipped",
                level.mean, level.std_dev, level.min, level.max, summary.clipped_samples
            );
        }
    }

    Ok(())
}

/// Drive ticks until the session disarms the timer or the limit is reached.
fn run_session(recorder: &mut VoiceRecorder<HostHardware>, limit: u64) -> u64 {
    let mut ticks = 0u64;
    while recorder.hardware().armed && ticks < limit {
        recorder.on_tick();
        ticks += 1;
    }
    if recorder.is_busy() {
        recorder.stop();
    }
    ticks
}

fn synthesize_tone(freq_hz: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
    let num_samples = (seconds * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| 0.8 * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn to_converter_samples(analog: &[f32], input: &InputConfig) -> Vec<u16> {
    let midpoint = input.midpoint();
    let full_scale = ((1u32 << input.bits) - 1) as f32;
    analog
        .iter()
        .map(|&s| (midpoint + s.clamp(-1.0, 1.0) * (midpoint - 1.0)).clamp(0.0, full_scale) as u16)
        .collect()
}
