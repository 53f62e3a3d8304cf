//! Audio output seam: blocking sample writes to a playback device.

use crate::error::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for a playback device sink.
///
/// `write` blocks until the device has accepted the chunk; the playback
/// engine calls it from its background thread and checks for cancellation
/// between chunks.
pub trait AudioOutput: Send {
    /// Write one chunk of interleaved 16-bit PCM samples.
    fn write(&mut self, samples: &[i16], spec: &hound::WavSpec) -> Result<()>;

    /// Block until everything written so far has been played out.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Mock output for testing: records written samples, optionally pacing
/// writes so cancellation mid-clip can be exercised.
#[derive(Debug, Clone, Default)]
pub struct MockAudioOutput {
    written: Arc<Mutex<Vec<i16>>>,
    write_delay: Option<Duration>,
}

impl MockAudioOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long on every write, simulating device pacing.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// All samples written so far, across clips.
    pub fn written_samples(&self) -> Vec<i16> {
        self.written
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn written_len(&self) -> usize {
        self.written
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl AudioOutput for MockAudioOutput {
    fn write(&mut self, samples: &[i16], _spec: &hound::WavSpec) -> Result<()> {
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }
        self.written
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(samples);
        Ok(())
    }
}

#[cfg(feature = "playback")]
pub use cpal_output::CpalAudioOutput;

#[cfg(feature = "playback")]
mod cpal_output {
    use super::AudioOutput;
    use crate::error::{DiktatError, Result};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use crossbeam_channel::{Receiver, Sender, bounded};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    /// Samples queued ahead of the device callback before `write` blocks.
    const QUEUE_HIGH_WATERMARK: usize = 48_000;

    enum DeviceCommand {
        Samples(Vec<f32>),
        Flush(Sender<()>),
    }

    /// Playback device backed by the default cpal output stream.
    ///
    /// The cpal stream is not `Send`, so a dedicated thread owns the device
    /// and stream; this handle only carries a command channel and stays
    /// movable between playback threads.
    pub struct CpalAudioOutput {
        commands: Sender<DeviceCommand>,
        device_rate: u32,
    }

    impl CpalAudioOutput {
        /// Open the default output device.
        pub fn new() -> Result<Self> {
            let (ready_tx, ready_rx) = bounded(1);
            let (command_tx, command_rx) = bounded::<DeviceCommand>(8);

            thread::Builder::new()
                .name("diktat-audio-device".to_string())
                .spawn(move || device_thread(ready_tx, command_rx))
                .map_err(|e| DiktatError::AudioOutput {
                    message: format!("failed to spawn device thread: {}", e),
                })?;

            let device_rate = ready_rx
                .recv_timeout(Duration::from_secs(5))
                .map_err(|_| DiktatError::AudioOutput {
                    message: "audio device thread did not start".to_string(),
                })?
                .map_err(|message| DiktatError::AudioOutput { message })?;

            Ok(Self {
                commands: command_tx,
                device_rate,
            })
        }
    }

    impl AudioOutput for CpalAudioOutput {
        fn write(&mut self, samples: &[i16], spec: &hound::WavSpec) -> Result<()> {
            // downmix to mono, then resample to the device rate
            let channels = usize::from(spec.channels.max(1));
            let mono: Vec<f32> = samples
                .chunks(channels)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                    (sum / frame.len() as i32) as f32 / 32768.0
                })
                .collect();

            let resampled = resample(&mono, spec.sample_rate, self.device_rate);

            self.commands
                .send(DeviceCommand::Samples(resampled))
                .map_err(|_| DiktatError::AudioOutput {
                    message: "audio device thread is gone".to_string(),
                })
        }

        fn flush(&mut self) -> Result<()> {
            let (ack_tx, ack_rx) = bounded(1);
            self.commands
                .send(DeviceCommand::Flush(ack_tx))
                .map_err(|_| DiktatError::AudioOutput {
                    message: "audio device thread is gone".to_string(),
                })?;
            ack_rx.recv().map_err(|_| DiktatError::AudioOutput {
                message: "audio device thread is gone".to_string(),
            })
        }
    }

    /// Owns the cpal device and stream; drains a shared queue into the
    /// stream callback.
    fn device_thread(
        ready_tx: Sender<std::result::Result<u32, String>>,
        command_rx: Receiver<DeviceCommand>,
    ) {
        let host = cpal::default_host();
        let Some(device) = host.default_output_device() else {
            let _ = ready_tx.send(Err("no default output device".to_string()));
            return;
        };

        let config = match device.default_output_config() {
            Ok(c) => c,
            Err(e) => {
                let _ = ready_tx.send(Err(format!("no default output config: {}", e)));
                return;
            }
        };
        let device_rate = config.sample_rate().0;
        let device_channels = usize::from(config.channels());

        let queue: Arc<Mutex<VecDeque<f32>>> = Arc::new(Mutex::new(VecDeque::new()));
        let callback_queue = queue.clone();

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let mut queue = callback_queue.lock().unwrap_or_else(|e| e.into_inner());
                for frame in data.chunks_mut(device_channels) {
                    let sample = queue.pop_front().unwrap_or(0.0);
                    for slot in frame {
                        *slot = sample;
                    }
                }
            },
            |e| log::error!("audio stream error: {}", e),
            None,
        );

        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                let _ = ready_tx.send(Err(format!("failed to build output stream: {}", e)));
                return;
            }
        };
        if let Err(e) = stream.play() {
            let _ = ready_tx.send(Err(format!("failed to start output stream: {}", e)));
            return;
        }

        let _ = ready_tx.send(Ok(device_rate));

        while let Ok(command) = command_rx.recv() {
            match command {
                DeviceCommand::Samples(samples) => {
                    {
                        let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
                        queue.extend(samples);
                    }
                    // backpressure: keep at most the watermark queued
                    loop {
                        let queued = queue.lock().unwrap_or_else(|e| e.into_inner()).len();
                        if queued <= QUEUE_HIGH_WATERMARK {
                            break;
                        }
                        thread::sleep(Duration::from_millis(10));
                    }
                }
                DeviceCommand::Flush(ack) => {
                    loop {
                        let queued = queue.lock().unwrap_or_else(|e| e.into_inner()).len();
                        if queued == 0 {
                            break;
                        }
                        thread::sleep(Duration::from_millis(10));
                    }
                    let _ = ack.send(());
                }
            }
        }
        // command sender dropped: stop the stream and exit
        drop(stream);
    }

    /// Linear interpolation resampling.
    fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
        if from_rate == to_rate || samples.is_empty() {
            return samples.to_vec();
        }

        let ratio = f64::from(from_rate) / f64::from(to_rate);
        let output_len = (samples.len() as f64 / ratio).ceil() as usize;

        (0..output_len)
            .map(|i| {
                let source_pos = i as f64 * ratio;
                let source_idx = source_pos.floor() as usize;
                let fraction = (source_pos - source_idx as f64) as f32;

                if source_idx + 1 >= samples.len() {
                    samples[samples.len() - 1]
                } else {
                    let left = samples[source_idx];
                    let right = samples[source_idx + 1];
                    left + (right - left) * fraction
                }
            })
            .collect()
    }

}
