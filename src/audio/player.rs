//! Background audio playback with pause-at-frame and resume.
//!
//! One clip plays at a time on a background thread. Pausing cancels the
//! thread via an atomic flag; the thread records the frame it reached and
//! reports a tagged outcome over a channel, which is also what unblocks a
//! controller waiting in [`AudioPlaybackEngine::wait_until_over`].
//! Cancellation takes effect at the next chunk boundary.

use crate::audio::buffer::{AudioBuffer, PcmClip};
use crate::audio::output::AudioOutput;
use crate::defaults;
use crate::error::Result;
use crossbeam_channel::{Receiver, bounded};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How one playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The clip played to its end.
    Completed,
    /// Playback was cancelled; `frame` is the first frame not played.
    Cancelled { frame: u64 },
}

/// Engine state visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

struct EngineInner {
    state: PlaybackState,
    /// Decoded clip kept for resume after pause.
    pending: Option<Arc<PcmClip>>,
    resume_frame: u64,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<Arc<AtomicU64>>,
    handle: Option<JoinHandle<()>>,
    outcome_rx: Option<Receiver<PlaybackOutcome>>,
}

impl EngineInner {
    fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            pending: None,
            resume_frame: 0,
            cancel: None,
            progress: None,
            handle: None,
            outcome_rx: None,
        }
    }

    /// Cancel and join any running playback thread. Returns the frame the
    /// thread reached, or 0 when nothing was running.
    fn halt(&mut self) -> u64 {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::SeqCst);
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("playback thread panicked");
        }
        self.progress
            .take()
            .map(|p| p.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

/// Plays one audio buffer at a time on a background thread.
///
/// Cloning yields another handle onto the same engine, so pause/stop can
/// be driven from a different thread than the one blocked in
/// [`wait_until_over`](Self::wait_until_over).
#[derive(Clone)]
pub struct AudioPlaybackEngine {
    inner: Arc<Mutex<EngineInner>>,
    output: Arc<Mutex<Box<dyn AudioOutput>>>,
}

impl AudioPlaybackEngine {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner::new())),
            output: Arc::new(Mutex::new(output)),
        }
    }

    /// Start playback of a buffer, stopping any current playback first.
    ///
    /// An empty buffer is a no-op: the next [`wait_until_over`] call
    /// reports completion immediately.
    ///
    /// # Errors
    /// `AudioDecode` when the buffer cannot be decoded; the engine is left
    /// idle.
    pub fn play(&self, buffer: &AudioBuffer) -> Result<()> {
        let mut inner = self.lock_inner();
        inner.halt();
        inner.pending = None;
        inner.resume_frame = 0;
        inner.state = PlaybackState::Idle;

        if buffer.is_empty() {
            log::debug!("playback of empty buffer is a no-op");
            let (tx, rx) = bounded(1);
            let _ = tx.send(PlaybackOutcome::Completed);
            inner.outcome_rx = Some(rx);
            return Ok(());
        }

        let clip = Arc::new(buffer.decode_pcm()?);
        inner.pending = Some(clip.clone());
        self.start_locked(&mut inner, clip, 0);
        Ok(())
    }

    /// Cancel playback, remembering the frame reached for [`resume`](Self::resume).
    pub fn pause(&self) {
        let mut inner = self.lock_inner();
        if inner.state != PlaybackState::Playing {
            return;
        }

        let frame = inner.halt();
        inner.resume_frame = frame;
        inner.state = PlaybackState::Paused;
        log::debug!("playback paused at frame {}", frame);
    }

    /// Restart a paused clip at the frame where pause caught it.
    pub fn resume(&self) {
        let mut inner = self.lock_inner();
        if inner.state != PlaybackState::Paused {
            return;
        }

        if let Some(clip) = inner.pending.clone() {
            let frame = inner.resume_frame;
            log::debug!("resuming playback at frame {}", frame);
            self.start_locked(&mut inner, clip, frame);
        } else {
            inner.state = PlaybackState::Idle;
        }
    }

    /// Halt playback unconditionally and discard the resume position.
    pub fn stop(&self) {
        let mut inner = self.lock_inner();
        inner.halt();
        inner.pending = None;
        inner.resume_frame = 0;
        inner.state = PlaybackState::Idle;
    }

    /// True while the background playback thread is alive and not cancelled.
    pub fn is_playing(&self) -> bool {
        let inner = self.lock_inner();
        inner.state == PlaybackState::Playing
            && inner
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    pub fn state(&self) -> PlaybackState {
        self.lock_inner().state
    }

    /// Block until playback ends naturally, is cancelled, or the timeout
    /// elapses.
    ///
    /// This is the synchronization point between clips: a cancellation
    /// from [`pause`](Self::pause) unblocks this call with the frame
    /// offset reached. A timeout is reported as completion; the clip may
    /// still be audible, and a subsequent `play` will stop it.
    pub fn wait_until_over(&self, timeout: Option<Duration>) -> PlaybackOutcome {
        let rx = {
            let inner = self.lock_inner();
            match inner.outcome_rx.clone() {
                Some(rx) => rx,
                None => return PlaybackOutcome::Completed,
            }
        };

        let outcome = match timeout {
            Some(limit) => match rx.recv_timeout(limit) {
                Ok(outcome) => outcome,
                Err(_) => return PlaybackOutcome::Completed,
            },
            None => rx.recv().unwrap_or(PlaybackOutcome::Completed),
        };

        if outcome == PlaybackOutcome::Completed {
            let mut inner = self.lock_inner();
            // pause/stop may have transitioned the state already
            if inner.state == PlaybackState::Playing {
                inner.halt();
                inner.pending = None;
                inner.resume_frame = 0;
                inner.state = PlaybackState::Idle;
            }
        }

        outcome
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn start_locked(&self, inner: &mut EngineInner, clip: Arc<PcmClip>, start_frame: u64) {
        let cancel = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(AtomicU64::new(start_frame));
        let (tx, rx) = bounded(1);
        let output = self.output.clone();

        let thread_cancel = cancel.clone();
        let thread_progress = progress.clone();
        let handle = thread::spawn(move || {
            let outcome = run_clip(&clip, start_frame, &thread_cancel, &thread_progress, &output);
            let _ = tx.send(outcome);
        });

        inner.cancel = Some(cancel);
        inner.progress = Some(progress);
        inner.handle = Some(handle);
        inner.outcome_rx = Some(rx);
        inner.state = PlaybackState::Playing;
    }
}

/// Play one clip chunk by chunk, checking for cancellation between chunks.
fn run_clip(
    clip: &PcmClip,
    start_frame: u64,
    cancel: &AtomicBool,
    progress: &AtomicU64,
    output: &Arc<Mutex<Box<dyn AudioOutput>>>,
) -> PlaybackOutcome {
    let channels = usize::from(clip.spec.channels.max(1));
    let total_frames = clip.frames();
    let mut frame = start_frame.min(total_frames);
    progress.store(frame, Ordering::SeqCst);

    log::debug!(
        "starting playback at frame {} of {} ({} Hz)",
        frame,
        total_frames,
        clip.spec.sample_rate
    );

    while frame < total_frames {
        if cancel.load(Ordering::SeqCst) {
            return PlaybackOutcome::Cancelled { frame };
        }

        let end = (frame + defaults::PLAYBACK_CHUNK_FRAMES as u64).min(total_frames);
        let chunk = &clip.samples[frame as usize * channels..end as usize * channels];

        {
            let mut output = output.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = output.write(chunk, &clip.spec) {
                log::error!("audio output write failed: {}", e);
                return PlaybackOutcome::Completed;
            }
        }

        frame = end;
        progress.store(frame, Ordering::SeqCst);
    }

    {
        let mut output = output.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = output.flush() {
            log::error!("audio output flush failed: {}", e);
        }
    }

    log::debug!("playback finished");
    PlaybackOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::{AudioEncoding, wav_from_samples};
    use crate::audio::output::MockAudioOutput;

    fn buffer_with_frames(frames: usize) -> AudioBuffer {
        let samples: Vec<i16> = (0..frames).map(|i| (i % 100) as i16).collect();
        AudioBuffer::new(wav_from_samples(&samples, 16000), AudioEncoding::Linear16)
    }

    fn engine_with_mock() -> (AudioPlaybackEngine, MockAudioOutput) {
        let output = MockAudioOutput::new();
        let engine = AudioPlaybackEngine::new(Box::new(output.clone()));
        (engine, output)
    }

    #[test]
    fn plays_whole_clip_and_completes() {
        let (engine, output) = engine_with_mock();
        let buffer = buffer_with_frames(4000);

        engine.play(&buffer).unwrap();
        let outcome = engine.wait_until_over(None);

        assert_eq!(outcome, PlaybackOutcome::Completed);
        assert_eq!(output.written_len(), 4000);
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert!(!engine.is_playing());
    }

    #[test]
    fn empty_buffer_is_a_noop() {
        let (engine, output) = engine_with_mock();
        let buffer = AudioBuffer::empty(AudioEncoding::Linear16);

        engine.play(&buffer).unwrap();
        let outcome = engine.wait_until_over(None);

        assert_eq!(outcome, PlaybackOutcome::Completed);
        assert_eq!(output.written_len(), 0);
    }

    #[test]
    fn undecodable_buffer_errors_and_stays_idle() {
        let (engine, _) = engine_with_mock();
        let buffer = AudioBuffer::new(vec![0u8; 32], AudioEncoding::Linear16);

        assert!(engine.play(&buffer).is_err());
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert!(!engine.is_playing());
    }

    #[test]
    fn pause_records_frame_and_wait_reports_cancellation() {
        let output = MockAudioOutput::new().with_write_delay(Duration::from_millis(5));
        let engine = AudioPlaybackEngine::new(Box::new(output.clone()));
        // 20 chunks at 5ms each gives pause plenty of clip to interrupt
        let buffer = buffer_with_frames(defaults::PLAYBACK_CHUNK_FRAMES * 20);

        engine.play(&buffer).unwrap();

        let waiter = {
            let engine = engine.clone();
            thread::spawn(move || engine.wait_until_over(None))
        };

        thread::sleep(Duration::from_millis(20));
        engine.pause();

        let outcome = waiter.join().unwrap();
        match outcome {
            PlaybackOutcome::Cancelled { frame } => {
                assert!(frame > 0, "some frames should have played");
                assert!(
                    frame < defaults::PLAYBACK_CHUNK_FRAMES as u64 * 20,
                    "cancellation should land mid-clip"
                );
            }
            PlaybackOutcome::Completed => panic!("expected cancellation"),
        }
        assert_eq!(engine.state(), PlaybackState::Paused);
    }

    #[test]
    fn resume_continues_at_recorded_frame_without_replaying() {
        let output = MockAudioOutput::new().with_write_delay(Duration::from_millis(2));
        let engine = AudioPlaybackEngine::new(Box::new(output.clone()));
        let total = defaults::PLAYBACK_CHUNK_FRAMES * 10;
        let buffer = buffer_with_frames(total);

        engine.play(&buffer).unwrap();
        thread::sleep(Duration::from_millis(5));
        engine.pause();

        let written_at_pause = output.written_len();
        assert!(written_at_pause > 0 && written_at_pause < total);

        engine.resume();
        let outcome = engine.wait_until_over(None);

        assert_eq!(outcome, PlaybackOutcome::Completed);
        // every frame written exactly once
        assert_eq!(output.written_len(), total);
    }

    #[test]
    fn stop_discards_resume_position() {
        let output = MockAudioOutput::new().with_write_delay(Duration::from_millis(2));
        let engine = AudioPlaybackEngine::new(Box::new(output));
        let buffer = buffer_with_frames(defaults::PLAYBACK_CHUNK_FRAMES * 10);

        engine.play(&buffer).unwrap();
        thread::sleep(Duration::from_millis(5));
        engine.stop();

        assert_eq!(engine.state(), PlaybackState::Idle);
        // resume after stop has nothing to do
        engine.resume();
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[test]
    fn play_preempts_running_playback() {
        let output = MockAudioOutput::new().with_write_delay(Duration::from_millis(2));
        let engine = AudioPlaybackEngine::new(Box::new(output.clone()));

        engine.play(&buffer_with_frames(defaults::PLAYBACK_CHUNK_FRAMES * 50)).unwrap();
        thread::sleep(Duration::from_millis(5));

        // second play stops the first clip; no overlap
        let short = 100;
        engine.play(&buffer_with_frames(short)).unwrap();
        let outcome = engine.wait_until_over(None);

        assert_eq!(outcome, PlaybackOutcome::Completed);
        assert!(output.written_len() < defaults::PLAYBACK_CHUNK_FRAMES * 50 + short);
    }

    #[test]
    fn wait_with_timeout_returns_while_clip_runs() {
        let output = MockAudioOutput::new().with_write_delay(Duration::from_millis(20));
        let engine = AudioPlaybackEngine::new(Box::new(output));
        let buffer = buffer_with_frames(defaults::PLAYBACK_CHUNK_FRAMES * 20);

        engine.play(&buffer).unwrap();
        let outcome = engine.wait_until_over(Some(Duration::from_millis(10)));

        assert_eq!(outcome, PlaybackOutcome::Completed);
        engine.stop();
    }

    #[test]
    fn wait_when_idle_completes_immediately() {
        let (engine, _) = engine_with_mock();
        assert_eq!(engine.wait_until_over(None), PlaybackOutcome::Completed);
    }
}
