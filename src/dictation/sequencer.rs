//! The dictation state machine.
//!
//! One controlling thread drives the sequencer; each clip plays on the
//! engine's background thread so the controller can block in
//! `wait_until_over` while a [`DictationControls`] handle on another
//! thread pauses, resumes, or stops the session. Pause unwinds the
//! current iteration through an internal flow value, never through an
//! error, and leaves the resume position behind in the shared session
//! state.

use crate::audio::buffer::{AudioBuffer, AudioEncoding};
use crate::audio::merger::AudioStreamMerger;
use crate::audio::output::AudioOutput;
use crate::audio::player::{AudioPlaybackEngine, PlaybackOutcome};
use crate::defaults;
use crate::dictation::options::DictateOptions;
use crate::error::Result;
use crate::nlp::parser::ConstituencyParser;
use crate::nlp::processor::{NlpProcessor, Sentence};
use crate::tts::cache::AudioCache;
use crate::tts::synthesizer::Synthesizer;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// The sequencer's resume point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackPosition {
    pub sentence_index: usize,
    pub part_index: usize,
}

/// Session state shared between the sequencer and its control handle.
#[derive(Debug, Default)]
struct SessionState {
    position: PlaybackPosition,
    paused: bool,
    /// Set by resume so the next full-text run keeps the stored position
    /// instead of starting over.
    resume_pending: bool,
}

/// How one dictation iteration ended. Internal only; interruption never
/// surfaces as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Finished,
    Interrupted,
}

/// One deferred piece of the render output; gaps are resolved to silence
/// once the session sample rate is known.
enum RenderItem {
    Clip(Vec<u8>),
    Gap(u32),
}

/// Cross-thread handle for pausing, resuming, and stopping a running
/// dictation.
#[derive(Clone)]
pub struct DictationControls {
    session: Arc<Mutex<SessionState>>,
    player: AudioPlaybackEngine,
}

impl DictationControls {
    /// Pause the session. The sequencer records its position and returns
    /// from the running dictation call; playback can resume at the exact
    /// frame reached.
    pub fn pause_dictate(&self) {
        lock(&self.session).paused = true;
        self.player.pause();
    }

    /// Clear the pause flag and un-pause the engine. The next dictation
    /// call continues from the stored position.
    pub fn resume_dictate(&self) {
        let mut session = lock(&self.session);
        session.paused = false;
        session.resume_pending = true;
        drop(session);
        self.player.resume();
    }

    /// Abort the session and reset the position to the very start.
    pub fn stop_dictate(&self) {
        let mut session = lock(&self.session);
        session.paused = true;
        session.resume_pending = false;
        session.position = PlaybackPosition::default();
        drop(session);
        self.player.stop();
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.session).paused
    }

    pub fn position(&self) -> PlaybackPosition {
        lock(&self.session).position
    }
}

/// Walks sentences and parts, playing synthesized audio per the session
/// options, or rendering the whole session to one merged WAV buffer.
pub struct DictationSequencer {
    text: String,
    text_changed: bool,
    sentences: Vec<Sentence>,
    options: DictateOptions,
    parser: Arc<dyn ConstituencyParser>,
    synthesizer: Arc<dyn Synthesizer>,
    processor: NlpProcessor,
    cache: AudioCache,
    player: AudioPlaybackEngine,
    session: Arc<Mutex<SessionState>>,
}

impl DictationSequencer {
    pub fn new(
        text: &str,
        options: DictateOptions,
        parser: Arc<dyn ConstituencyParser>,
        synthesizer: Arc<dyn Synthesizer>,
        output: Box<dyn AudioOutput>,
    ) -> Self {
        let options = options.sanitized();
        let processor = NlpProcessor::new(
            parser.clone(),
            options.language,
            options.pronounce_punctuation,
            options.target_part_length,
            options.max_part_length,
        );
        let cache = AudioCache::new(
            synthesizer.clone(),
            AudioEncoding::Linear16,
            options.voice.clone(),
            options.speaking_speed,
        );
        Self {
            text: text.to_string(),
            text_changed: true,
            sentences: Vec::new(),
            options,
            parser,
            synthesizer,
            processor,
            cache,
            player: AudioPlaybackEngine::new(output),
            session: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Handle for controlling the session from another thread.
    pub fn controls(&self) -> DictationControls {
        DictationControls {
            session: self.session.clone(),
            player: self.player.clone(),
        }
    }

    /// Replace the dictation text. Resets the position; the text is
    /// re-segmented on the next dictation call.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.text_changed = true;
        let mut session = lock(&self.session);
        session.position = PlaybackPosition::default();
        session.paused = false;
        session.resume_pending = false;
    }

    /// Apply new options, rebuilding only what the changed fields feed
    /// into: a language change invalidates both the segmentation and the
    /// audio cache, length and punctuation changes only the segmentation,
    /// voice and speed changes only the cache.
    pub fn set_options(&mut self, options: DictateOptions) {
        let options = options.sanitized();
        if options == self.options {
            return;
        }
        let old = std::mem::replace(&mut self.options, options);
        let new = &self.options;

        if old.language != new.language {
            self.processor = NlpProcessor::new(
                self.parser.clone(),
                new.language,
                new.pronounce_punctuation,
                new.target_part_length,
                new.max_part_length,
            );
            self.rebuild_cache();
            self.text_changed = true;
            return;
        }

        if old.target_part_length != new.target_part_length
            || old.max_part_length != new.max_part_length
        {
            self.processor
                .set_part_lengths(new.target_part_length, new.max_part_length);
            self.text_changed = true;
        }
        if old.pronounce_punctuation != new.pronounce_punctuation {
            self.processor
                .set_pronounce_punctuation(new.pronounce_punctuation);
            self.text_changed = true;
        }
        if old.voice != new.voice || old.speaking_speed != new.speaking_speed {
            self.rebuild_cache();
        }
    }

    pub fn options(&self) -> &DictateOptions {
        &self.options
    }

    /// The segmented sentences for the current text.
    ///
    /// # Errors
    /// `ParseStructure` when the parser or bracketer rejects the text.
    pub fn sentences(&mut self) -> Result<&[Sentence]> {
        self.ensure_parsed()?;
        Ok(&self.sentences)
    }

    /// Dictate the whole text from the stored position.
    ///
    /// Fresh runs start at the beginning; after a pause the stored
    /// position is kept and the pause flag cleared. Returns once the text
    /// is done or the session was paused or stopped.
    ///
    /// # Errors
    /// Only structural parse errors; pause and stop are not errors.
    pub fn dictate_full_text(&mut self) -> Result<()> {
        self.ensure_parsed()?;

        let resuming = {
            let mut session = lock(&self.session);
            if session.paused || session.resume_pending {
                session.paused = false;
                session.resume_pending = false;
                true
            } else {
                session.position = PlaybackPosition::default();
                false
            }
        };

        // Full-text pre-roll has no sub-position; it only plays on a
        // fresh run.
        if self.options.read_full_dictate_once && !resuming {
            for sentence in &self.sentences {
                if self.play_clip(&sentence.full_text()) == Flow::Interrupted {
                    return Ok(());
                }
            }
        }

        let start = lock(&self.session).position.sentence_index;
        for index in start..self.sentences.len() {
            lock(&self.session).position.sentence_index = index;
            if self.dictate_sentence(&self.sentences[index]) == Flow::Interrupted {
                return Ok(());
            }

            // the sentence is done; a pause during the gap resumes at the
            // next one
            {
                let mut session = lock(&self.session);
                session.position.sentence_index = index + 1;
                session.position.part_index = 0;
            }

            if self.sleep_interruptible(self.options.pause_between_sentences) == Flow::Interrupted {
                return Ok(());
            }
        }

        lock(&self.session).position = PlaybackPosition::default();
        Ok(())
    }

    /// Step back one sentence and dictate it.
    pub fn dictate_previous_sentence(&mut self) -> Result<()> {
        self.ensure_parsed()?;
        let index = {
            let mut session = lock(&self.session);
            if session.position.sentence_index == 0 {
                return Ok(());
            }
            session.paused = false;
            session.resume_pending = false;
            session.position.part_index = 0;
            session.position.sentence_index -= 1;
            session.position.sentence_index
        };
        self.dictate_sentence_at(index)
    }

    /// Dictate the sentence at the current position again.
    pub fn dictate_current_sentence(&mut self) -> Result<()> {
        self.ensure_parsed()?;
        let index = {
            let mut session = lock(&self.session);
            if session.position.sentence_index >= self.sentences.len() {
                return Ok(());
            }
            session.paused = false;
            session.resume_pending = false;
            session.position.part_index = 0;
            session.position.sentence_index
        };
        self.dictate_sentence_at(index)
    }

    /// Advance one sentence and dictate it.
    pub fn dictate_next_sentence(&mut self) -> Result<()> {
        self.ensure_parsed()?;
        let index = {
            let mut session = lock(&self.session);
            if session.position.sentence_index + 1 >= self.sentences.len() {
                return Ok(());
            }
            session.paused = false;
            session.resume_pending = false;
            session.position.part_index = 0;
            session.position.sentence_index += 1;
            session.position.sentence_index
        };
        self.dictate_sentence_at(index)
    }

    /// See [`DictationControls::pause_dictate`].
    pub fn pause_dictate(&self) {
        self.controls().pause_dictate();
    }

    /// See [`DictationControls::resume_dictate`].
    pub fn resume_dictate(&self) {
        self.controls().resume_dictate();
    }

    /// See [`DictationControls::stop_dictate`].
    pub fn stop_dictate(&self) {
        self.controls().stop_dictate();
    }

    pub fn position(&self) -> PlaybackPosition {
        lock(&self.session).position
    }

    /// Render the whole configured session to one merged WAV buffer
    /// without touching the playback engine.
    ///
    /// Repetition gaps become silence of `pause_between_repetitions`;
    /// between sentences the remainder `pause_between_sentences -
    /// pause_between_repetitions` (floored at zero) is inserted. Gaps are
    /// quantized to [`defaults::SILENCE_UNIT_MS`] units, at least one
    /// unit when the gap is positive.
    ///
    /// # Errors
    /// Only structural parse errors; synthesis and merge failures reduce
    /// to empty audio.
    pub fn generate_audio_from_dictate(&mut self) -> Result<Vec<u8>> {
        self.ensure_parsed()?;

        let mut items = Vec::new();

        if self.options.read_full_dictate_once {
            for sentence in &self.sentences {
                items.push(RenderItem::Clip(self.render_clip(&sentence.full_text())));
            }
        }

        let sentence_gap = silence_units(
            self.options
                .pause_between_sentences
                .saturating_sub(self.options.pause_between_repetitions),
        );
        for sentence in &self.sentences {
            let before = items.len();
            self.render_sentence(sentence, &mut items);
            if items.len() > before && sentence_gap > 0 {
                items.push(RenderItem::Gap(sentence_gap));
            }
        }

        // Silence must match the synthesized sample rate; probe the first
        // decodable clip and fall back to the nominal rate.
        let rate = items
            .iter()
            .find_map(|item| match item {
                RenderItem::Clip(bytes) if !bytes.is_empty() => {
                    AudioBuffer::new(bytes.clone(), AudioEncoding::Linear16)
                        .decode_pcm()
                        .ok()
                        .map(|clip| clip.spec.sample_rate)
                }
                _ => None,
            })
            .unwrap_or(defaults::SAMPLE_RATE);

        let streams: Vec<Vec<u8>> = items
            .into_iter()
            .map(|item| match item {
                RenderItem::Clip(bytes) => bytes,
                RenderItem::Gap(units) => AudioStreamMerger::silence(units, rate),
            })
            .collect();

        Ok(AudioStreamMerger::merge(&streams))
    }

    fn dictate_sentence_at(&mut self, index: usize) -> Result<()> {
        // sentence stepping ignores interruption; the position is current
        let _ = self.dictate_sentence(&self.sentences[index]);
        Ok(())
    }

    /// Dictate one sentence: optional full read, then each part
    /// `part_repetitions + 1` times, then an optional closing full read.
    /// Checks the pause flag after every single playback.
    fn dictate_sentence(&self, sentence: &Sentence) -> Flow {
        let start_part = lock(&self.session).position.part_index;

        if self.options.read_full_sentence_at_start && start_part == 0 {
            if self.play_clip(&sentence.full_text()) == Flow::Interrupted {
                return Flow::Interrupted;
            }
        }

        for (index, part) in sentence.parts.iter().enumerate().skip(start_part) {
            for _ in 0..=self.options.part_repetitions {
                if self.play_clip(part) == Flow::Interrupted {
                    lock(&self.session).position.part_index = index;
                    return Flow::Interrupted;
                }

                if self.sleep_interruptible(self.options.pause_between_repetitions)
                    == Flow::Interrupted
                {
                    lock(&self.session).position.part_index = index;
                    return Flow::Interrupted;
                }

                lock(&self.session).position.part_index = 0;
            }
        }

        if self.options.read_full_sentence_at_end {
            if self.play_clip(&sentence.full_text()) == Flow::Interrupted {
                return Flow::Interrupted;
            }
        }

        Flow::Finished
    }

    /// Play one clip to the end, or to the pause that cut it short.
    /// Synthesis and decode failures reduce to a skipped clip.
    fn play_clip(&self, text: &str) -> Flow {
        let audio = match self.cache.get_audio(text) {
            Ok(audio) => audio,
            Err(e) => {
                log::error!("no audio for \"{}\": {}", text, e);
                return self.check_paused();
            }
        };

        log::debug!("playing back audio for \"{}\"", text);
        if let Err(e) = self.player.play(&audio) {
            log::error!("cannot play audio for \"{}\": {}", text, e);
            return self.check_paused();
        }

        match self.player.wait_until_over(None) {
            PlaybackOutcome::Cancelled { .. } => Flow::Interrupted,
            PlaybackOutcome::Completed => self.check_paused(),
        }
    }

    fn check_paused(&self) -> Flow {
        if lock(&self.session).paused {
            Flow::Interrupted
        } else {
            Flow::Finished
        }
    }

    /// Sleep between clips; pause takes effect at this boundary too.
    fn sleep_interruptible(&self, duration: Duration) -> Flow {
        if duration > Duration::ZERO {
            thread::sleep(duration);
        }
        self.check_paused()
    }

    /// Render the audio of one sentence in live-mode ordering.
    fn render_sentence(&self, sentence: &Sentence, items: &mut Vec<RenderItem>) {
        let repetition_gap = silence_units(self.options.pause_between_repetitions);

        if self.options.read_full_sentence_at_start {
            items.push(RenderItem::Clip(self.render_clip(&sentence.full_text())));
        }

        for part in &sentence.parts {
            for _ in 0..=self.options.part_repetitions {
                let clip = self.render_clip(part);
                let audible = !clip.is_empty();
                items.push(RenderItem::Clip(clip));
                if audible && repetition_gap > 0 {
                    items.push(RenderItem::Gap(repetition_gap));
                }
            }
        }

        if self.options.read_full_sentence_at_end {
            items.push(RenderItem::Clip(self.render_clip(&sentence.full_text())));
        }
    }

    fn render_clip(&self, text: &str) -> Vec<u8> {
        match self.cache.get_audio(text) {
            Ok(audio) => audio.into_bytes(),
            Err(e) => {
                log::error!("no audio for \"{}\": {}", text, e);
                Vec::new()
            }
        }
    }

    fn rebuild_cache(&mut self) {
        self.cache = AudioCache::new(
            self.synthesizer.clone(),
            AudioEncoding::Linear16,
            self.options.voice.clone(),
            self.options.speaking_speed,
        );
    }

    fn ensure_parsed(&mut self) -> Result<()> {
        if self.text_changed {
            self.sentences = if self.text.trim().is_empty() {
                Vec::new()
            } else {
                self.processor.dissect_text(&self.text)?
            };
            self.text_changed = false;
            log::info!("segmented text into {} sentences", self.sentences.len());
        }
        Ok(())
    }
}

fn lock(session: &Arc<Mutex<SessionState>>) -> MutexGuard<'_, SessionState> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}

/// Quantize a gap to 500 ms silence units; positive gaps get at least one.
fn silence_units(gap: Duration) -> u32 {
    if gap.is_zero() {
        return 0;
    }
    let units = (gap.as_millis() as f64 / defaults::SILENCE_UNIT_MS as f64).round() as u32;
    units.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::MockAudioOutput;
    use crate::nlp::parser::FlatParser;
    use crate::tts::synthesizer::MockSynthesizer;

    fn test_options() -> DictateOptions {
        DictateOptions {
            read_full_dictate_once: false,
            read_full_sentence_at_start: false,
            read_full_sentence_at_end: false,
            part_repetitions: 1,
            pause_between_repetitions: Duration::ZERO,
            pause_between_sentences: Duration::ZERO,
            ..DictateOptions::default()
        }
    }

    fn sequencer(text: &str, options: DictateOptions) -> (DictationSequencer, Arc<MockSynthesizer>) {
        let synthesizer = Arc::new(MockSynthesizer::new());
        let sequencer = DictationSequencer::new(
            text,
            options,
            Arc::new(FlatParser),
            synthesizer.clone(),
            Box::new(MockAudioOutput::new()),
        );
        (sequencer, synthesizer)
    }

    #[test]
    fn full_text_dictation_plays_all_parts_and_resets_position() {
        let (mut sequencer, synthesizer) = sequencer("Eins zwei. Drei vier.", test_options());

        sequencer.dictate_full_text().unwrap();

        // 2 sentences x 1 part x (1 repetition + 1) distinct plays,
        // second play per part served from cache
        assert_eq!(synthesizer.call_count(), 2);
        assert_eq!(sequencer.position(), PlaybackPosition::default());
    }

    #[test]
    fn full_sentence_reads_add_joined_text_clips() {
        let options = DictateOptions {
            read_full_sentence_at_start: true,
            read_full_sentence_at_end: true,
            ..test_options()
        };
        let (mut sequencer, synthesizer) =
            sequencer("Der alte Fuchs lief schnell durch den dunklen Wald davon.", options);

        let part_count = sequencer.sentences().unwrap()[0].parts.len();
        assert!(part_count > 1, "text must segment into several parts");

        sequencer.dictate_full_text().unwrap();

        // every part once plus the joined full-sentence text; the closing
        // full read is served from the cache
        assert_eq!(synthesizer.call_count(), part_count + 1);
    }

    #[test]
    fn zero_repetitions_speak_each_part_exactly_once() {
        let options = DictateOptions {
            part_repetitions: 0,
            ..test_options()
        };
        let output = MockAudioOutput::new();
        let sink = output.clone();
        let mut sequencer = DictationSequencer::new(
            "Eins zwei.",
            options,
            Arc::new(FlatParser),
            Arc::new(MockSynthesizer::new()),
            Box::new(output),
        );

        sequencer.dictate_full_text().unwrap();

        // the single 10-char part at 10ms per char at 16kHz, played once
        assert_eq!(sink.written_len(), 10 * 160);
    }

    #[test]
    fn pause_in_the_sentence_gap_resumes_at_the_next_sentence() {
        let options = DictateOptions {
            part_repetitions: 0,
            pause_between_sentences: Duration::from_millis(60),
            ..test_options()
        };
        let output = MockAudioOutput::new();
        let sink = output.clone();
        let mut sequencer = DictationSequencer::new(
            "Eins zwei. Drei vier.",
            options,
            Arc::new(FlatParser),
            Arc::new(MockSynthesizer::new()),
            Box::new(output),
        );
        sequencer.sentences().unwrap();
        let controls = sequencer.controls();

        let pauser = {
            let controls = controls.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                controls.pause_dictate();
            })
        };

        sequencer.dictate_full_text().unwrap();
        pauser.join().unwrap();

        // the first sentence finished before the pause landed in the gap
        assert_eq!(sequencer.position().sentence_index, 1);
        let after_first = sink.written_len();

        controls.resume_dictate();
        sequencer.dictate_full_text().unwrap();

        // only the second sentence plays on resume
        assert_eq!(sink.written_len(), after_first + 10 * 160);
        assert_eq!(sequencer.position(), PlaybackPosition::default());
    }

    #[test]
    fn stop_resets_position_to_start() {
        let (mut sequencer, _) = sequencer("Eins. Zwei. Drei.", test_options());
        sequencer.sentences().unwrap();

        let controls = sequencer.controls();
        controls.stop_dictate();

        assert_eq!(controls.position(), PlaybackPosition::default());
        assert!(controls.is_paused());

        // a fresh run clears the pause flag and starts from the top
        sequencer.dictate_full_text().unwrap();
        assert!(!controls.is_paused());
    }

    #[test]
    fn set_text_resets_position_and_resegments() {
        let (mut sequencer, _) = sequencer("Eins zwei.", test_options());
        assert_eq!(sequencer.sentences().unwrap().len(), 1);

        sequencer.set_text("Eins. Zwei. Drei.");
        assert_eq!(sequencer.sentences().unwrap().len(), 3);
        assert_eq!(sequencer.position(), PlaybackPosition::default());
    }

    #[test]
    fn voice_change_rebuilds_cache_but_keeps_segmentation() {
        let (mut sequencer, synthesizer) = sequencer("Eins zwei.", test_options());
        sequencer.dictate_full_text().unwrap();
        assert_eq!(synthesizer.call_count(), 1);

        let mut options = sequencer.options().clone();
        options.speaking_speed = crate::tts::voice::SpeakingSpeed::Slow;
        sequencer.set_options(options);

        // cache gone, same text synthesized again
        sequencer.dictate_full_text().unwrap();
        assert_eq!(synthesizer.call_count(), 2);
    }

    #[test]
    fn unchanged_options_do_not_invalidate_anything() {
        let (mut sequencer, synthesizer) = sequencer("Eins zwei.", test_options());
        sequencer.dictate_full_text().unwrap();

        let options = sequencer.options().clone();
        sequencer.set_options(options);
        sequencer.dictate_full_text().unwrap();

        assert_eq!(synthesizer.call_count(), 1);
    }

    #[test]
    fn length_change_resegments_text() {
        let (mut sequencer, _) = sequencer("Eins zwei drei vier fünf sechs sieben.", test_options());
        let before = sequencer.sentences().unwrap()[0].parts.len();

        let mut options = sequencer.options().clone();
        options.target_part_length = 5;
        options.max_part_length = 10;
        sequencer.set_options(options);

        let after = sequencer.sentences().unwrap()[0].parts.len();
        assert!(after > before);
    }

    #[test]
    fn next_and_previous_sentence_move_bounds_checked() {
        let (mut sequencer, _) = sequencer("Eins. Zwei. Drei.", test_options());
        sequencer.sentences().unwrap();

        sequencer.dictate_next_sentence().unwrap();
        assert_eq!(sequencer.position().sentence_index, 1);
        sequencer.dictate_next_sentence().unwrap();
        assert_eq!(sequencer.position().sentence_index, 2);
        // already at the last sentence
        sequencer.dictate_next_sentence().unwrap();
        assert_eq!(sequencer.position().sentence_index, 2);

        sequencer.dictate_previous_sentence().unwrap();
        assert_eq!(sequencer.position().sentence_index, 1);
        sequencer.dictate_previous_sentence().unwrap();
        sequencer.dictate_previous_sentence().unwrap();
        assert_eq!(sequencer.position().sentence_index, 0);
    }

    #[test]
    fn render_produces_merged_audio_without_silence_when_pauses_are_zero() {
        let (mut sequencer, _) = sequencer("Eins zwei.", test_options());
        let rendered = sequencer.generate_audio_from_dictate().unwrap();
        assert!(!rendered.is_empty());
    }

    #[test]
    fn render_is_deterministic() {
        let options = DictateOptions {
            read_full_sentence_at_start: true,
            pause_between_repetitions: Duration::from_secs(1),
            pause_between_sentences: Duration::from_secs(3),
            ..test_options()
        };
        let (mut a, _) = sequencer("Eins zwei. Drei vier.", options.clone());
        let (mut b, _) = sequencer("Eins zwei. Drei vier.", options);

        assert_eq!(
            a.generate_audio_from_dictate().unwrap(),
            b.generate_audio_from_dictate().unwrap()
        );
    }

    #[test]
    fn render_with_pauses_is_longer_than_without() {
        let (mut plain, _) = sequencer("Eins zwei.", test_options());
        let without = plain.generate_audio_from_dictate().unwrap();

        let options = DictateOptions {
            pause_between_repetitions: Duration::from_secs(1),
            pause_between_sentences: Duration::from_secs(2),
            ..test_options()
        };
        let (mut gapped, _) = sequencer("Eins zwei.", options);
        let with = gapped.generate_audio_from_dictate().unwrap();

        assert!(with.len() > without.len());
    }

    #[test]
    fn empty_synthesis_results_render_to_silence_free_output() {
        let synthesizer = Arc::new(MockSynthesizer::new().with_empty_result_for("Eins zwei."));
        let options = DictateOptions {
            pause_between_repetitions: Duration::from_secs(1),
            part_repetitions: 0,
            ..test_options()
        };
        let mut sequencer = DictationSequencer::new(
            "Eins zwei.",
            options,
            Arc::new(FlatParser),
            synthesizer,
            Box::new(MockAudioOutput::new()),
        );

        // the only clip is empty, so no repetition silence is emitted
        assert!(sequencer.generate_audio_from_dictate().unwrap().is_empty());
    }

    #[test]
    fn empty_text_dictates_and_renders_to_nothing() {
        let (mut sequencer, synthesizer) = sequencer("   ", test_options());
        sequencer.dictate_full_text().unwrap();
        assert!(sequencer.generate_audio_from_dictate().unwrap().is_empty());
        assert_eq!(synthesizer.call_count(), 0);
    }

    #[test]
    fn silence_units_round_to_half_seconds_with_a_floor_of_one() {
        assert_eq!(silence_units(Duration::ZERO), 0);
        assert_eq!(silence_units(Duration::from_millis(100)), 1);
        assert_eq!(silence_units(Duration::from_millis(500)), 1);
        assert_eq!(silence_units(Duration::from_millis(740)), 1);
        assert_eq!(silence_units(Duration::from_millis(760)), 2);
        assert_eq!(silence_units(Duration::from_secs(2)), 4);
    }

    #[test]
    fn pause_mid_run_preserves_position_and_resume_finishes() {
        let options = DictateOptions {
            part_repetitions: 3,
            ..test_options()
        };
        // slow output so the pause lands while clips are still playing
        let mut sequencer = DictationSequencer::new(
            "Eins zwei. Drei vier. Fünf sechs.",
            options,
            Arc::new(FlatParser),
            Arc::new(MockSynthesizer::new()),
            Box::new(MockAudioOutput::new().with_write_delay(Duration::from_millis(10))),
        );
        sequencer.sentences().unwrap();
        let controls = sequencer.controls();

        let pauser = {
            let controls = controls.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                controls.pause_dictate();
            })
        };

        sequencer.dictate_full_text().unwrap();
        pauser.join().unwrap();

        assert!(controls.is_paused());

        // resume and let the rest of the text play out
        controls.resume_dictate();
        sequencer.dictate_full_text().unwrap();
        assert_eq!(sequencer.position(), PlaybackPosition::default());
        assert!(!controls.is_paused());
    }
}
