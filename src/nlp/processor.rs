//! Segmentation pipeline: raw text → sentences of dictation parts.

use crate::error::Result;
use crate::nlp::bracketer::{BracketRules, PhraseBracketer};
use crate::nlp::parser::{ConstituencyParser, split_sentences};
use crate::nlp::punctuation::PunctuationNormalizer;
use crate::nlp::segmenter::PartSegmenter;
use crate::tts::voice::Language;
use std::sync::Arc;

/// One sentence as an ordered sequence of spoken-ready dictation parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub parts: Vec<String>,
}

impl Sentence {
    /// The whole sentence joined back together for full-sentence playback.
    pub fn full_text(&self) -> String {
        self.parts.join(" ")
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Runs the full segmentation pipeline for one language configuration.
///
/// Split into sentences, parse each through the external parser, bracket
/// the tree into phrase groups, merge groups into length-bounded parts,
/// then normalize punctuation.
pub struct NlpProcessor {
    parser: Arc<dyn ConstituencyParser>,
    bracketer: PhraseBracketer,
    segmenter: PartSegmenter,
    language: Language,
    pronounce_punctuation: bool,
}

impl NlpProcessor {
    pub fn new(
        parser: Arc<dyn ConstituencyParser>,
        language: Language,
        pronounce_punctuation: bool,
        target_part_length: usize,
        max_part_length: usize,
    ) -> Self {
        Self {
            parser,
            bracketer: PhraseBracketer::new(BracketRules::default()),
            segmenter: PartSegmenter::new(target_part_length, max_part_length),
            language,
            pronounce_punctuation,
        }
    }

    /// Reconfigure the chunk length bounds without re-parsing anything.
    pub fn set_part_lengths(&mut self, target: usize, max: usize) {
        self.segmenter = PartSegmenter::new(target, max);
    }

    /// Enable or disable punctuation verbalization.
    pub fn set_pronounce_punctuation(&mut self, pronounce: bool) {
        self.pronounce_punctuation = pronounce;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Segment raw text into sentences of dictation parts.
    ///
    /// # Errors
    /// Propagates `ParseStructure` errors from the parser or bracketer;
    /// a structural error aborts the whole run.
    pub fn dissect_text(&self, text: &str) -> Result<Vec<Sentence>> {
        let normalizer = PunctuationNormalizer::new(self.language, self.pronounce_punctuation);

        let mut sentences = Vec::new();
        for sentence_text in split_sentences(text) {
            let tree = self.parser.parse(&sentence_text)?;
            let groups = self.bracketer.bracket(&tree)?;
            let parts = normalizer.normalize(self.segmenter.segment(&groups));

            if !parts.is_empty() {
                sentences.push(Sentence { parts });
            }
        }

        Ok(sentences)
    }
}
