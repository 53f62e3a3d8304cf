//! Text segmentation pipeline: parse tree → phrase groups → dictation parts.

pub mod bracketer;
pub mod parser;
pub mod processor;
pub mod punctuation;
pub mod segmenter;

pub use bracketer::{BracketRules, PhraseBracketer};
pub use parser::{ConstituencyParser, FlatParser, ParseNode, split_sentences};
pub use processor::{NlpProcessor, Sentence};
pub use punctuation::PunctuationNormalizer;
pub use segmenter::{PartSegmenter, STOP_PUNCTUATION, contains_stop_punctuation};
