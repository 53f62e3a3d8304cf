//! Constituency parse tree model and the external parser seam.
//!
//! The parser itself is an external collaborator: anything that can turn one
//! sentence into a labeled constituency tree. diktat only walks the result.

use crate::error::{DiktatError, Result};

/// One node of a constituency parse tree.
///
/// A `Terminal` carries a contiguous text span and the label the parser gave
/// it (a part-of-speech tag for single words, a phrase label for spans the
/// parser already collapsed). A `Phrase` is an inner node with ordered
/// children.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    Phrase {
        label: String,
        children: Vec<ParseNode>,
    },
    Terminal {
        label: String,
        text: String,
    },
}

impl ParseNode {
    /// Build a phrase node.
    pub fn phrase(label: &str, children: Vec<ParseNode>) -> Self {
        Self::Phrase {
            label: label.to_string(),
            children,
        }
    }

    /// Build a terminal node.
    pub fn terminal(label: &str, text: &str) -> Self {
        Self::Terminal {
            label: label.to_string(),
            text: text.to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }
}

/// Trait for the external constituency parser.
///
/// Implementations must be deterministic for identical input and
/// configuration; the tree is owned by the caller for the duration of one
/// segmentation run and never mutated by diktat.
pub trait ConstituencyParser: Send + Sync {
    /// Parse one sentence into a constituency tree.
    fn parse(&self, sentence: &str) -> Result<ParseNode>;
}

/// Degraded built-in parser: every token becomes its own one-word phrase.
///
/// Stands in when no real parser is wired up. Without real phrase structure
/// the bracketer emits one group per token and chunk boundaries fall purely
/// on the length bounds and punctuation.
#[derive(Debug, Clone, Default)]
pub struct FlatParser;

impl ConstituencyParser for FlatParser {
    fn parse(&self, sentence: &str) -> Result<ParseNode> {
        let children: Vec<ParseNode> = sentence
            .split_whitespace()
            .map(|token| ParseNode::phrase("NP", vec![ParseNode::terminal("XX", token)]))
            .collect();

        if children.is_empty() {
            return Err(DiktatError::ParseStructure {
                message: "cannot parse an empty sentence".to_string(),
            });
        }

        Ok(ParseNode::phrase("S", children))
    }
}

/// Mock parser for testing.
#[derive(Debug, Clone)]
pub struct MockParser {
    tree: Option<ParseNode>,
    should_fail: bool,
}

impl MockParser {
    /// Create a mock that returns the given tree for every sentence.
    pub fn returning(tree: ParseNode) -> Self {
        Self {
            tree: Some(tree),
            should_fail: false,
        }
    }

    /// Create a mock that fails on every parse.
    pub fn failing() -> Self {
        Self {
            tree: None,
            should_fail: true,
        }
    }
}

impl ConstituencyParser for MockParser {
    fn parse(&self, _sentence: &str) -> Result<ParseNode> {
        if self.should_fail {
            return Err(DiktatError::ParseStructure {
                message: "mock parse failure".to_string(),
            });
        }
        self.tree.clone().ok_or_else(|| DiktatError::ParseStructure {
            message: "mock parser has no tree".to_string(),
        })
    }
}

/// Split raw text into sentences on sentence-final punctuation.
///
/// A stand-in for the sentence splitter of a full NLP pipeline: a sentence
/// ends at `.`, `!` or `?` followed by whitespace or end of input. Closing
/// quotes stay attached to the sentence they terminate.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if matches!(c, '.' | '!' | '?') {
            // keep a closing quote with its sentence
            if let Some(&next) = chars.peek()
                && (next == '"' || next == '\u{201C}' || next == '\u{201D}')
            {
                current.push(next);
                chars.next();
            }

            let ends_here = match chars.peek() {
                None => true,
                Some(&next) => next.is_whitespace(),
            };

            if ends_here {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}
