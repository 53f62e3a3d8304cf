//! Length-bounded chunking of phrase groups into dictation parts.
//!
//! A single left-to-right greedy pass with lookahead: groups are joined
//! until a soft target length is reached, with a hard maximum no joined
//! chunk may cross. Two thresholds avoid both choppy one-word chunks and
//! chunks too long to write down from memory.

use crate::defaults;

/// Punctuation that forces a chunk boundary.
pub const STOP_PUNCTUATION: [char; 5] = ['.', '!', '?', ';', ':'];

/// True if the text contains sentence-stopping punctuation.
pub fn contains_stop_punctuation(text: &str) -> bool {
    text.contains(STOP_PUNCTUATION)
}

/// Merges phrase groups into dictation parts bounded by character counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PartSegmenter {
    target_length: usize,
    max_length: usize,
}

impl Default for PartSegmenter {
    fn default() -> Self {
        Self {
            target_length: defaults::TARGET_PART_LENGTH,
            max_length: defaults::MAX_PART_LENGTH,
        }
    }
}

impl PartSegmenter {
    /// Create a segmenter with the given soft and hard bounds.
    ///
    /// `target_length` must be smaller than `max_length`; out-of-order
    /// bounds are swapped rather than rejected so a miswired configuration
    /// still segments sensibly.
    pub fn new(target_length: usize, max_length: usize) -> Self {
        if target_length < max_length {
            Self {
                target_length,
                max_length,
            }
        } else {
            Self {
                target_length: max_length,
                max_length: target_length,
            }
        }
    }

    /// Segment ordered phrase groups into ordered dictation parts.
    ///
    /// The output covers the same text in the same order; nothing is lost
    /// or duplicated. A part exceeds `max_length` only when a single group
    /// already did.
    pub fn segment(&self, groups: &[String]) -> Vec<String> {
        let mut parts: Vec<String> = Vec::new();
        let mut i = 0;

        while i < groups.len() {
            let group = &groups[i];
            if group.is_empty() {
                i += 1;
                continue;
            }

            // Oversized or punctuation-bearing groups stand alone.
            if char_len(group) > self.max_length || contains_stop_punctuation(group) {
                parts.push(group.clone());
                i += 1;
                continue;
            }

            let mut current = group.clone();
            let mut next = i + 1;

            while next < groups.len() {
                let candidate = &groups[next];
                let remaining_after = groups.len() - next - 1;
                let candidate_in_tail = next + 2 >= groups.len();

                let may_append = char_len(&current) < self.target_length
                    && (remaining_after >= 2 || candidate_in_tail)
                    && char_len(&current) + char_len(candidate) < self.max_length;

                if !may_append {
                    break;
                }

                current.push(' ');
                current.push_str(candidate);
                next += 1;

                if contains_stop_punctuation(&current) {
                    break;
                }
            }

            parts.push(current);
            i = next;
        }

        parts
            .into_iter()
            .map(|part| collapse_spaces(&part))
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !last_was_space {
                out.push(c);
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}
