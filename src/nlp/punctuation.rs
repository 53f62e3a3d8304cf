//! Punctuation normalization passes over segmented parts.
//!
//! Three ordered passes: reattach leading punctuation to the preceding
//! part, clean up whitespace around punctuation and quotes, and optionally
//! verbalize punctuation marks per language. Verbalization runs last so the
//! other passes never see spoken words where glyphs used to be.

use crate::tts::voice::Language;

/// Composable punctuation cleanup configured per language.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PunctuationNormalizer {
    language: Language,
    pronounce_punctuation: bool,
}

impl PunctuationNormalizer {
    pub fn new(language: Language, pronounce_punctuation: bool) -> Self {
        Self {
            language,
            pronounce_punctuation,
        }
    }

    /// Run all configured passes in order.
    pub fn normalize(&self, parts: Vec<String>) -> Vec<String> {
        let parts = reattach_punctuation(parts);
        let parts = fix_whitespace(parts);
        if self.pronounce_punctuation {
            verbalize_punctuation(parts, self.language)
        } else {
            parts
        }
    }
}

/// Move punctuation from the start of a part onto the end of the previous
/// part. For `:` everything up to and including the colon moves back.
pub fn reattach_punctuation(mut parts: Vec<String>) -> Vec<String> {
    for i in 1..parts.len() {
        if parts[i - 1].is_empty() {
            continue;
        }

        let next = parts[i].clone();
        if next.is_empty() {
            continue;
        }

        if let Some(rest) = next.strip_prefix('.') {
            parts[i - 1].push('.');
            parts[i] = rest.trim_start().to_string();
        } else if let Some(rest) = next.strip_prefix(',') {
            parts[i - 1].push(',');
            parts[i] = rest.trim_start().to_string();
        } else if let Some(rest) = next.strip_prefix(';') {
            parts[i - 1].push(';');
            parts[i] = rest.trim_start().to_string();
        } else if let Some(colon_pos) = next.find(':') {
            let prefix = next[..colon_pos].trim();
            if prefix.is_empty() {
                parts[i - 1].push(':');
            } else {
                parts[i - 1].push(' ');
                parts[i - 1].push_str(prefix);
                parts[i - 1].push(':');
            }
            parts[i] = next[colon_pos + 1..].trim_start().to_string();
        }
    }

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Collapse doubled spaces and drop spaces next to punctuation and quotes.
pub fn fix_whitespace(parts: Vec<String>) -> Vec<String> {
    parts
        .into_iter()
        .map(|part| {
            let mut current = part;
            while current.contains("  ") {
                current = current.replace("  ", " ");
            }
            current = current.replace(" .", ".");
            current = current.replace(" ,", ",");
            current = current.replace(" !", "!");
            current = current.replace(" ?", "?");
            current = current.replace(" :", ":");
            current = current.replace("\" ", "\"");
            current = current.replace(" \"", "\"");
            current.trim().to_string()
        })
        .collect()
}

/// Replace punctuation glyphs with their spoken form for the language.
///
/// Glyphs without a table entry pass through unchanged.
pub fn verbalize_punctuation(parts: Vec<String>, language: Language) -> Vec<String> {
    let table = verbalization_table(language);

    parts
        .into_iter()
        .map(|part| {
            let mut current = part;
            for (glyph, spoken) in table {
                current = current.replace(glyph, spoken);
            }
            current
        })
        .collect()
}

/// Spoken substitutions per language.
///
/// German keeps the glyph after the spoken word so the rendered audio still
/// carries the sentence-final mark; the other tables speak the mark alone.
fn verbalization_table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::German => &[
            (".", " Punkt."),
            (",", " Komma,"),
            (":", " Doppelpunkt:"),
            (";", " Semikolon;"),
            ("\"", " Anführungszeichen "),
        ],
        Language::EnglishUs | Language::EnglishUk => &[
            (".", " dot"),
            (",", " comma"),
            (":", " colon"),
            (";", " semicolon"),
            ("\"", " quote "),
        ],
        Language::Spanish => &[
            (".", " punto"),
            (",", " coma"),
            (":", " dos puntos"),
            (";", " punto y coma"),
            ("\"", " comillas "),
        ],
        Language::French => &[
            (".", " point"),
            (",", " virgule"),
            (":", " deux-points"),
            (";", " point-virgule"),
            ("\"", " guillemets "),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn leading_period_moves_to_previous_part() {
        let result = reattach_punctuation(parts(&["Der Fuchs lief", ". Dann kam er"]));
        assert_eq!(result, vec!["Der Fuchs lief.", "Dann kam er"]);
    }

    #[test]
    fn leading_comma_moves_to_previous_part() {
        let result = reattach_punctuation(parts(&["erstens", ", zweitens"]));
        assert_eq!(result, vec!["erstens,", "zweitens"]);
    }

    #[test]
    fn leading_semicolon_moves_to_previous_part() {
        let result = reattach_punctuation(parts(&["ein Teil", "; der Rest"]));
        assert_eq!(result, vec!["ein Teil;", "der Rest"]);
    }

    #[test]
    fn colon_pulls_its_prefix_back() {
        let result = reattach_punctuation(parts(&["Er sagte", "laut: komm her"]));
        assert_eq!(result, vec!["Er sagte laut:", "komm her"]);
    }

    #[test]
    fn bare_leading_colon_moves_back() {
        let result = reattach_punctuation(parts(&["Er sagte", ": komm her"]));
        assert_eq!(result, vec!["Er sagte:", "komm her"]);
    }

    #[test]
    fn part_emptied_by_reattachment_is_dropped() {
        let result = reattach_punctuation(parts(&["Ende", "."]));
        assert_eq!(result, vec!["Ende."]);
    }

    #[test]
    fn no_part_starts_with_stop_punctuation_after_reattachment() {
        let result = reattach_punctuation(parts(&[
            "Der Löwe kam",
            ". Er brüllte",
            "; der Fuchs",
            ", der Esel",
            ": alle rannten",
        ]));

        for part in &result {
            let first = part.chars().next().unwrap();
            assert!(
                !matches!(first, '.' | '!' | '?' | ';' | ':' | ','),
                "part starts with punctuation: {}",
                part
            );
        }
    }

    #[test]
    fn whitespace_fix_removes_space_before_punctuation() {
        let result = fix_whitespace(parts(&["Der Fuchs , der Esel .", "Wie bitte ?"]));
        assert_eq!(result, vec!["Der Fuchs, der Esel.", "Wie bitte?"]);
    }

    #[test]
    fn whitespace_fix_collapses_doubled_spaces() {
        let result = fix_whitespace(parts(&["zu   viele    Leerzeichen"]));
        assert_eq!(result, vec!["zu viele Leerzeichen"]);
    }

    #[test]
    fn whitespace_fix_tightens_quotes() {
        let result = fix_whitespace(parts(&["Er sagte \" komm her \""]));
        assert_eq!(result, vec!["Er sagte\"komm her\""]);
    }

    #[test]
    fn german_verbalization_keeps_the_glyph() {
        let result = verbalize_punctuation(parts(&["schnell."]), Language::German);
        assert_eq!(result, vec!["schnell Punkt."]);

        let result = verbalize_punctuation(parts(&["erstens, zweitens"]), Language::German);
        assert_eq!(result, vec!["erstens Komma, zweitens"]);
    }

    #[test]
    fn english_verbalization_speaks_the_mark_alone() {
        let result = verbalize_punctuation(parts(&["the end."]), Language::EnglishUs);
        assert_eq!(result, vec!["the end dot"]);
    }

    #[test]
    fn unknown_glyphs_pass_through() {
        let result = verbalize_punctuation(parts(&["wirklich?!"]), Language::German);
        assert_eq!(result, vec!["wirklich?!"]);
    }

    #[test]
    fn normalize_runs_passes_in_order() {
        let normalizer = PunctuationNormalizer::new(Language::German, true);
        let result = normalizer.normalize(parts(&["Der Fuchs lief", ". Dann kam er"]));

        // reattach first, verbalize last: the period lands on part one and
        // is then spoken there
        assert_eq!(result, vec!["Der Fuchs lief Punkt.", "Dann kam er"]);
    }

    #[test]
    fn normalize_without_pronunciation_skips_verbalization() {
        let normalizer = PunctuationNormalizer::new(Language::German, false);
        let result = normalizer.normalize(parts(&["Der Fuchs lief", ". Dann kam er"]));

        assert_eq!(result, vec!["Der Fuchs lief.", "Dann kam er"]);
    }
}
