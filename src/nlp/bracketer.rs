//! Phrase bracketing: constituency tree → ordered phrase groups.
//!
//! Walks one sentence tree and brackets adjacent leaf spans that belong to
//! the same syntactic phrase into groups. The label predicates are
//! empirically tuned to the parser's label grammar and kept as configuration
//! so they can be adjusted per language.

use crate::error::{DiktatError, Result};
use crate::nlp::parser::ParseNode;

/// Label-shape predicates driving the bracketing walk.
///
/// Defaults match the German constituency label grammar: phrase labels are
/// two characters ending in `P` (`NP`, `VP`, ...), coordinating phrase
/// labels are three characters from `C` to `P` (`CNP`, `CVP`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct BracketRules {
    pub phrase_label_len: usize,
    pub phrase_suffix: char,
    pub coordination_label_len: usize,
    pub coordination_prefix: char,
}

impl Default for BracketRules {
    fn default() -> Self {
        Self {
            phrase_label_len: 2,
            phrase_suffix: 'P',
            coordination_label_len: 3,
            coordination_prefix: 'C',
        }
    }
}

impl BracketRules {
    /// True for labels shaped like a phrase label (`NP`, `VP`, ...).
    pub fn is_phrase_label(&self, label: &str) -> bool {
        label.chars().count() == self.phrase_label_len && label.ends_with(self.phrase_suffix)
    }

    /// True for coordinating phrase labels (`CNP`, `CVP`, ...).
    ///
    /// Coordinating phrases are transparent: encountering one of their
    /// non-terminal children does not force the open group to close.
    pub fn is_coordinating(&self, label: &str) -> bool {
        label.chars().count() == self.coordination_label_len
            && label.starts_with(self.coordination_prefix)
            && label.ends_with(self.phrase_suffix)
    }
}

/// Ordered group assembly during the tree walk.
///
/// At most one group is open at a time; closed groups keep insertion order.
#[derive(Debug, Default)]
struct GroupAccumulator {
    closed: Vec<String>,
    open: Option<Vec<String>>,
}

impl GroupAccumulator {
    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn open_group(&mut self) {
        if self.open.is_none() {
            self.open = Some(Vec::new());
        }
    }

    fn push_word(&mut self, word: &str) {
        self.open.get_or_insert_with(Vec::new).push(word.to_string());
    }

    /// Close the open group, dropping it if empty. No-op when none is open.
    fn close_group(&mut self) {
        if let Some(words) = self.open.take()
            && !words.is_empty()
        {
            self.closed.push(words.join(" "));
        }
    }

    /// Emit a span as its own already-closed group.
    fn push_isolated(&mut self, text: &str) {
        self.close_group();
        self.closed.push(text.to_string());
    }
}

/// Converts a constituency parse tree into ordered phrase group strings.
#[derive(Debug, Clone, Default)]
pub struct PhraseBracketer {
    rules: BracketRules,
}

impl PhraseBracketer {
    pub fn new(rules: BracketRules) -> Self {
        Self { rules }
    }

    /// Bracket one sentence tree into ordered phrase groups.
    ///
    /// # Errors
    /// `DiktatError::ParseStructure` when the tree violates the parser
    /// contract (a phrase node without children). No recovery is attempted.
    pub fn bracket(&self, tree: &ParseNode) -> Result<Vec<String>> {
        let mut acc = GroupAccumulator::default();
        self.walk(tree, &mut acc)?;
        acc.close_group();

        Ok(normalize_groups(acc.closed))
    }

    fn walk(&self, node: &ParseNode, acc: &mut GroupAccumulator) -> Result<()> {
        match node {
            ParseNode::Terminal { label, text } => {
                if self.rules.is_phrase_label(label) {
                    // A span the parser already collapsed to a phrase:
                    // emit it as its own closed group.
                    acc.push_isolated(text);
                } else {
                    acc.push_word(text);
                }
                Ok(())
            }
            ParseNode::Phrase { label, children } => {
                if children.is_empty() {
                    return Err(DiktatError::ParseStructure {
                        message: format!("phrase node '{}' has no children", label),
                    });
                }

                for child in children {
                    let plain_terminal = matches!(
                        child,
                        ParseNode::Terminal { label, .. } if !self.rules.is_phrase_label(label)
                    );

                    if !acc.is_open() && plain_terminal {
                        acc.open_group();
                    }
                    if acc.is_open() && !plain_terminal && !self.rules.is_coordinating(label) {
                        acc.close_group();
                    }

                    self.walk(child, acc)?;
                }

                // groups never span past the phrase that opened them
                acc.close_group();
                Ok(())
            }
        }
    }
}

/// Post-process assembled groups: drop empties, reattach bare `,`/`.` groups
/// to the group before them, collapse doubled spaces.
fn normalize_groups(groups: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(groups.len());

    for group in groups {
        let cleaned = group.replace("  ", " ").trim().to_string();
        if cleaned.is_empty() {
            continue;
        }

        if (cleaned == "," || cleaned == ".") && !result.is_empty() {
            if let Some(last) = result.last_mut() {
                last.push_str(&cleaned);
            }
            continue;
        }

        result.push(cleaned);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::parser::ParseNode::{self};

    fn t(label: &str, text: &str) -> ParseNode {
        ParseNode::terminal(label, text)
    }

    fn p(label: &str, children: Vec<ParseNode>) -> ParseNode {
        ParseNode::phrase(label, children)
    }

    fn bracket(tree: &ParseNode) -> Vec<String> {
        PhraseBracketer::default().bracket(tree).unwrap()
    }

    #[test]
    fn simple_sentence_groups_by_phrase() {
        // (S (NP (ART Der) (NN Fuchs)) (VP (VVFIN lief) (ADJD schnell)) ($. .))
        let tree = p(
            "S",
            vec![
                p("NP", vec![t("ART", "Der"), t("NN", "Fuchs")]),
                p("VP", vec![t("VVFIN", "lief"), t("ADJD", "schnell")]),
                t("$.", "."),
            ],
        );

        assert_eq!(bracket(&tree), vec!["Der Fuchs", "lief schnell."]);
    }

    #[test]
    fn trailing_comma_group_reattaches_to_previous() {
        let tree = p(
            "S",
            vec![
                p("NP", vec![t("ART", "Der"), t("NN", "Fuchs")]),
                t("$,", ","),
                p("NP", vec![t("ART", "der"), t("NN", "Esel")]),
            ],
        );

        assert_eq!(bracket(&tree), vec!["Der Fuchs,", "der Esel"]);
    }

    #[test]
    fn phrase_like_terminal_is_emitted_isolated() {
        let tree = p(
            "S",
            vec![
                t("ADV", "Dann"),
                t("NP", "der alte Mann"),
                t("VVFIN", "ging"),
            ],
        );

        assert_eq!(bracket(&tree), vec!["Dann", "der alte Mann", "ging"]);
    }

    #[test]
    fn non_terminal_child_closes_open_group() {
        // (VP (VVFIN sah) (NP (ART den) (NN Hund)))
        let tree = p(
            "VP",
            vec![
                t("VVFIN", "sah"),
                p("NP", vec![t("ART", "den"), t("NN", "Hund")]),
            ],
        );

        assert_eq!(bracket(&tree), vec!["sah", "den Hund"]);
    }

    #[test]
    fn coordinating_phrase_is_transparent() {
        // (CNP (NN Hunde) (KON und) (NP (ART die) (NN Katzen)))
        let coordinated = p(
            "CNP",
            vec![
                t("NN", "Hunde"),
                t("KON", "und"),
                p("NP", vec![t("ART", "die"), t("NN", "Katzen")]),
            ],
        );
        assert_eq!(bracket(&coordinated), vec!["Hunde und die Katzen"]);

        // Same shape under a plain VP closes before the nested NP.
        let plain = p(
            "VP",
            vec![
                t("NN", "Hunde"),
                t("KON", "und"),
                p("NP", vec![t("ART", "die"), t("NN", "Katzen")]),
            ],
        );
        assert_eq!(bracket(&plain), vec!["Hunde und", "die Katzen"]);
    }

    #[test]
    fn nested_phrases_produce_ordered_groups() {
        let tree = p(
            "S",
            vec![
                p(
                    "NP",
                    vec![
                        t("ART", "Die"),
                        t("ADJA", "letzten"),
                        t("NN", "Worte"),
                    ],
                ),
                p(
                    "VP",
                    vec![
                        t("VVFIN", "lauteten"),
                        p("NP", vec![t("ART", "ein"), t("NN", "Satz")]),
                    ],
                ),
                t("$.", "."),
            ],
        );

        assert_eq!(
            bracket(&tree),
            vec!["Die letzten Worte", "lauteten", "ein Satz."]
        );
    }

    #[test]
    fn empty_phrase_node_is_a_structure_error() {
        let tree = p("S", vec![p("NP", vec![])]);
        let result = PhraseBracketer::default().bracket(&tree);
        assert!(matches!(result, Err(DiktatError::ParseStructure { .. })));
    }

    #[test]
    fn bare_terminal_tree_yields_one_group() {
        let tree = t("NN", "Hallo");
        assert_eq!(bracket(&tree), vec!["Hallo"]);
    }

    #[test]
    fn rules_phrase_label_shape() {
        let rules = BracketRules::default();
        assert!(rules.is_phrase_label("NP"));
        assert!(rules.is_phrase_label("VP"));
        assert!(!rules.is_phrase_label("NN"));
        assert!(!rules.is_phrase_label("CNP"));
        assert!(!rules.is_phrase_label("P"));
    }

    #[test]
    fn rules_coordination_label_shape() {
        let rules = BracketRules::default();
        assert!(rules.is_coordinating("CNP"));
        assert!(rules.is_coordinating("CVP"));
        assert!(!rules.is_coordinating("NP"));
        assert!(!rules.is_coordinating("CNN"));
        assert!(!rules.is_coordinating("KON"));
    }
}
