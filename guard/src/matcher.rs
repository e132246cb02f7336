//! Boundary-aware multi-phrase matching.
//!
//! All indicator tables in this crate compile into a [`PhraseSet`]: a
//! case-insensitive Aho-Corasick automaton whose hits are accepted only when
//! both match edges fall on word boundaries. "die" inside "diet" is not a
//! match; "die." at the end of a sentence is.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};

/// Compiled phrase table. Read-only after construction.
pub(crate) struct PhraseSet {
    phrases: Vec<&'static str>,
    automaton: Option<AhoCorasick>,
}

impl PhraseSet {
    /// Compile the automaton. A build failure degrades to the scan fallback
    /// in [`Self::matches`] rather than failing construction; the classifier
    /// must never refuse to run.
    pub(crate) fn new(phrases: Vec<&'static str>) -> Self {
        let automaton = match AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build(&phrases)
        {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::warn!(
                    phrase_count = phrases.len(),
                    "phrase automaton build failed; using scan fallback ({e})"
                );
                None
            }
        };
        Self { phrases, automaton }
    }

    #[must_use]
    pub(crate) fn phrase(&self, index: usize) -> &'static str {
        self.phrases[index]
    }

    /// Indices of phrases that match `text` on word boundaries, deduplicated,
    /// in first-match order.
    pub(crate) fn matches(&self, text: &str) -> Vec<usize> {
        let mut seen = vec![false; self.phrases.len()];
        let mut hits = Vec::new();

        if let Some(ac) = &self.automaton {
            // Overlapping search: every indicator gets to report, even when
            // one phrase contains part of another.
            for mat in ac.find_overlapping_iter(text) {
                let index = mat.pattern().as_usize();
                if seen[index] || !on_word_boundaries(text, mat.start(), mat.end()) {
                    continue;
                }
                seen[index] = true;
                hits.push(index);
            }
            return hits;
        }

        // Fallback: per-phrase ASCII-lowered scan with the same boundary rule.
        let lowered = text.to_ascii_lowercase();
        for (index, phrase) in self.phrases.iter().enumerate() {
            let needle = phrase.to_ascii_lowercase();
            let mut from = 0;
            while let Some(pos) = lowered[from..].find(&needle) {
                let start = from + pos;
                let end = start + needle.len();
                if on_word_boundaries(text, start, end) {
                    hits.push(index);
                    break;
                }
                from = end;
            }
        }
        hits
    }
}

/// Both edges of `text[start..end]` must sit on word boundaries.
///
/// Phrases are ASCII, so `start`/`end` are guaranteed char boundaries in
/// `text`.
fn on_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric());
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric());
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::PhraseSet;

    fn set(phrases: &[&'static str]) -> PhraseSet {
        PhraseSet::new(phrases.to_vec())
    }

    #[test]
    fn matches_whole_words_only() {
        let phrases = set(&["die"]);
        assert!(phrases.matches("I thought I would die.").contains(&0));
        assert!(phrases.matches("I'm trying a new diet").is_empty());
        assert!(phrases.matches("the soldier died").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let phrases = set(&["bail money"]);
        assert_eq!(phrases.matches("He asked for BAIL MONEY today"), vec![0]);
    }

    #[test]
    fn multi_word_phrases_match_across_spaces() {
        let phrases = set(&["can't breathe", "chest hurts"]);
        let hits = phrases.matches("my chest hurts and I can't breathe");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn punctuation_counts_as_a_boundary() {
        let phrases = set(&["alone"]);
        assert_eq!(phrases.matches("I'm alone, again."), vec![0]);
    }

    #[test]
    fn duplicate_hits_are_reported_once() {
        let phrases = set(&["lonely"]);
        assert_eq!(phrases.matches("lonely, so lonely"), vec![0]);
    }
}
