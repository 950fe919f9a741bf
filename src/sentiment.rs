//! Polarity scoring: pluggable base model plus a domain-lexicon adjustment.
//!
//! The base model is a capability the engine depends on, not something it
//! reimplements: anything returning a value nominally in [-1, 1] for cleaned
//! text fits behind [`PolarityModel`]. The shipped default is a word-valence
//! lexicon with negation handling. On top of the base score, a crypto-jargon
//! lexicon shifts the result by a fixed, explainable ±0.1 per matched term
//! ("dump" and "moon" carry asset-specific valence a general-purpose scorer
//! misreads), and the final score is clamped to [-1, 1].

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::normalize::normalize;

static BASE_LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Largest absolute word valence in the base lexicon.
const MAX_VALENCE: f64 = 4.0;

/// Contribution of one matched domain term.
const TERM_WEIGHT: f64 = 0.1;

/// General-purpose base polarity model over already-normalized text.
pub trait PolarityModel: Send + Sync {
    /// Base polarity nominally in [-1, 1]. Callers clamp the final score
    /// regardless, so an out-of-range return cannot leak through.
    fn base_polarity(&self, text: &str) -> f64;
}

/// Default model: word-valence lexicon with negation inversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconModel;

impl LexiconModel {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(w: &str) -> i32 {
        *BASE_LEXICON.get(w).unwrap_or(&0)
    }
}

impl PolarityModel for LexiconModel {
    /// Average matched-word valence, scaled by the lexicon maximum so the
    /// result is intrinsically bounded. A negator within the previous 1..=3
    /// tokens inverts the sign of a matched word.
    fn base_polarity(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum: i64 = 0;
        let mut hits: usize = 0;

        for i in 0..tokens.len() {
            let base = Self::word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            sum += if negated { -base } else { base } as i64;
            hits += 1;
        }

        if hits == 0 {
            0.0
        } else {
            sum as f64 / (MAX_VALENCE * hits as f64)
        }
    }
}

/// Alphanumeric tokens, lower-case.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "isn't" | "wasn't" | "aren't" | "won't" | "can't" | "cannot"
            | "without"
    )
}

/// Two disjoint sets of case-insensitive crypto terms. Matching is substring
/// containment, so multi-word phrases like "buy the dip" match as a unit.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainLexicon {
    boost: Vec<String>,
    penalty: Vec<String>,
}

impl DomainLexicon {
    /// Built-in term sets, embedded at compile time.
    pub fn builtin() -> Self {
        serde_json::from_str(include_str!("../domain_lexicon.json"))
            .expect("valid domain lexicon")
    }

    fn count_hits(terms: &[String], text: &str) -> usize {
        terms.iter().filter(|t| text.contains(t.as_str())).count()
    }

    /// Shift `base` by ±0.1 per matched term and clamp to [-1, 1].
    pub fn apply_modifiers(&self, text: &str, base: f64) -> f64 {
        let boost = Self::count_hits(&self.boost, text) as f64;
        let penalty = Self::count_hits(&self.penalty, text) as f64;
        (base + TERM_WEIGHT * boost - TERM_WEIGHT * penalty).clamp(-1.0, 1.0)
    }
}

impl Default for DomainLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Full per-text scorer: normalize → base model → domain adjustment → clamp.
#[derive(Clone)]
pub struct PolarityScorer {
    model: Arc<dyn PolarityModel>,
    lexicon: DomainLexicon,
}

impl PolarityScorer {
    pub fn new(model: Arc<dyn PolarityModel>, lexicon: DomainLexicon) -> Self {
        Self { model, lexicon }
    }

    /// Lexicon model + built-in domain terms.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(LexiconModel::new()), DomainLexicon::builtin())
    }

    /// Score one text in [-1, 1]. Text that normalizes to empty carries no
    /// signal and scores exactly 0.0.
    pub fn score(&self, text: &str) -> f64 {
        let cleaned = normalize(text);
        if cleaned.is_empty() {
            return 0.0;
        }
        let base = self.model.base_polarity(&cleaned);
        self.lexicon.apply_modifiers(&cleaned, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_score_zero() {
        let s = PolarityScorer::with_defaults();
        assert_eq!(s.score(""), 0.0);
        assert_eq!(s.score("   "), 0.0);
    }

    #[test]
    fn score_stays_in_bounds_for_saturated_text() {
        let s = PolarityScorer::with_defaults();
        let pumped = "hodl moon mooning bullish pump rocket lambo ath breakout rally surge";
        let dumped = "bearish dump crash rugpull scam ponzi rekt liquidated capitulation dead";
        assert!(s.score(pumped) <= 1.0);
        assert!(s.score(pumped) > 0.5);
        assert!(s.score(dumped) >= -1.0);
        assert!(s.score(dumped) < -0.5);
    }

    #[test]
    fn domain_terms_shift_a_neutral_base() {
        let lex = DomainLexicon::builtin();
        assert!(lex.apply_modifiers("hodl moon", 0.0) > 0.0);
        assert!(lex.apply_modifiers("rugpull scam", 0.0) < 0.0);
    }

    #[test]
    fn one_boost_and_one_penalty_roughly_cancel() {
        let lex = DomainLexicon::builtin();
        let adjusted = lex.apply_modifiers("rally bubble", 0.0);
        assert!(adjusted.abs() <= 0.05, "expected ~0, got {adjusted}");
    }

    #[test]
    fn multi_word_phrase_matches_as_unit() {
        let lex = DomainLexicon::builtin();
        assert!(lex.apply_modifiers("time to buy the dip", 0.0) > 0.0);
        // The words alone, separated, must not match the phrase.
        assert_eq!(lex.apply_modifiers("buy a new dip bowl", 0.0), 0.0);
    }

    #[test]
    fn negation_inverts_base_valence() {
        let m = LexiconModel::new();
        assert!(m.base_polarity("this is good") > 0.0);
        assert!(m.base_polarity("this is not good") < 0.0);
    }

    #[test]
    fn base_model_is_bounded() {
        let m = LexiconModel::new();
        for text in ["amazing amazing amazing", "worst terrible awful horrible"] {
            let p = m.base_polarity(text);
            assert!((-1.0..=1.0).contains(&p), "{text} -> {p}");
        }
    }

    #[test]
    fn out_of_range_base_model_is_clamped() {
        struct Wild;
        impl PolarityModel for Wild {
            fn base_polarity(&self, _text: &str) -> f64 {
                7.5
            }
        }
        let s = PolarityScorer::new(Arc::new(Wild), DomainLexicon::builtin());
        assert_eq!(s.score("anything at all"), 1.0);
    }
}
