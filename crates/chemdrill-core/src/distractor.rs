//! Plausible-wrong-answer generation for multiple-choice questions.
//!
//! Distractors are drawn from the rest of the pool through an ordered list
//! of candidate-selection tiers, tightest first: same family, shared tag,
//! shared chemical element, then uniform random. Each tier excludes the
//! correct value and anything already chosen; generation falls through
//! tiers only as far as needed to collect `k` values.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{AnswerField, QuestionPool, QuestionRecord};

/// Every IUPAC element symbol, for domain-entity extraction from formulas
/// and equations.
const ELEMENT_SYMBOLS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Extract the set of element symbols mentioned in a formula, equation, or
/// label. Two-letter symbols are matched greedily before one-letter ones,
/// so "Cl" never reads as carbon plus an unknown.
pub fn element_symbols(text: &str) -> HashSet<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut symbols = HashSet::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_uppercase() {
            if i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase() {
                let two: String = [c, chars[i + 1]].iter().collect();
                if ELEMENT_SYMBOLS.contains(&two.as_str()) {
                    symbols.insert(two);
                    i += 2;
                    continue;
                }
            }
            let one = c.to_string();
            if ELEMENT_SYMBOLS.contains(&one.as_str()) {
                symbols.insert(one);
            }
        }
        i += 1;
    }

    symbols
}

/// One tier of the candidate-selection chain.
struct SelectionTier {
    name: &'static str,
    applies: Box<dyn Fn(&QuestionRecord) -> bool>,
}

/// The ordered tier chain for a given correct record, tightest first.
fn selection_tiers(correct: &QuestionRecord) -> Vec<SelectionTier> {
    let family = correct.family.clone();
    let tags: HashSet<String> = correct.tags.iter().cloned().collect();
    let symbols = element_symbols(&correct.answer);

    vec![
        SelectionTier {
            name: "family",
            applies: Box::new(move |r| match (&family, &r.family) {
                (Some(f), Some(rf)) => f == rf,
                _ => false,
            }),
        },
        SelectionTier {
            name: "tag",
            applies: Box::new(move |r| r.tags.iter().any(|t| tags.contains(t))),
        },
        SelectionTier {
            name: "element",
            applies: Box::new(move |r| !symbols.is_disjoint(&element_symbols(&r.answer))),
        },
        SelectionTier {
            name: "any",
            applies: Box::new(|_| true),
        },
    ]
}

/// Select up to `k` distinct wrong answers for `correct` from the pool.
///
/// Never contains the correct value, an empty value, or a duplicate; returns
/// fewer than `k` only when the pool genuinely lacks enough distinct values.
pub fn distractors<R: Rng + ?Sized>(
    correct: &QuestionRecord,
    pool: &QuestionPool,
    field: AnswerField,
    k: usize,
    rng: &mut R,
) -> Vec<String> {
    let correct_value = correct.field(field);
    let mut chosen: Vec<String> = Vec::with_capacity(k);
    let mut excluded: HashSet<String> = HashSet::from([correct_value.to_string()]);

    for tier in selection_tiers(correct) {
        if chosen.len() == k {
            break;
        }

        // Distinct eligible values, in pool order; sampling order comes
        // from the rng.
        let mut candidate_set: HashSet<&str> = HashSet::new();
        let candidates: Vec<&str> = pool
            .iter()
            .filter(|r| r.id != correct.id)
            .filter(|r| (tier.applies)(r))
            .map(|r| r.field(field))
            .filter(|v| !v.is_empty())
            .filter(|v| !excluded.contains(*v))
            .filter(|v| candidate_set.insert(*v))
            .collect();

        let need = k - chosen.len();
        for value in candidates.choose_multiple(rng, need) {
            excluded.insert((*value).to_string());
            chosen.push((*value).to_string());
        }
        tracing::trace!(
            tier = tier.name,
            filled = chosen.len(),
            "distractor tier applied"
        );
    }

    chosen
}

/// A shuffled multiple-choice presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    /// All options in presentation order, correct answer included.
    pub choices: Vec<String>,
    /// Index of the correct answer within `choices`.
    pub correct_index: usize,
}

/// Combine the correct answer with its distractors into a shuffled
/// presentation order.
///
/// The returned index is recomputed by value match after the shuffle, never
/// assumed from the insertion position.
pub fn shuffle_choices<R: Rng + ?Sized>(
    correct: &str,
    distractors: &[String],
    rng: &mut R,
) -> ChoiceSet {
    let mut choices: Vec<String> = Vec::with_capacity(distractors.len() + 1);
    choices.push(correct.to_string());
    choices.extend(distractors.iter().cloned());
    choices.shuffle(rng);

    let correct_index = choices
        .iter()
        .position(|c| c == correct)
        .expect("correct answer is always present in its own choice set");

    ChoiceSet {
        choices,
        correct_index,
    }
}
