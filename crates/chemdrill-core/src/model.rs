//! Core data model types for chemdrill.
//!
//! These are the fundamental types the entire chemdrill system uses to
//! represent question records, pools, quiz settings, and score history.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single quiz item: one compound, reaction, or classification entry.
///
/// Records are immutable once loaded; `id` is unique within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Stable identifier, unique within a pool.
    pub id: String,
    /// Prompt-facing label (compound name, reaction name, item label).
    pub name: String,
    /// The answerable field: formula, balanced equation, or class label
    /// depending on the pool type.
    pub answer: String,
    /// Domain subcategory classifier (e.g. "alkane", "strong-acid").
    #[serde(default)]
    pub family: Option<String>,
    /// Normalized topic tags (lower-cased, trimmed).
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QuestionRecord {
    /// The value of the given answer field on this record.
    pub fn field(&self, field: AnswerField) -> &str {
        match field {
            AnswerField::Name => &self.name,
            AnswerField::Answer => &self.answer,
        }
    }
}

/// Which field of a record a question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerField {
    /// Quiz on the record's display name.
    Name,
    /// Quiz on the record's answer field (formula / equation / class).
    Answer,
}

/// The kind of question pool. Doubles as the quiz mode for history scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolType {
    Compounds,
    Reactions,
    Classification,
}

impl PoolType {
    /// The wire field that marks an entity of this pool type.
    ///
    /// Used by the loader's cross-wiring guard: a `records` array whose
    /// elements carry a different marker than requested is rejected.
    pub fn marker_field(&self) -> &'static str {
        match self {
            PoolType::Compounds => "formula",
            PoolType::Reactions => "equation",
            PoolType::Classification => "class",
        }
    }

    /// All pool types, for marker-field lookups.
    pub fn all() -> [PoolType; 3] {
        [
            PoolType::Compounds,
            PoolType::Reactions,
            PoolType::Classification,
        ]
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolType::Compounds => write!(f, "compounds"),
            PoolType::Reactions => write!(f, "reactions"),
            PoolType::Classification => write!(f, "classification"),
        }
    }
}

impl FromStr for PoolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compounds" => Ok(PoolType::Compounds),
            "reactions" => Ok(PoolType::Reactions),
            "classification" => Ok(PoolType::Classification),
            other => Err(format!("unknown pool type: {other}")),
        }
    }
}

/// An ordered, immutable set of question records for one `(category, type)`
/// selection. Cheap to clone; replaced wholesale on reload.
#[derive(Debug, Clone)]
pub struct QuestionPool {
    records: Arc<Vec<QuestionRecord>>,
}

impl QuestionPool {
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionRecord> {
        self.records.iter()
    }
}

impl From<Vec<QuestionRecord>> for QuestionPool {
    fn from(records: Vec<QuestionRecord>) -> Self {
        QuestionPool::new(records)
    }
}

/// Fixed batch sizes offered by the quiz UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchSize {
    Ten,
    Twenty,
    Forty,
}

impl BatchSize {
    pub fn len(&self) -> usize {
        match self {
            BatchSize::Ten => 10,
            BatchSize::Twenty => 20,
            BatchSize::Forty => 40,
        }
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.len())
    }
}

/// How many questions a session covers.
///
/// The "start index present iff batch mode" invariant is encoded in the
/// type: only `Batch` carries a start, and it is always 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CountMode {
    /// The whole pool, or its first `count` records when set.
    All { count: Option<usize> },
    /// A fixed-size window starting at a 1-based offset into the pool.
    Batch { size: BatchSize, start: usize },
}

/// Presentation order of the resolved question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    Sequential,
    Shuffle,
}

/// User-chosen settings for one quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    pub count: CountMode,
    pub order: OrderMode,
}

impl QuizSettings {
    pub fn shuffle_active(&self) -> bool {
        self.order == OrderMode::Shuffle
    }

    /// Derive the canonical range key for these settings.
    ///
    /// Two settings addressing the same logical slice of the pool derive the
    /// same key, regardless of order mode.
    pub fn range_key(&self) -> RangeKey {
        match self.count {
            CountMode::Batch { size, start } => RangeKey(format!("{}:{start}", size.len())),
            CountMode::All { count: Some(n) } => RangeKey(format!("all:{n}")),
            CountMode::All { count: None } => RangeKey("all:*".to_string()),
        }
    }
}

/// Canonical string naming a slice of the pool (a batch or the whole set).
///
/// Scopes score history and resumption: `"<B>:<start>"` for batch modes,
/// `"all:<n>"` or `"all:*"` for the all mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeKey(String);

impl RangeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One answered question, as fed to the scoring engine. Ephemeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEvent {
    pub is_correct: bool,
    pub elapsed_ms: u64,
    /// Consecutive correct answers to the same question, including this one.
    pub streak: u32,
    pub shuffle_active: bool,
}

/// A completed session's score, as persisted in the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    pub score: u32,
    pub correct_count: u32,
    pub total_count: u32,
    pub recorded_at: DateTime<Utc>,
}

/// The scope a score history list is keyed by: quiz mode times pool slice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryScope {
    pub mode: PoolType,
    pub range: RangeKey,
}

impl HistoryScope {
    pub fn new(mode: PoolType, range: RangeKey) -> Self {
        Self { mode, range }
    }
}

impl fmt::Display for HistoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.mode, self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_type_display_and_parse() {
        assert_eq!(PoolType::Compounds.to_string(), "compounds");
        assert_eq!(PoolType::Reactions.to_string(), "reactions");
        assert_eq!(
            "compounds".parse::<PoolType>().unwrap(),
            PoolType::Compounds
        );
        assert_eq!(
            "Classification".parse::<PoolType>().unwrap(),
            PoolType::Classification
        );
        assert!("elements".parse::<PoolType>().is_err());
    }

    #[test]
    fn marker_fields_are_distinct() {
        let markers: std::collections::HashSet<_> =
            PoolType::all().iter().map(|t| t.marker_field()).collect();
        assert_eq!(markers.len(), 3);
    }

    #[test]
    fn range_key_batch_modes() {
        let settings = QuizSettings {
            count: CountMode::Batch {
                size: BatchSize::Ten,
                start: 21,
            },
            order: OrderMode::Sequential,
        };
        assert_eq!(settings.range_key().as_str(), "10:21");

        let settings = QuizSettings {
            count: CountMode::Batch {
                size: BatchSize::Forty,
                start: 1,
            },
            order: OrderMode::Shuffle,
        };
        assert_eq!(settings.range_key().as_str(), "40:1");
    }

    #[test]
    fn range_key_all_modes() {
        let whole = QuizSettings {
            count: CountMode::All { count: None },
            order: OrderMode::Sequential,
        };
        assert_eq!(whole.range_key().as_str(), "all:*");

        let first_fifty = QuizSettings {
            count: CountMode::All { count: Some(50) },
            order: OrderMode::Sequential,
        };
        assert_eq!(first_fifty.range_key().as_str(), "all:50");
    }

    #[test]
    fn range_key_ignores_order_mode() {
        let sequential = QuizSettings {
            count: CountMode::Batch {
                size: BatchSize::Twenty,
                start: 41,
            },
            order: OrderMode::Sequential,
        };
        let shuffled = QuizSettings {
            order: OrderMode::Shuffle,
            ..sequential
        };
        assert_eq!(sequential.range_key(), shuffled.range_key());
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = QuestionRecord {
            id: "c-001".into(),
            name: "Sulfuric acid".into(),
            answer: "H2SO4".into(),
            family: Some("strong-acid".into()),
            tags: vec!["acid".into(), "inorganic".into()],
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: QuestionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_optional_fields_default() {
        let json = r#"{"id":"c-1","name":"Water","answer":"H2O"}"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert!(record.family.is_none());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn pool_is_cheap_to_clone() {
        let pool = QuestionPool::new(vec![QuestionRecord {
            id: "c-1".into(),
            name: "Water".into(),
            answer: "H2O".into(),
            family: None,
            tags: vec![],
        }]);
        let clone = pool.clone();
        assert_eq!(clone.len(), 1);
        assert_eq!(clone.records()[0].id, pool.records()[0].id);
    }
}
