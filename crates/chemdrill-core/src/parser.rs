//! Question record parsers for the two recognized wire shapes.
//!
//! Remote pools arrive either as a tab-delimited text payload or as a
//! pre-structured entity array. Both shapes normalize into
//! [`QuestionRecord`]s here; anything malformed is a typed [`ParseError`].

use serde::Deserialize;

use crate::error::ParseError;
use crate::model::{PoolType, QuestionRecord};

/// Parse a tab-delimited text payload into question records.
///
/// Row format: `id <TAB> name <TAB> answer [<TAB> family [<TAB> tag,tag]]`.
/// Blank lines are skipped; a row with fewer than three fields or an empty
/// required field is an error, not a silent drop.
pub fn parse_payload(text: &str) -> Result<Vec<QuestionRecord>, ParseError> {
    let mut records = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = raw.split('\t').map(str::trim).collect();
        if fields.len() < 3 {
            return Err(ParseError::MalformedRow {
                line,
                reason: format!("expected at least 3 fields, got {}", fields.len()),
            });
        }

        let (id, name, answer) = (fields[0], fields[1], fields[2]);
        for (field, label) in [(id, "id"), (name, "name"), (answer, "answer")] {
            if field.is_empty() {
                return Err(ParseError::MalformedRow {
                    line,
                    reason: format!("empty {label} field"),
                });
            }
        }

        let family = fields
            .get(3)
            .filter(|f| !f.is_empty())
            .map(|f| f.to_string());
        let tags = fields
            .get(4)
            .map(|f| f.split(',').filter_map(normalize_tag).collect())
            .unwrap_or_default();

        records.push(QuestionRecord {
            id: id.to_string(),
            name: name.to_string(),
            answer: answer.to_string(),
            family,
            tags,
        });
    }

    Ok(records)
}

/// Intermediate wire shapes for pre-structured entity arrays. The marker
/// field differs per pool type; everything else is shared.
#[derive(Debug, Deserialize)]
struct CompoundEntity {
    id: String,
    name: String,
    formula: String,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReactionEntity {
    id: String,
    name: String,
    equation: String,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClassificationEntity {
    id: String,
    name: String,
    class: String,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Parse a pre-structured entity array into question records.
///
/// Each element must carry the marker field for the requested pool type
/// (`formula` / `equation` / `class`); the marker value becomes the
/// record's `answer`.
pub fn parse_entities(
    pool_type: PoolType,
    entries: &[serde_json::Value],
) -> Result<Vec<QuestionRecord>, ParseError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let malformed = |e: serde_json::Error| ParseError::MalformedEntity {
                index,
                reason: e.to_string(),
            };
            let (id, name, answer, family, tags) = match pool_type {
                PoolType::Compounds => {
                    let e: CompoundEntity =
                        serde_json::from_value(value.clone()).map_err(malformed)?;
                    (e.id, e.name, e.formula, e.family, e.tags)
                }
                PoolType::Reactions => {
                    let e: ReactionEntity =
                        serde_json::from_value(value.clone()).map_err(malformed)?;
                    (e.id, e.name, e.equation, e.family, e.tags)
                }
                PoolType::Classification => {
                    let e: ClassificationEntity =
                        serde_json::from_value(value.clone()).map_err(malformed)?;
                    (e.id, e.name, e.class, e.family, e.tags)
                }
            };

            if id.trim().is_empty() || name.trim().is_empty() || answer.trim().is_empty() {
                return Err(ParseError::MalformedEntity {
                    index,
                    reason: "empty id, name, or answer field".into(),
                });
            }

            Ok(QuestionRecord {
                id,
                name,
                answer,
                family,
                tags: tags.into_iter().filter_map(|t| normalize_tag(&t)).collect(),
            })
        })
        .collect()
}

/// Normalize a raw tag: trim, lower-case, drop if empty.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// A warning from pool validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The record ID, if attributable.
    pub record_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a parsed pool for common issues.
///
/// Warnings, not errors: callers log these and keep the pool usable.
pub fn validate_pool(records: &[QuestionRecord]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = std::collections::HashSet::new();
    for record in records {
        if !seen_ids.insert(&record.id) {
            warnings.push(ValidationWarning {
                record_id: Some(record.id.clone()),
                message: format!("duplicate record ID: {}", record.id),
            });
        }
    }

    for record in records {
        if record.answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                record_id: Some(record.id.clone()),
                message: "answer field is empty".into(),
            });
        }
    }

    warnings
}
