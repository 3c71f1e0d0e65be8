//! Bundled static datasets, used when every remote attempt is exhausted.
//!
//! The bundled data goes through the same entity parser as a live
//! response, so fallback pools carry the same guarantees as fetched ones.

use std::collections::HashMap;

use chemdrill_core::model::{PoolType, QuestionRecord};
use chemdrill_core::parser;

/// Static datasets keyed by `(category, pool_type)`.
pub struct FallbackCatalog {
    datasets: HashMap<(String, PoolType), String>,
}

impl FallbackCatalog {
    /// A catalog with no datasets; every lookup misses.
    pub fn empty() -> Self {
        Self {
            datasets: HashMap::new(),
        }
    }

    /// The datasets shipped with the crate, under the "general" category.
    pub fn bundled() -> Self {
        let mut catalog = Self::empty();
        catalog.register(
            "general",
            PoolType::Compounds,
            include_str!("../data/compounds_general.json"),
        );
        catalog.register(
            "general",
            PoolType::Reactions,
            include_str!("../data/reactions_general.json"),
        );
        catalog.register(
            "general",
            PoolType::Classification,
            include_str!("../data/classification_general.json"),
        );
        catalog
    }

    /// Register a dataset: a JSON array of entities in the wire shape for
    /// its pool type.
    pub fn register(&mut self, category: &str, pool_type: PoolType, json: &str) {
        self.datasets
            .insert((category.to_string(), pool_type), json.to_string());
    }

    /// Parse and return the dataset for a selection, if one exists. A
    /// dataset that fails to parse is reported and treated as absent.
    pub fn lookup(&self, category: &str, pool_type: PoolType) -> Option<Vec<QuestionRecord>> {
        let json = self.datasets.get(&(category.to_string(), pool_type))?;

        let entries: Vec<serde_json::Value> = match serde_json::from_str(json) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(category, %pool_type, error = %e, "fallback dataset is not a JSON array");
                return None;
            }
        };

        match parser::parse_entities(pool_type, &entries) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::error!(category, %pool_type, error = %e, "fallback dataset failed to parse");
                None
            }
        }
    }
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}
