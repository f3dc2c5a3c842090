//! Attribute detection over key phrases.
//!
//! A review mentions an attribute family (e.g. "battery") when one of its key
//! phrases contains any of the family's synonyms as a substring. Each mention is
//! counted positive or negative depending on the review's overall sentiment.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;

use crate::error::ConfigError;
use crate::models::{AnnotatedReview, AttributeCounts, AttributeHits};

static DEFAULT_FAMILIES: Lazy<Vec<AttributeFamily>> =
    Lazy::new(|| vec![AttributeFamily::new("battery", ["battery", "batteries"])]);

/// Canonical attribute name plus the surface forms that signal it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFamily {
    pub name: String,
    /// Stored lower-cased.
    synonyms: Vec<String>,
}

impl AttributeFamily {
    pub fn new<I, S>(name: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            synonyms: synonyms
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    /// `phrase` must already be lower-cased.
    fn matches(&self, phrase: &str) -> bool {
        self.synonyms.iter().any(|s| phrase.contains(s.as_str()))
    }
}

/// The set of attribute families scanned for in every review.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDictionary {
    families: Vec<AttributeFamily>,
}

impl Default for AttributeDictionary {
    fn default() -> Self {
        Self {
            families: DEFAULT_FAMILIES.clone(),
        }
    }
}

impl AttributeDictionary {
    pub fn new(families: Vec<AttributeFamily>) -> Self {
        Self { families }
    }

    pub fn families(&self) -> &[AttributeFamily] {
        &self.families
    }

    /// Parses `name=syn|syn;name=syn`. A bare `name` is its own only synonym.
    /// Family names must be unique.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut families = Vec::new();
        let mut seen = BTreeSet::new();

        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, synonyms) = match entry.split_once('=') {
                Some((name, synonyms)) => (name.trim(), synonyms),
                None => (entry, entry),
            };
            if name.is_empty() {
                return Err(ConfigError::InvalidAttributeFamily(entry.to_string()));
            }

            let family = AttributeFamily::new(name, synonyms.split('|'));
            if family.synonyms.is_empty() || !seen.insert(family.name.clone()) {
                return Err(ConfigError::InvalidAttributeFamily(entry.to_string()));
            }
            families.push(family);
        }

        Ok(Self { families })
    }
}

/// Counts attribute mentions in a review's key phrases.
///
/// Every family in the dictionary gets an entry, zero when unmentioned. A key
/// phrase counts once per family name it matches, and may match several families.
pub fn detect_attributes(
    review: &AnnotatedReview,
    dictionary: &AttributeDictionary,
    semantic_threshold: f64,
) -> AttributeHits {
    let positive = review.sentiment_score > semantic_threshold;
    let mut hits: AttributeHits = dictionary
        .families
        .iter()
        .map(|f| (f.name.clone(), AttributeCounts::default()))
        .collect();

    for phrase in &review.key_phrases {
        let phrase = phrase.to_lowercase();
        let matched: BTreeSet<&str> = dictionary
            .families
            .iter()
            .filter(|f| f.matches(&phrase))
            .map(|f| f.name.as_str())
            .collect();
        for name in matched {
            let counts = hits.entry(name.to_string()).or_default();
            if positive {
                counts.positive_count += 1;
            } else {
                counts.negative_count += 1;
            }
        }
    }

    hits
}

/// True when any family was mentioned at all.
pub fn any_detected(hits: &AttributeHits) -> bool {
    hits.values().any(AttributeCounts::is_detected)
}

/// Dictionary and threshold bound together for use across a request.
#[derive(Debug, Clone)]
pub struct AttributeDetector {
    dictionary: AttributeDictionary,
    semantic_threshold: f64,
}

impl AttributeDetector {
    pub fn new(dictionary: AttributeDictionary, semantic_threshold: f64) -> Self {
        Self {
            dictionary,
            semantic_threshold,
        }
    }

    pub fn detect(&self, review: &AnnotatedReview) -> AttributeHits {
        detect_attributes(review, &self.dictionary, self.semantic_threshold)
    }
}
