//! Review records as they move through the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A review as delivered by the retail API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    pub text: String,
    pub rating: f64,
}

impl RawReview {
    pub fn new(text: impl Into<String>, rating: f64) -> Self {
        Self {
            text: text.into(),
            rating,
        }
    }
}

/// A review with sentiment and key phrases from the analytics service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedReview {
    pub text: String,
    pub rating: f64,
    pub sentiment_score: f64,
    pub key_phrases: Vec<String>,
}

impl AnnotatedReview {
    /// Neutral annotation used until (or unless) the analytics service answers.
    pub fn neutral(review: RawReview) -> Self {
        Self {
            text: review.text,
            rating: review.rating,
            sentiment_score: 0.0,
            key_phrases: Vec::new(),
        }
    }
}

/// Positive/negative mentions of one attribute family in a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeCounts {
    pub positive_count: u32,
    pub negative_count: u32,
}

impl AttributeCounts {
    pub fn is_detected(&self) -> bool {
        self.positive_count != 0 || self.negative_count != 0
    }
}

/// Attribute family name -> counts, ordered by name.
pub type AttributeHits = BTreeMap<String, AttributeCounts>;

/// Fully annotated and scored review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredReview {
    /// Review text as written by the customer
    pub text: String,
    /// Star rating from the retail API
    pub rating: f64,
    /// Sentiment polarity from the analytics service
    pub sentiment_score: f64,
    pub key_phrases: Vec<String>,
    #[schema(value_type = Object)]
    pub attribute_hits: AttributeHits,
    /// Composite relevance score, higher ranks first
    pub rank_score: f64,
}

impl ScoredReview {
    pub fn new(review: AnnotatedReview, attribute_hits: AttributeHits, rank_score: f64) -> Self {
        Self {
            text: review.text,
            rating: review.rating,
            sentiment_score: review.sentiment_score,
            key_phrases: review.key_phrases,
            attribute_hits,
            rank_score,
        }
    }
}

/// Response body for a product: ranked reviews plus good/bad comment lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedProduct {
    /// Reviews sorted by rank score, highest first
    pub reviews: Vec<ScoredReview>,
    /// Texts of reviews rated above 4 stars, in rank order
    pub good_comments: Vec<String>,
    /// Texts of all other reviews, in rank order
    pub bad_comments: Vec<String>,
}
