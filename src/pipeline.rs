//! Per-request pipeline: fetch, annotate, detect attributes, score, rank.

use std::sync::Arc;
use tracing::{debug, info};

use crate::analytics::{AnnotationClient, TextAnalytics};
use crate::attributes::AttributeDetector;
use crate::config::Config;
use crate::error::Result;
use crate::models::{AnnotatedReview, RankedProduct, ScoredReview};
use crate::ranking::rank;
use crate::reviews::ReviewSource;
use crate::scoring::ScoringEngine;

/// Holds only immutable collaborators, so one instance serves all requests.
#[derive(Clone)]
pub struct ReviewPipeline {
    source: Arc<dyn ReviewSource>,
    annotator: AnnotationClient,
    detector: AttributeDetector,
    engine: ScoringEngine,
}

impl ReviewPipeline {
    pub fn new(source: Arc<dyn ReviewSource>, analytics: Arc<dyn TextAnalytics>, config: &Config) -> Self {
        Self {
            source,
            annotator: AnnotationClient::new(analytics, config.analytics_batch_size, &config.analytics_language),
            detector: AttributeDetector::new(config.ranking.attributes.clone(), config.ranking.semantic_threshold),
            engine: ScoringEngine::new(config.ranking.weights),
        }
    }

    pub async fn run(&self, product_id: &str) -> Result<RankedProduct> {
        let raw = self.source.fetch(product_id).await?;
        info!(product_id, count = raw.len(), "🔎 reviews fetched");

        let annotated = self.annotator.annotate(raw).await?;
        let scored = self.score_all(annotated);

        Ok(rank(scored))
    }

    /// Detects attributes and scores each review independently.
    pub fn score_all(&self, reviews: Vec<AnnotatedReview>) -> Vec<ScoredReview> {
        reviews
            .into_iter()
            .map(|review| {
                let hits = self.detector.detect(&review);
                let score = self.engine.score(&review, &hits);
                debug!(rank_score = score, "scored review");
                ScoredReview::new(review, hits, score)
            })
            .collect()
    }
}
