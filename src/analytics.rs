//! Text analytics client: sentiment and key phrases for a batch of reviews.
//!
//! Reviews are numbered 1..=n in read order and sent as documents with those
//! ids. Results are scattered back through an index keyed by id, never by
//! response position. Batches above the per-call document cap are chunked.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, ReviewError};
use crate::models::{AnnotatedReview, RawReview};
use crate::outbound::send_with_retry;

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub language: String,
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentDocument {
    pub id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub documents: Vec<SentimentDocument>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPhraseDocument {
    pub id: String,
    #[serde(rename = "keyPhrases", default)]
    pub key_phrases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyPhraseResponse {
    pub documents: Vec<KeyPhraseDocument>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

/// The two analytics endpoints, one round-trip per call.
#[async_trait]
pub trait TextAnalytics: Send + Sync {
    async fn sentiment(&self, batch: &DocumentBatch) -> Result<SentimentResponse>;

    async fn key_phrases(&self, batch: &DocumentBatch) -> Result<KeyPhraseResponse>;
}

/// Numbers reviews from 1 in order and splits them into batches of at most `cap`.
pub fn build_batches(reviews: &[RawReview], language: &str, cap: usize) -> Result<Vec<DocumentBatch>> {
    if reviews.is_empty() {
        return Ok(Vec::new());
    }
    if cap == 0 {
        return Err(ReviewError::BatchSizeExceeded {
            count: reviews.len(),
            cap,
        });
    }

    let documents: Vec<Document> = reviews
        .iter()
        .enumerate()
        .map(|(i, review)| Document {
            language: language.to_string(),
            id: (i + 1).to_string(),
            text: review.text.clone(),
        })
        .collect();

    Ok(documents
        .chunks(cap)
        .map(|chunk| DocumentBatch {
            documents: chunk.to_vec(),
        })
        .collect())
}

/// Annotates reviews using a [`TextAnalytics`] backend.
#[derive(Clone)]
pub struct AnnotationClient {
    analytics: Arc<dyn TextAnalytics>,
    batch_size: usize,
    language: String,
}

impl AnnotationClient {
    pub fn new(analytics: Arc<dyn TextAnalytics>, batch_size: usize, language: impl Into<String>) -> Self {
        Self {
            analytics,
            batch_size,
            language: language.into(),
        }
    }

    /// Attaches sentiment and key phrases to every review, preserving order.
    ///
    /// Reviews the service does not answer for keep a neutral annotation.
    pub async fn annotate(&self, reviews: Vec<RawReview>) -> Result<Vec<AnnotatedReview>> {
        let batches = build_batches(&reviews, &self.language, self.batch_size)?;

        // Position in `reviews` for every assigned id.
        let index: HashMap<String, usize> = batches
            .iter()
            .flat_map(|b| b.documents.iter())
            .enumerate()
            .map(|(position, doc)| (doc.id.clone(), position))
            .collect();

        let mut annotated: Vec<AnnotatedReview> = reviews.into_iter().map(AnnotatedReview::neutral).collect();
        let mut with_sentiment = HashSet::new();
        let mut with_phrases = HashSet::new();

        for batch in &batches {
            let (sentiment, phrases) = tokio::try_join!(
                self.analytics.sentiment(batch),
                self.analytics.key_phrases(batch)
            )?;

            log_document_errors("sentiment", &sentiment.errors);
            log_document_errors("keyPhrases", &phrases.errors);

            for doc in sentiment.documents {
                match index.get(&doc.id) {
                    Some(&position) => {
                        annotated[position].sentiment_score = doc.score;
                        with_sentiment.insert(position);
                    }
                    None => debug!(id = %doc.id, "ignoring sentiment for unknown document"),
                }
            }
            for doc in phrases.documents {
                match index.get(&doc.id) {
                    Some(&position) => {
                        annotated[position].key_phrases = doc.key_phrases;
                        with_phrases.insert(position);
                    }
                    None => debug!(id = %doc.id, "ignoring key phrases for unknown document"),
                }
            }
        }

        let missing_sentiment = annotated.len() - with_sentiment.len();
        let missing_phrases = annotated.len() - with_phrases.len();
        if missing_sentiment > 0 || missing_phrases > 0 {
            warn!(
                missing_sentiment,
                missing_phrases,
                "analytics left some reviews unannotated, using neutral defaults"
            );
        }

        Ok(annotated)
    }
}

fn log_document_errors(endpoint: &str, errors: &[serde_json::Value]) {
    for error in errors {
        warn!(endpoint, %error, "analytics reported a document error");
    }
}

/// Analytics backed by the hosted text analytics REST API.
#[derive(Debug, Clone)]
pub struct HttpTextAnalytics {
    client: reqwest::Client,
    endpoint: String,
    subscription_key: String,
}

impl HttpTextAnalytics {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.analytics_endpoint.trim_end_matches('/').to_string(),
            subscription_key: config.analytics_key.clone(),
        }
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, batch: &DocumentBatch) -> Result<T> {
        let url = format!("{}/{}", self.endpoint, path);

        let response = send_with_retry(path, || {
            self.client
                .post(&url)
                .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(batch)
        })
        .await
        .map_err(|e| ReviewError::AnnotationFailed(format!("{}: {}", path, e)))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ReviewError::AnnotationFailed(format!("{}: reading body: {}", path, e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| ReviewError::AnnotationFailed(format!("{}: unparsable payload: {}", path, e)))
    }
}

#[async_trait]
impl TextAnalytics for HttpTextAnalytics {
    async fn sentiment(&self, batch: &DocumentBatch) -> Result<SentimentResponse> {
        self.post("sentiment", batch).await
    }

    async fn key_phrases(&self, batch: &DocumentBatch) -> Result<KeyPhraseResponse> {
        self.post("keyPhrases", batch).await
    }
}
